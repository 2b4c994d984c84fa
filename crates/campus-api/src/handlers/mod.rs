//! Route handlers organized by domain.

pub mod attachment;
pub mod health;
pub mod notification;
pub mod resource;
pub mod submission;
pub mod workflow;
