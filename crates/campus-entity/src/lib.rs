//! # campus-entity
//!
//! Domain entity models for the campus resource service. Every struct here
//! is either a database row (deriving `sqlx::FromRow`) or a domain value
//! object such as [`resource::Scope`] or the [`resource::Status`] workflow
//! table.

pub mod attachment;
pub mod notification;
pub mod profile;
pub mod resource;
pub mod submission;
