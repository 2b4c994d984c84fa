//! Ownership-scoped resource store.

pub(crate) mod access;
pub mod service;

pub use service::{NewResource, OwnedQuery, ResourcePatch, ResourceQuery, ResourceService};
