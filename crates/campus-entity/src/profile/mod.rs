//! Recipient directory rows.

pub mod model;

pub use model::{Profile, ProfileRole};
