//! # campus-core
//!
//! Core crate for the campus resource service. Contains the configuration
//! schema, typed identifiers, pagination and timestamp helpers, the blob
//! storage trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other campus crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
