//! Custom Axum extractors.

pub mod json;
pub mod pagination;
pub mod principal;

pub use json::ValidatedJson;
pub use pagination::PaginationParams;
pub use principal::Principal;
