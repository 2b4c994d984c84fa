//! # campus-api
//!
//! HTTP API layer for the campus resource service built on Axum.
//!
//! Provides the REST endpoints under `/api`, the principal and pagination
//! extractors, request DTOs with validation, error mapping and the
//! logging and CORS middleware.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
