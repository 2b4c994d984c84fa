//! Route definitions for the campus HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::Router;
use axum::routing::{get, post, put};

use crate::handlers;
use crate::state::AppState;

/// Build the API routes with state attached. Layers are added by
/// [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(resource_routes())
        .merge(attachment_routes())
        .merge(submission_routes())
        .merge(notification_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Resource CRUD and status transitions
fn resource_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/resources",
            get(handlers::resource::list_resources).post(handlers::resource::create_resource),
        )
        .route("/resources/mine", get(handlers::resource::list_my_resources))
        .route(
            "/resources/{id}",
            get(handlers::resource::get_resource)
                .patch(handlers::resource::update_resource)
                .delete(handlers::resource::delete_resource),
        )
        .route(
            "/resources/{id}/transition",
            post(handlers::workflow::transition),
        )
}

/// Attachment upload, metadata, download, delete
fn attachment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/resources/{id}/attachments",
            get(handlers::attachment::list_attachments)
                .post(handlers::attachment::upload_attachment),
        )
        .route(
            "/attachments/{id}",
            get(handlers::attachment::get_attachment)
                .delete(handlers::attachment::delete_attachment),
        )
        .route(
            "/attachments/{id}/download",
            get(handlers::attachment::download_attachment),
        )
}

/// Submissions and grading
fn submission_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/resources/{id}/submissions",
            get(handlers::submission::list_submissions).post(handlers::submission::submit),
        )
        .route("/submissions/{id}/grade", post(handlers::submission::grade))
}

/// Notification inbox
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route("/notifications/read", put(handlers::notification::mark_read))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
