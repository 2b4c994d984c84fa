//! Notification inbox handlers.

use axum::Json;
use axum::extract::{Query, State};

use campus_core::types::UserId;
use campus_service::NotificationList;

use crate::dto::request::{MarkReadRequest, NotificationQuery};
use crate::dto::response::{ApiResponse, CountResponse, MarkedResponse};
use crate::error::ApiError;
use crate::extractors::{Principal, ValidatedJson};
use crate::state::AppState;

/// GET /api/notifications?recipient=&unread_only=&limit=
pub async fn list_notifications(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<ApiResponse<NotificationList>>, ApiError> {
    let list = state
        .notification_service
        .list(
            &principal,
            query.recipient.map(UserId::from),
            query.unread_only,
            query.limit,
        )
        .await?;
    Ok(Json(ApiResponse::ok(list)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.notification_service.unread_count(&principal).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PUT /api/notifications/read
pub async fn mark_read(
    State(state): State<AppState>,
    principal: Principal,
    ValidatedJson(req): ValidatedJson<MarkReadRequest>,
) -> Result<Json<ApiResponse<MarkedResponse>>, ApiError> {
    let marked = if req.all {
        state.notification_service.mark_all_read(&principal).await?
    } else {
        state
            .notification_service
            .mark_read(&principal, &req.ids)
            .await?
    };
    Ok(Json(ApiResponse::ok(MarkedResponse { marked })))
}
