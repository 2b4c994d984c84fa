//! Status transition handler.

use axum::Json;
use axum::extract::{Path, State};

use campus_core::types::ResourceId;
use campus_entity::resource::ResourceDetail;

use crate::dto::request::TransitionBody;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Principal, ValidatedJson};
use crate::state::AppState;

/// POST /api/resources/{id}/transition
pub async fn transition(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<ResourceId>,
    ValidatedJson(body): ValidatedJson<TransitionBody>,
) -> Result<Json<ApiResponse<ResourceDetail>>, ApiError> {
    let detail = state
        .workflow_service
        .transition(&principal, id, body.into())
        .await?;
    Ok(Json(ApiResponse::ok(detail)))
}
