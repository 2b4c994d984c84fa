//! Submission handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use campus_core::types::{ResourceId, SubmissionId};
use campus_entity::submission::Submission;

use crate::dto::request::{GradeBody, SubmitRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Principal, ValidatedJson};
use crate::state::AppState;

/// POST /api/resources/{id}/submissions
pub async fn submit(
    State(state): State<AppState>,
    principal: Principal,
    Path(resource_id): Path<ResourceId>,
    ValidatedJson(req): ValidatedJson<SubmitRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Submission>>), ApiError> {
    let submission = state
        .submission_service
        .submit(&principal, resource_id, req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(submission))))
}

/// GET /api/resources/{id}/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    principal: Principal,
    Path(resource_id): Path<ResourceId>,
) -> Result<Json<ApiResponse<Vec<Submission>>>, ApiError> {
    let submissions = state
        .submission_service
        .list(&principal, resource_id)
        .await?;
    Ok(Json(ApiResponse::ok(submissions)))
}

/// POST /api/submissions/{id}/grade
pub async fn grade(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<SubmissionId>,
    ValidatedJson(body): ValidatedJson<GradeBody>,
) -> Result<Json<ApiResponse<Submission>>, ApiError> {
    let submission = state
        .submission_service
        .grade(&principal, id, body.into())
        .await?;
    Ok(Json(ApiResponse::ok(submission)))
}
