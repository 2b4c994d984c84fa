//! Scoped resource CRUD handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use campus_core::types::{PageResponse, ResourceId};
use campus_entity::resource::ResourceDetail;
use campus_service::{OwnedQuery, ResourceQuery};

use crate::dto::request::{
    CreateResourceRequest, OwnedListQuery, ResourceListQuery, UpdateResourceRequest,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{PaginationParams, Principal, ValidatedJson};
use crate::state::AppState;

/// POST /api/resources
pub async fn create_resource(
    State(state): State<AppState>,
    principal: Principal,
    ValidatedJson(req): ValidatedJson<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ResourceDetail>>), ApiError> {
    let detail = state
        .resource_service
        .create(&principal, req.into_input()?)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(detail))))
}

/// GET /api/resources/{id}
pub async fn get_resource(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<ResourceId>,
) -> Result<Json<ApiResponse<ResourceDetail>>, ApiError> {
    let detail = state.resource_service.get(&principal, id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// GET /api/resources?department=&year=&subject=&kind=&status=
pub async fn list_resources(
    State(state): State<AppState>,
    principal: Principal,
    Query(filter): Query<ResourceListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<ResourceDetail>>>, ApiError> {
    let query = ResourceQuery {
        scope: filter.scope()?,
        kind: filter.kind,
        status: filter.status,
        page: pagination.into_page_request(),
    };
    let page = state.resource_service.list_by_scope(&principal, query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/resources/mine
pub async fn list_my_resources(
    State(state): State<AppState>,
    principal: Principal,
    Query(filter): Query<OwnedListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<ResourceDetail>>>, ApiError> {
    let query = OwnedQuery {
        kind: filter.kind,
        status: filter.status,
        page: pagination.into_page_request(),
    };
    let page = state.resource_service.list_owned(&principal, query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// PATCH /api/resources/{id}
pub async fn update_resource(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<ResourceId>,
    ValidatedJson(req): ValidatedJson<UpdateResourceRequest>,
) -> Result<Json<ApiResponse<ResourceDetail>>, ApiError> {
    let detail = state
        .resource_service
        .update(&principal, id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// DELETE /api/resources/{id}
pub async fn delete_resource(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<ResourceId>,
) -> Result<StatusCode, ApiError> {
    state.resource_service.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
