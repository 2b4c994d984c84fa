//! Attachment upload, listing, download and delete handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;

use campus_core::error::AppError;
use campus_core::types::{AttachmentId, ResourceId};
use campus_entity::attachment::{Attachment, sanitize_file_name};
use campus_service::{FileUpload, UploadOutcome};

use crate::dto::request::UploadQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::Principal;
use crate::state::AppState;

/// Map a multipart failure, keeping the body-limit rejection a 413.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(format!("{context}: request body exceeds the server limit"))
    } else {
        AppError::validation(format!("{context}: {}", err.body_text()))
    }
}

/// Pull the `file` field out of a multipart body.
async fn read_file_field(mut multipart: Multipart) -> Result<FileUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Multipart error", e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(String::from)
            .ok_or_else(|| AppError::validation("The file field needs a file name"))?;
        let mime_type = field
            .content_type()
            .map(String::from)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes: Bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Read error", e))?;
        return Ok(FileUpload {
            file_name,
            mime_type,
            bytes,
        });
    }
    Err(AppError::validation("Multipart field 'file' is required"))
}

/// POST /api/resources/{id}/attachments?policy=
pub async fn upload_attachment(
    State(state): State<AppState>,
    principal: Principal,
    Path(resource_id): Path<ResourceId>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadOutcome>>), ApiError> {
    let policy = state
        .attachment_service
        .policy(query.policy.as_deref())?
        .clone();
    let upload = read_file_field(multipart).await?;
    let outcome = state
        .attachment_service
        .upload(&principal, resource_id, upload, &policy)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(outcome))))
}

/// GET /api/resources/{id}/attachments
pub async fn list_attachments(
    State(state): State<AppState>,
    principal: Principal,
    Path(resource_id): Path<ResourceId>,
) -> Result<Json<ApiResponse<Vec<Attachment>>>, ApiError> {
    let attachments = state
        .attachment_service
        .list(&principal, resource_id)
        .await?;
    Ok(Json(ApiResponse::ok(attachments)))
}

/// GET /api/attachments/{id}
pub async fn get_attachment(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<AttachmentId>,
) -> Result<Json<ApiResponse<Attachment>>, ApiError> {
    let attachment = state.attachment_service.get(&principal, id).await?;
    Ok(Json(ApiResponse::ok(attachment)))
}

/// GET /api/attachments/{id}/download
pub async fn download_attachment(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<AttachmentId>,
) -> Result<Response, ApiError> {
    let (attachment, stream) = state.attachment_service.download(&principal, id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, attachment.mime_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                sanitize_file_name(&attachment.file_name)
            ),
        )
        .header(header::CONTENT_LENGTH, attachment.size_bytes)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;
    Ok(response)
}

/// DELETE /api/attachments/{id}
pub async fn delete_attachment(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<AttachmentId>,
) -> Result<StatusCode, ApiError> {
    state.attachment_service.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
