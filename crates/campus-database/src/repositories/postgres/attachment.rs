//! Attachment repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use campus_core::error::{AppError, ErrorKind};
use campus_core::result::AppResult;
use campus_core::types::{AttachmentId, ResourceId};
use campus_entity::attachment::Attachment;

use crate::repositories::AttachmentRepository;

/// PostgreSQL-backed [`AttachmentRepository`].
#[derive(Debug, Clone)]
pub struct PgAttachmentRepository {
    pool: PgPool,
}

impl PgAttachmentRepository {
    /// Create a new attachment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    async fn insert(&self, attachment: &Attachment) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO attachments (id, resource_id, file_name, mime_type, size_bytes, \
             storage_ref, derived_from, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(attachment.id)
        .bind(attachment.resource_id)
        .bind(&attachment.file_name)
        .bind(&attachment.mime_type)
        .bind(attachment.size_bytes)
        .bind(&attachment.storage_ref)
        .bind(attachment.derived_from)
        .bind(attachment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: AttachmentId) -> AppResult<Option<Attachment>> {
        sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find attachment", e))
    }

    async fn list_by_resource(&self, resource_id: ResourceId) -> AppResult<Vec<Attachment>> {
        sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE resource_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list attachments", e))
    }

    async fn list_by_resources(&self, resource_ids: &[ResourceId]) -> AppResult<Vec<Attachment>> {
        if resource_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = resource_ids.iter().map(|id| id.into_uuid()).collect();
        sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE resource_id = ANY($1) \
             ORDER BY resource_id, created_at ASC, id ASC",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list attachments", e))
    }

    async fn delete(&self, id: AttachmentId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete attachment", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
