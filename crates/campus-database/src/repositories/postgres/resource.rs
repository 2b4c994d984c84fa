//! Resource repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use campus_core::error::{AppError, ErrorKind};
use campus_core::result::AppResult;
use campus_core::types::{PageRequest, ResourceId};
use campus_entity::attachment::Attachment;
use campus_entity::resource::{Resource, ResourceFilter};

use crate::repositories::ResourceRepository;

const FILTER_CLAUSE: &str = "($1::text IS NULL OR department = $1) \
     AND ($2::text IS NULL OR year = $2) \
     AND ($3::text IS NULL OR subject = $3) \
     AND ($4::resource_kind IS NULL OR kind = $4) \
     AND ($5::workflow_status IS NULL OR status = $5) \
     AND ($6::uuid IS NULL OR owner_id = $6)";

/// PostgreSQL-backed [`ResourceRepository`].
#[derive(Debug, Clone)]
pub struct PgResourceRepository {
    pool: PgPool,
}

impl PgResourceRepository {
    /// Create a new resource repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguish a stale token from a missing row after a guarded write matched nothing.
    async fn cas_miss(&self, id: ResourceId) -> AppError {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM resources WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await;
        match exists {
            Ok(true) => AppError::conflict(format!(
                "Resource {id} was modified concurrently; reload and retry"
            )),
            Ok(false) => AppError::not_found(format!("Resource {id} not found")),
            Err(e) => AppError::with_source(ErrorKind::Database, "Failed to probe resource", e),
        }
    }
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    async fn insert(&self, resource: &Resource) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO resources (id, owner_id, kind, department, year, subject, title, description, \
             status, due_at, status_changed_at, status_changed_by, status_reason, status_metadata, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(resource.id)
        .bind(resource.owner_id)
        .bind(resource.kind)
        .bind(&resource.scope.department)
        .bind(&resource.scope.year)
        .bind(&resource.scope.subject)
        .bind(&resource.title)
        .bind(&resource.description)
        .bind(resource.status)
        .bind(resource.due_at)
        .bind(resource.status_changed_at)
        .bind(resource.status_changed_by)
        .bind(&resource.status_reason)
        .bind(&resource.status_metadata)
        .bind(resource.created_at)
        .bind(resource.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: ResourceId) -> AppResult<Option<Resource>> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find resource", e))
    }

    async fn list(
        &self,
        filter: &ResourceFilter,
        page: &PageRequest,
    ) -> AppResult<(Vec<Resource>, u64)> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM resources WHERE {FILTER_CLAUSE}"
        ))
        .bind(&filter.department)
        .bind(&filter.year)
        .bind(&filter.subject)
        .bind(filter.kind)
        .bind(filter.status)
        .bind(filter.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count resources", e))?;

        let rows = sqlx::query_as::<_, Resource>(&format!(
            "SELECT * FROM resources WHERE {FILTER_CLAUSE} \
             ORDER BY created_at DESC, id DESC LIMIT $7 OFFSET $8"
        ))
        .bind(&filter.department)
        .bind(&filter.year)
        .bind(&filter.subject)
        .bind(filter.kind)
        .bind(filter.status)
        .bind(filter.owner_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list resources", e))?;

        Ok((rows, total as u64))
    }

    async fn update(
        &self,
        resource: &Resource,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Resource> {
        let updated = sqlx::query_as::<_, Resource>(
            "UPDATE resources SET title = $3, description = $4, status = $5, due_at = $6, \
             status_changed_at = $7, status_changed_by = $8, status_reason = $9, \
             status_metadata = $10, updated_at = $11 \
             WHERE id = $1 AND updated_at = $2 RETURNING *",
        )
        .bind(resource.id)
        .bind(expected_updated_at)
        .bind(&resource.title)
        .bind(&resource.description)
        .bind(resource.status)
        .bind(resource.due_at)
        .bind(resource.status_changed_at)
        .bind(resource.status_changed_by)
        .bind(&resource.status_reason)
        .bind(&resource.status_metadata)
        .bind(resource.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update resource", e))?;

        match updated {
            Some(row) => Ok(row),
            None => Err(self.cas_miss(resource.id).await),
        }
    }

    async fn touch(&self, id: ResourceId) -> AppResult<DateTime<Utc>> {
        let stamped: Option<DateTime<Utc>> = sqlx::query_scalar(
            "UPDATE resources \
             SET updated_at = GREATEST(date_trunc('microseconds', clock_timestamp()), \
                                       updated_at + interval '1 microsecond') \
             WHERE id = $1 RETURNING updated_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch resource", e))?;

        stamped.ok_or_else(|| AppError::not_found(format!("Resource {id} not found")))
    }

    async fn delete_cascade(
        &self,
        id: ResourceId,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Vec<Attachment>> {
        let mut tx = self.pool.begin().await?;

        let current: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT updated_at FROM resources WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        match current {
            None => return Err(AppError::not_found(format!("Resource {id} not found"))),
            Some(ts) if ts != expected_updated_at => {
                return Err(AppError::conflict(format!(
                    "Resource {id} was modified concurrently; reload and retry"
                )));
            }
            Some(_) => {}
        }

        let attachments = sqlx::query_as::<_, Attachment>(
            "DELETE FROM attachments WHERE resource_id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        // Submissions reference resources with ON DELETE RESTRICT; the
        // violation surfaces as a Conflict.
        sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut attachments = attachments;
        attachments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(attachments)
    }
}
