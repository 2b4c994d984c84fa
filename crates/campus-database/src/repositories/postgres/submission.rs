//! Submission repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use campus_core::error::{AppError, ErrorKind};
use campus_core::result::AppResult;
use campus_core::types::{ResourceId, SubmissionId};
use campus_entity::submission::Submission;

use crate::repositories::SubmissionRepository;

/// PostgreSQL-backed [`SubmissionRepository`].
#[derive(Debug, Clone)]
pub struct PgSubmissionRepository {
    pool: PgPool,
}

impl PgSubmissionRepository {
    /// Create a new submission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionRepository for PgSubmissionRepository {
    async fn insert(&self, submission: &Submission) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO submissions (id, resource_id, student_id, content, status, is_late, \
             grade, feedback, graded_by, submitted_at, graded_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(submission.id)
        .bind(submission.resource_id)
        .bind(submission.student_id)
        .bind(&submission.content)
        .bind(submission.status)
        .bind(submission.is_late)
        .bind(&submission.grade)
        .bind(&submission.feedback)
        .bind(submission.graded_by)
        .bind(submission.submitted_at)
        .bind(submission.graded_at)
        .bind(submission.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: SubmissionId) -> AppResult<Option<Submission>> {
        sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find submission", e))
    }

    async fn list_by_resource(&self, resource_id: ResourceId) -> AppResult<Vec<Submission>> {
        sqlx::query_as::<_, Submission>(
            "SELECT * FROM submissions WHERE resource_id = $1 ORDER BY submitted_at ASC, id ASC",
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list submissions", e))
    }

    async fn count_by_resource(&self, resource_id: ResourceId) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE resource_id = $1")
                .bind(resource_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count submissions", e)
                })?;
        Ok(count as u64)
    }

    async fn update(
        &self,
        submission: &Submission,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Submission> {
        let updated = sqlx::query_as::<_, Submission>(
            "UPDATE submissions SET status = $3, grade = $4, feedback = $5, graded_by = $6, \
             graded_at = $7, updated_at = $8 \
             WHERE id = $1 AND updated_at = $2 RETURNING *",
        )
        .bind(submission.id)
        .bind(expected_updated_at)
        .bind(submission.status)
        .bind(&submission.grade)
        .bind(&submission.feedback)
        .bind(submission.graded_by)
        .bind(submission.graded_at)
        .bind(submission.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update submission", e))?;

        match updated {
            Some(row) => Ok(row),
            None => match self.find_by_id(submission.id).await? {
                Some(_) => Err(AppError::conflict(format!(
                    "Submission {} was modified concurrently",
                    submission.id
                ))),
                None => Err(AppError::not_found(format!(
                    "Submission {} not found",
                    submission.id
                ))),
            },
        }
    }
}
