use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_core::types::{ResourceId, SubmissionId};
use campus_entity::submission::Submission;

use super::MemoryDatabase;
use crate::repositories::SubmissionRepository;

#[async_trait]
impl SubmissionRepository for MemoryDatabase {
    async fn insert(&self, submission: &Submission) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.submissions.values().any(|s| {
            s.id == submission.id
                || (s.resource_id == submission.resource_id
                    && s.student_id == submission.student_id)
        });
        if duplicate {
            return Err(AppError::conflict(format!(
                "Student {} already submitted to resource {}",
                submission.student_id, submission.resource_id
            )));
        }
        tables.submissions.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: SubmissionId) -> AppResult<Option<Submission>> {
        Ok(self.tables.read().await.submissions.get(&id).cloned())
    }

    async fn list_by_resource(&self, resource_id: ResourceId) -> AppResult<Vec<Submission>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Submission> = tables
            .submissions
            .values()
            .filter(|s| s.resource_id == resource_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.submitted_at, a.id).cmp(&(b.submitted_at, b.id)));
        Ok(rows)
    }

    async fn count_by_resource(&self, resource_id: ResourceId) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .submissions
            .values()
            .filter(|s| s.resource_id == resource_id)
            .count() as u64)
    }

    async fn update(
        &self,
        submission: &Submission,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Submission> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .submissions
            .get_mut(&submission.id)
            .ok_or_else(|| AppError::not_found(format!("Submission {} not found", submission.id)))?;
        if stored.updated_at != expected_updated_at {
            return Err(AppError::conflict(format!(
                "Submission {} was modified concurrently",
                submission.id
            )));
        }
        stored.status = submission.status;
        stored.grade = submission.grade.clone();
        stored.feedback = submission.feedback.clone();
        stored.graded_by = submission.graded_by;
        stored.graded_at = submission.graded_at;
        stored.updated_at = submission.updated_at;
        Ok(stored.clone())
    }
}
