//! Submission persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campus_core::result::AppResult;
use campus_core::types::{ResourceId, SubmissionId};
use campus_entity::submission::Submission;

/// Storage of submission rows. One row per `(resource, student)`.
#[async_trait]
pub trait SubmissionRepository: Send + Sync + 'static {
    /// Insert a submission. A second row for the same student and resource is a `Conflict`.
    async fn insert(&self, submission: &Submission) -> AppResult<()>;

    /// Fetch one submission.
    async fn find_by_id(&self, id: SubmissionId) -> AppResult<Option<Submission>>;

    /// Submissions for a resource, oldest first.
    async fn list_by_resource(&self, resource_id: ResourceId) -> AppResult<Vec<Submission>>;

    /// Number of submissions for a resource.
    async fn count_by_resource(&self, resource_id: ResourceId) -> AppResult<u64>;

    /// Write grading fields guarded by `expected_updated_at`.
    async fn update(
        &self,
        submission: &Submission,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Submission>;
}
