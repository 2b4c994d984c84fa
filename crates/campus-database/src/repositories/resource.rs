//! Resource persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campus_core::result::AppResult;
use campus_core::types::{PageRequest, ResourceId};
use campus_entity::attachment::Attachment;
use campus_entity::resource::{Resource, ResourceFilter};

/// Storage of resource rows with per-row compare-and-swap on `updated_at`.
#[async_trait]
pub trait ResourceRepository: Send + Sync + 'static {
    /// Insert a new resource. A duplicate id is a `Conflict`.
    async fn insert(&self, resource: &Resource) -> AppResult<()>;

    /// Fetch a resource by id.
    async fn find_by_id(&self, id: ResourceId) -> AppResult<Option<Resource>>;

    /// Page through resources matching `filter`, newest first with ties
    /// broken by id. Returns the page and the total match count.
    async fn list(
        &self,
        filter: &ResourceFilter,
        page: &PageRequest,
    ) -> AppResult<(Vec<Resource>, u64)>;

    /// Replace the mutable fields of `resource` if the stored `updated_at`
    /// still equals `expected_updated_at`.
    ///
    /// `resource.updated_at` must already hold the new value. A stale
    /// token is a `Conflict`; a missing row is `NotFound`.
    async fn update(
        &self,
        resource: &Resource,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Resource>;

    /// Advance `updated_at` after an attachment change and return the new value.
    async fn touch(&self, id: ResourceId) -> AppResult<DateTime<Utc>>;

    /// Remove the resource and all of its attachment rows in one step,
    /// guarded by `expected_updated_at`. Returns the removed attachments so
    /// the caller can delete their blobs.
    async fn delete_cascade(
        &self,
        id: ResourceId,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Vec<Attachment>>;
}
