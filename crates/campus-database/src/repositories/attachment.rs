//! Attachment metadata persistence.

use async_trait::async_trait;

use campus_core::result::AppResult;
use campus_core::types::{AttachmentId, ResourceId};
use campus_entity::attachment::Attachment;

/// Storage of attachment metadata rows.
#[async_trait]
pub trait AttachmentRepository: Send + Sync + 'static {
    /// Insert a metadata row.
    async fn insert(&self, attachment: &Attachment) -> AppResult<()>;

    /// Fetch one attachment.
    async fn find_by_id(&self, id: AttachmentId) -> AppResult<Option<Attachment>>;

    /// Attachments of a resource, oldest first.
    async fn list_by_resource(&self, resource_id: ResourceId) -> AppResult<Vec<Attachment>>;

    /// Attachments of several resources, oldest first within each resource.
    async fn list_by_resources(&self, resource_ids: &[ResourceId]) -> AppResult<Vec<Attachment>>;

    /// Remove a row. Returns whether a row existed; removing a missing row is not an error.
    async fn delete(&self, id: AttachmentId) -> AppResult<bool>;
}
