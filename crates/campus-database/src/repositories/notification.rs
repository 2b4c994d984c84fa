//! Notification persistence.

use async_trait::async_trait;

use campus_core::result::AppResult;
use campus_core::types::{NotificationId, UserId};
use campus_entity::notification::Notification;

/// Storage of notification rows. Rows are never deleted by this service.
#[async_trait]
pub trait NotificationRepository: Send + Sync + 'static {
    /// Insert one row.
    async fn insert(&self, notification: &Notification) -> AppResult<()>;

    /// Newest-first notifications for a recipient.
    async fn list_for_recipient(
        &self,
        recipient_id: UserId,
        unread_only: bool,
        limit: u64,
    ) -> AppResult<Vec<Notification>>;

    /// Number of unread rows for a recipient.
    async fn unread_count(&self, recipient_id: UserId) -> AppResult<u64>;

    /// Mark the given rows read if they belong to the recipient. Returns rows changed.
    async fn mark_read(&self, recipient_id: UserId, ids: &[NotificationId]) -> AppResult<u64>;

    /// Mark every unread row of the recipient read. Returns rows changed.
    async fn mark_all_read(&self, recipient_id: UserId) -> AppResult<u64>;
}
