use async_trait::async_trait;

use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_core::types::{timestamp, NotificationId, UserId};
use campus_entity::notification::Notification;

use super::MemoryDatabase;
use crate::repositories::NotificationRepository;

#[async_trait]
impl NotificationRepository for MemoryDatabase {
    async fn insert(&self, notification: &Notification) -> AppResult<()> {
        if self.notification_fault(notification.recipient_id).await {
            return Err(AppError::database(format!(
                "Injected notification failure for {}",
                notification.recipient_id
            )));
        }
        self.tables
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn list_for_recipient(
        &self,
        recipient_id: UserId,
        unread_only: bool,
        limit: u64,
    ) -> AppResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && (!unread_only || n.is_unread()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn unread_count(&self, recipient_id: UserId) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && n.is_unread())
            .count() as u64)
    }

    async fn mark_read(&self, recipient_id: UserId, ids: &[NotificationId]) -> AppResult<u64> {
        let now = timestamp::now();
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for n in tables.notifications.iter_mut() {
            if n.recipient_id == recipient_id && n.is_unread() && ids.contains(&n.id) {
                n.read = true;
                n.read_at = Some(now);
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn mark_all_read(&self, recipient_id: UserId) -> AppResult<u64> {
        let now = timestamp::now();
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for n in tables.notifications.iter_mut() {
            if n.recipient_id == recipient_id && n.is_unread() {
                n.read = true;
                n.read_at = Some(now);
                changed += 1;
            }
        }
        Ok(changed)
    }
}
