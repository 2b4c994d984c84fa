//! Notification inbox: listing and read-state management.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use campus_core::config::NotificationConfig;
use campus_core::error::AppError;
use campus_core::types::{NotificationId, UserId};
use campus_database::repositories::NotificationRepository;
use campus_entity::notification::Notification;

use crate::context::RequestContext;

/// A page of notifications plus the recipient's unread total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationList {
    /// Newest first.
    pub items: Vec<Notification>,
    /// Unread notifications across the whole inbox.
    pub unread_count: u64,
}

/// Manages the acting principal's notifications.
#[derive(Clone)]
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
    config: NotificationConfig,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService").finish()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(repo: Arc<dyn NotificationRepository>, config: NotificationConfig) -> Self {
        Self { repo, config }
    }

    /// Lists notifications for `recipient`, which must be the caller.
    ///
    /// `limit` defaults to the configured list size and is capped at the
    /// configured maximum.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        recipient: Option<UserId>,
        unread_only: bool,
        limit: Option<u32>,
    ) -> Result<NotificationList, AppError> {
        let recipient = recipient.unwrap_or(ctx.user_id);
        if recipient != ctx.user_id {
            return Err(AppError::forbidden(
                "Notifications can only be read by their recipient",
            ));
        }

        let limit = limit
            .unwrap_or(self.config.default_list_limit)
            .clamp(1, self.config.max_list_limit.max(1));
        let items = self
            .repo
            .list_for_recipient(recipient, unread_only, u64::from(limit))
            .await?;
        let unread_count = self.repo.unread_count(recipient).await?;

        Ok(NotificationList {
            items,
            unread_count,
        })
    }

    /// Gets the caller's unread notification count.
    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        self.repo.unread_count(ctx.user_id).await
    }

    /// Marks the given notifications read. Ids owned by someone else are ignored.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        ids: &[NotificationId],
    ) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Err(AppError::validation("No notification ids given"));
        }
        let changed = self.repo.mark_read(ctx.user_id, ids).await?;
        info!(user_id = %ctx.user_id, requested = ids.len(), changed, "Marked notifications read");
        Ok(changed)
    }

    /// Marks every notification of the caller read.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        let changed = self.repo.mark_all_read(ctx.user_id).await?;
        info!(user_id = %ctx.user_id, changed, "Marked all notifications read");
        Ok(changed)
    }
}
