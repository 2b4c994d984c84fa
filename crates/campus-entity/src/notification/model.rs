//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campus_core::types::{NotificationId, ResourceId, UserId};

use super::event::NotificationEvent;

/// One delivered notification. Only `read`/`read_at` change after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient principal.
    pub recipient_id: UserId,
    /// Event label, see [`NotificationEvent::as_str`].
    pub kind: String,
    /// Short title shown in the notification list.
    pub title: String,
    /// Body text.
    pub message: String,
    /// The resource that triggered the notification.
    pub reference_id: Option<ResourceId>,
    /// Scope, title and status of the resource at send time.
    pub payload: serde_json::Value,
    /// Whether the recipient has read it.
    pub read: bool,
    /// When it was marked read.
    pub read_at: Option<DateTime<Utc>>,
    /// When it was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build an unread notification for `recipient_id`.
    pub fn new(
        recipient_id: UserId,
        event: NotificationEvent,
        title: impl Into<String>,
        message: impl Into<String>,
        reference_id: Option<ResourceId>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient_id,
            kind: event.as_str().to_string(),
            title: title.into(),
            message: message.into(),
            reference_id,
            payload,
            read: false,
            read_at: None,
            created_at: campus_core::types::timestamp::now(),
        }
    }

    /// Check if the notification has been read.
    pub fn is_unread(&self) -> bool {
        !self.read
    }
}
