//! Resource entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campus_core::types::{ResourceId, UserId};

use super::kind::ResourceKind;
use super::scope::Scope;
use super::status::Status;
use crate::attachment::Attachment;

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// A scoped, owned record: study material, assignment, exam, task or leave
/// application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: ResourceId,
    /// The principal that created the resource.
    pub owner_id: UserId,
    /// What the resource represents.
    pub kind: ResourceKind,
    /// Visibility scope. Never changes after creation.
    #[sqlx(flatten)]
    pub scope: Scope,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Current workflow status.
    pub status: Status,
    /// Optional deadline; submissions after it are flagged late.
    pub due_at: Option<DateTime<Utc>>,
    /// When the status last changed.
    pub status_changed_at: Option<DateTime<Utc>>,
    /// Who made the last status change.
    pub status_changed_by: Option<UserId>,
    /// Reason supplied with the last status change, stored verbatim.
    pub status_reason: Option<String>,
    /// Structured data supplied with the last status change.
    pub status_metadata: Option<serde_json::Value>,
    /// When the resource was created.
    pub created_at: DateTime<Utc>,
    /// When the resource or one of its attachments last changed.
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// Whether `user_id` created this resource.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Whether a submission made at `at` counts as late.
    pub fn is_late_at(&self, at: DateTime<Utc>) -> bool {
        self.due_at.is_some_and(|due| at > due)
    }

    /// Whether the resource may still be deleted, ignoring submissions.
    pub fn is_deletable_status(&self) -> bool {
        !self.kind.restricts_delete() || matches!(self.status, Status::Draft | Status::Scheduled)
    }
}

/// A resource together with its attachments, oldest attachment first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDetail {
    /// The resource record.
    #[serde(flatten)]
    pub resource: Resource,
    /// Attachments in `created_at` ascending order.
    pub attachments: Vec<Attachment>,
}

impl ResourceDetail {
    /// Attach an attachment list to a resource.
    pub fn new(resource: Resource, attachments: Vec<Attachment>) -> Self {
        Self {
            resource,
            attachments,
        }
    }
}
