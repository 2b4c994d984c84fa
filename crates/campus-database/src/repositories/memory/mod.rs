//! In-process repository backend.
//!
//! One [`MemoryDatabase`] implements every repository trait over a single
//! lock, so multi-table operations such as
//! [`ResourceRepository::delete_cascade`](super::ResourceRepository::delete_cascade)
//! are atomic exactly like their PostgreSQL transactions. Fault hooks let
//! tests make individual inserts fail.

mod attachment;
mod directory;
mod notification;
mod resource;
mod submission;

use std::collections::{BTreeMap, HashMap, HashSet};

use tokio::sync::RwLock;

use campus_core::types::{AttachmentId, NotificationId, ResourceId, SubmissionId, UserId};
use campus_entity::attachment::Attachment;
use campus_entity::notification::Notification;
use campus_entity::profile::Profile;
use campus_entity::resource::Resource;
use campus_entity::submission::Submission;

/// Rows of every table.
#[derive(Debug, Default)]
struct Tables {
    resources: HashMap<ResourceId, Resource>,
    attachments: HashMap<AttachmentId, Attachment>,
    notifications: Vec<Notification>,
    submissions: HashMap<SubmissionId, Submission>,
    profiles: BTreeMap<UserId, Profile>,
}

/// Injected failures.
#[derive(Debug, Default)]
struct Faults {
    attachment_inserts: u32,
    notification_recipients: HashSet<UserId>,
}

/// In-memory implementation of all repository traits.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: RwLock<Tables>,
    faults: RwLock<Faults>,
}

impl MemoryDatabase {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` attachment inserts fail with a database error.
    pub async fn fail_next_attachment_inserts(&self, count: u32) {
        self.faults.write().await.attachment_inserts = count;
    }

    /// Make every notification insert addressed to `recipient` fail.
    pub async fn fail_notifications_for(&self, recipient: UserId) {
        self.faults
            .write()
            .await
            .notification_recipients
            .insert(recipient);
    }

    /// Number of attachment rows across all resources.
    pub async fn attachment_count(&self) -> usize {
        self.tables.read().await.attachments.len()
    }

    /// Number of notification rows across all recipients.
    pub async fn notification_count(&self) -> usize {
        self.tables.read().await.notifications.len()
    }

    /// Consume one injected attachment-insert failure, if any remain.
    async fn take_attachment_fault(&self) -> bool {
        let mut faults = self.faults.write().await;
        if faults.attachment_inserts > 0 {
            faults.attachment_inserts -= 1;
            true
        } else {
            false
        }
    }

    async fn notification_fault(&self, recipient: UserId) -> bool {
        self.faults
            .read()
            .await
            .notification_recipients
            .contains(&recipient)
    }
}
