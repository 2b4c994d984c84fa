//! Best-effort notification fan-out.
//!
//! Every recipient row is inserted independently. A failed insert is logged
//! and skipped; the deadline stops the loop early. Nothing here ever fails
//! the caller's operation, and no dedup key is applied, so notifying twice
//! for the same event produces two rows per recipient.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;
use tracing::{info, warn};

use campus_core::types::UserId;
use campus_database::repositories::{NotificationRepository, RecipientDirectory};
use campus_entity::notification::{Notification, NotificationEvent};
use campus_entity::resource::Resource;

/// Writes one notification row per recipient.
#[derive(Clone)]
pub struct Notifier {
    repo: Arc<dyn NotificationRepository>,
    directory: Arc<dyn RecipientDirectory>,
    default_deadline: Duration,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("default_deadline", &self.default_deadline)
            .finish()
    }
}

impl Notifier {
    /// Creates a new notifier.
    pub fn new(
        repo: Arc<dyn NotificationRepository>,
        directory: Arc<dyn RecipientDirectory>,
        default_deadline: Duration,
    ) -> Self {
        Self {
            repo,
            directory,
            default_deadline,
        }
    }

    /// Budget used when the caller supplied none.
    pub fn default_deadline(&self) -> Duration {
        self.default_deadline
    }

    /// Insert one row per recipient and return how many were created.
    ///
    /// Stops when `deadline` elapses and returns the count so far.
    pub async fn notify(
        &self,
        resource: &Resource,
        event: NotificationEvent,
        recipients: &[UserId],
        deadline: Duration,
    ) -> usize {
        let expires = Instant::now() + deadline;
        let (title, message) = compose(resource, event);
        let payload = json!({
            "kind": resource.kind,
            "scope": resource.scope,
            "title": resource.title,
            "status": resource.status,
        });

        let mut created = 0;
        for (index, recipient) in recipients.iter().enumerate() {
            if Instant::now() >= expires {
                warn!(
                    resource_id = %resource.id,
                    event = %event,
                    created,
                    skipped = recipients.len() - index,
                    "Notification deadline elapsed"
                );
                break;
            }
            let row = Notification::new(
                *recipient,
                event,
                title.clone(),
                message.clone(),
                Some(resource.id),
                payload.clone(),
            );
            match tokio::time::timeout_at(expires, self.repo.insert(&row)).await {
                Ok(Ok(())) => created += 1,
                Ok(Err(e)) => {
                    warn!(
                        resource_id = %resource.id,
                        recipient_id = %recipient,
                        event = %event,
                        error = %e,
                        "Notification insert failed"
                    );
                }
                Err(_) => {
                    warn!(
                        resource_id = %resource.id,
                        event = %event,
                        created,
                        skipped = recipients.len() - index,
                        "Notification deadline elapsed"
                    );
                    break;
                }
            }
        }

        info!(
            resource_id = %resource.id,
            event = %event,
            recipients = recipients.len(),
            created,
            "Notifications fanned out"
        );
        created
    }

    /// Notify everyone in the resource's scope except `actor`.
    ///
    /// A directory failure is logged and counts as zero deliveries.
    pub async fn fan_out(
        &self,
        resource: &Resource,
        event: NotificationEvent,
        actor: UserId,
        deadline: Duration,
    ) -> usize {
        let started = Instant::now();
        let recipients = match tokio::time::timeout(
            deadline,
            self.directory.resolve(&resource.scope, actor),
        )
        .await
        {
            Ok(Ok(recipients)) => recipients,
            Ok(Err(e)) => {
                warn!(resource_id = %resource.id, error = %e, "Recipient lookup failed");
                return 0;
            }
            Err(_) => {
                warn!(resource_id = %resource.id, "Recipient lookup timed out");
                return 0;
            }
        };
        let remaining = deadline.saturating_sub(started.elapsed());
        self.notify(resource, event, &recipients, remaining).await
    }
}

/// Title and body for an event about `resource`.
fn compose(resource: &Resource, event: NotificationEvent) -> (String, String) {
    let label = resource.kind.label();
    let title = &resource.title;
    match event {
        NotificationEvent::ResourceCreated => (
            format!("New {label}: {title}"),
            format!("{label} \"{title}\" was posted for {}.", resource.scope),
        ),
        NotificationEvent::StatusChanged => {
            let mut message = format!("{label} \"{title}\" is now {}.", resource.status);
            if let Some(reason) = &resource.status_reason {
                message.push_str(&format!(" Reason: {reason}"));
            }
            (format!("{label} {}: {title}", resource.status), message)
        }
        NotificationEvent::SubmissionReceived => (
            format!("New submission: {title}"),
            format!("A student submitted work for {label} \"{title}\"."),
        ),
        NotificationEvent::SubmissionGraded => (
            format!("Graded: {title}"),
            format!("Your submission for {label} \"{title}\" has been graded."),
        ),
    }
}
