//! Notification event enumeration.

use serde::{Deserialize, Serialize};

/// The change that triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A resource was created in the recipient's scope.
    ResourceCreated,
    /// A resource in the recipient's scope changed status.
    StatusChanged,
    /// A student handed in work on the recipient's resource.
    SubmissionReceived,
    /// The recipient's submission was graded.
    SubmissionGraded,
}

impl NotificationEvent {
    /// Return the event label stored in the `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceCreated => "resource_created",
            Self::StatusChanged => "status_changed",
            Self::SubmissionReceived => "submission_received",
            Self::SubmissionGraded => "submission_graded",
        }
    }
}

impl std::fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
