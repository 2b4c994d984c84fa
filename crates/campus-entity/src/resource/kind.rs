//! Resource kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::status::{Status, Workflow};

/// What a resource represents. The kind decides its workflow and its
/// deletion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resource_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Study material uploaded by faculty.
    Material,
    /// Graded assignment.
    Assignment,
    /// Exam.
    Exam,
    /// Ungraded task or announcement-style work item.
    Task,
    /// Leave application awaiting review.
    Leave,
}

impl ResourceKind {
    /// The workflow resources of this kind follow.
    pub fn workflow(&self) -> Workflow {
        match self {
            Self::Material | Self::Assignment | Self::Exam | Self::Task => Workflow::Publication,
            Self::Leave => Workflow::Approval,
        }
    }

    /// Status used when the creator does not pick one.
    pub fn default_status(&self) -> Status {
        match self {
            Self::Assignment | Self::Exam => Status::Draft,
            Self::Material | Self::Task => Status::Published,
            Self::Leave => Status::Pending,
        }
    }

    /// Whether students hand in submissions against this kind.
    pub fn accepts_submissions(&self) -> bool {
        matches!(self, Self::Assignment | Self::Exam)
    }

    /// Whether deletion is limited to `draft`/`scheduled` with no submissions.
    pub fn restricts_delete(&self) -> bool {
        self.accepts_submissions()
    }

    /// Human label used in notification titles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Material => "Study Material",
            Self::Assignment => "Assignment",
            Self::Exam => "Exam",
            Self::Task => "Task",
            Self::Leave => "Leave Application",
        }
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Assignment => "assignment",
            Self::Exam => "exam",
            Self::Task => "task",
            Self::Leave => "leave",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
