//! Status workflows and the transition table.
//!
//! Three workflows share one closed status set:
//!
//! ```text
//! publication:  draft ──► scheduled ──► active ──► completed
//!                 └────► published ──┘
//! approval:     pending ──► approved
//!                  └──────► rejected   (reason required)
//! grading:      submitted ──► graded
//! ```
//!
//! Terminal states are sticky and self-transitions are never allowed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The workflow a status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    /// Materials, assignments, exams and tasks.
    Publication,
    /// Leave applications and other review-style requests.
    Approval,
    /// Student submissions.
    Grading,
}

impl Workflow {
    /// States a record of this workflow may be created in.
    pub fn initial_states(&self) -> &'static [Status] {
        match self {
            Self::Publication => &[Status::Draft, Status::Scheduled, Status::Published],
            Self::Approval => &[Status::Pending],
            Self::Grading => &[Status::Submitted],
        }
    }

    /// Whether `status` is a valid creation state for this workflow.
    pub fn accepts_initial(&self, status: Status) -> bool {
        self.initial_states().contains(&status)
    }
}

/// Status of a resource or submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workflow_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Being prepared by its owner; not yet visible as live.
    Draft,
    /// Scheduled for a future start.
    Scheduled,
    /// Published and open.
    Published,
    /// In progress (exam running, assignment accepting work).
    Active,
    /// Closed. Terminal.
    Completed,
    /// Awaiting review.
    Pending,
    /// Approved by the reviewer. Terminal.
    Approved,
    /// Rejected by the reviewer with a reason. Terminal.
    Rejected,
    /// Handed in by a student.
    Submitted,
    /// Graded by the owner. Terminal.
    Graded,
}

impl Status {
    /// Every status, in declaration order.
    pub const ALL: [Status; 10] = [
        Status::Draft,
        Status::Scheduled,
        Status::Published,
        Status::Active,
        Status::Completed,
        Status::Pending,
        Status::Approved,
        Status::Rejected,
        Status::Submitted,
        Status::Graded,
    ];

    /// The workflow this status belongs to.
    pub fn workflow(&self) -> Workflow {
        match self {
            Self::Draft | Self::Scheduled | Self::Published | Self::Active | Self::Completed => {
                Workflow::Publication
            }
            Self::Pending | Self::Approved | Self::Rejected => Workflow::Approval,
            Self::Submitted | Self::Graded => Workflow::Grading,
        }
    }

    /// States reachable in one step from this one.
    pub fn allowed_targets(&self) -> &'static [Status] {
        match self {
            Self::Draft => &[Self::Scheduled, Self::Published],
            Self::Scheduled | Self::Published => &[Self::Active],
            Self::Active => &[Self::Completed],
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Submitted => &[Self::Graded],
            Self::Completed | Self::Approved | Self::Rejected | Self::Graded => &[],
        }
    }

    /// Whether the transition table contains `self -> target`.
    pub fn can_transition_to(&self, target: Status) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Whether no transition leaves this state.
    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Whether entering this state requires a non-empty reason.
    pub fn requires_reason(&self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Submitted => "submitted",
            Self::Graded => "graded",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown status '{s}'"))
    }
}
