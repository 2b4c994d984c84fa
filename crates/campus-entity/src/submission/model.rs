//! Submission entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campus_core::types::{ResourceId, SubmissionId, UserId};

use crate::resource::Status;

/// Maximum grade label length in characters.
pub const MAX_GRADE_LEN: usize = 32;

/// Work handed in by a student. Follows the grading workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Submission {
    /// Unique submission identifier.
    pub id: SubmissionId,
    /// The assignment or exam this answers.
    pub resource_id: ResourceId,
    /// The submitting student.
    pub student_id: UserId,
    /// Answer text or a link to the work.
    pub content: String,
    /// `submitted` or `graded`.
    pub status: Status,
    /// Whether it arrived after the resource's due date.
    pub is_late: bool,
    /// Grade label set by the owner.
    pub grade: Option<String>,
    /// Feedback from the owner.
    pub feedback: Option<String>,
    /// Who graded it.
    pub graded_by: Option<UserId>,
    /// When it was handed in.
    pub submitted_at: DateTime<Utc>,
    /// When it was graded.
    pub graded_at: Option<DateTime<Utc>>,
    /// Compare-and-swap token.
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// Create a fresh submission in the `submitted` state.
    pub fn new(resource_id: ResourceId, student_id: UserId, content: String, is_late: bool) -> Self {
        let now = campus_core::types::timestamp::now();
        Self {
            id: SubmissionId::new(),
            resource_id,
            student_id,
            content,
            status: Status::Submitted,
            is_late,
            grade: None,
            feedback: None,
            graded_by: None,
            submitted_at: now,
            graded_at: None,
            updated_at: now,
        }
    }
}
