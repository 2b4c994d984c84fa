//! Submit and grade student work.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use campus_core::error::AppError;
use campus_core::types::{timestamp, ResourceId, SubmissionId};
use campus_database::repositories::{ResourceRepository, SubmissionRepository};
use campus_entity::notification::NotificationEvent;
use campus_entity::resource::Status;
use campus_entity::submission::{Submission, MAX_GRADE_LEN};

use crate::context::RequestContext;
use crate::notification::Notifier;
use crate::resource::access;

/// Statuses in which a resource accepts work.
const OPEN_STATUSES: [Status; 3] = [Status::Scheduled, Status::Published, Status::Active];

/// Grade to record on a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    /// Grade label, e.g. `"A"` or `"18/20"`.
    pub grade: String,
    /// Optional feedback for the student.
    #[serde(default)]
    pub feedback: Option<String>,
    /// Compare-and-swap token from the caller's last read.
    #[serde(default)]
    pub expected_updated_at: Option<DateTime<Utc>>,
}

/// Accepts and grades submissions.
#[derive(Clone)]
pub struct SubmissionService {
    resources: Arc<dyn ResourceRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    notifier: Arc<Notifier>,
}

impl std::fmt::Debug for SubmissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionService").finish()
    }
}

impl SubmissionService {
    /// Creates a new submission service.
    pub fn new(
        resources: Arc<dyn ResourceRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            resources,
            submissions,
            notifier,
        }
    }

    /// Hand in work for an assignment or exam.
    ///
    /// The caller must belong to the resource's cohort and must not own it.
    /// One submission per student; a second one is a `Conflict`. Work that
    /// arrives after `due_at` is accepted and flagged late.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        resource_id: ResourceId,
        content: String,
    ) -> Result<Submission, AppError> {
        let resource = access::load(self.resources.as_ref(), resource_id).await?;
        if resource.is_owned_by(ctx.user_id) {
            return Err(AppError::forbidden(format!(
                "Owners cannot submit to their own {}",
                resource.kind.label()
            )));
        }
        access::ensure_readable(ctx, &resource)?;

        if !resource.kind.accepts_submissions() {
            return Err(AppError::validation(format!(
                "A {} does not accept submissions",
                resource.kind.label()
            )));
        }
        if !OPEN_STATUSES.contains(&resource.status) {
            return Err(AppError::conflict(format!(
                "{} is {} and not accepting submissions",
                resource.kind.label(),
                resource.status
            )));
        }
        if content.trim().is_empty() {
            return Err(AppError::validation("Submission content is required"));
        }

        let now = timestamp::now();
        let submission = Submission::new(resource_id, ctx.user_id, content, resource.is_late_at(now));
        self.submissions.insert(&submission).await?;

        info!(
            resource_id = %resource_id,
            submission_id = %submission.id,
            student_id = %ctx.user_id,
            is_late = submission.is_late,
            "Submission received"
        );

        self.notifier
            .notify(
                &resource,
                NotificationEvent::SubmissionReceived,
                &[resource.owner_id],
                ctx.deadline_or(self.notifier.default_deadline()),
            )
            .await;

        Ok(submission)
    }

    /// Grade a submission. Owner of the resource only.
    ///
    /// Grading is the `submitted -> graded` transition, so a second grade
    /// is an `InvalidTransition`.
    pub async fn grade(
        &self,
        ctx: &RequestContext,
        id: SubmissionId,
        request: GradeRequest,
    ) -> Result<Submission, AppError> {
        let mut submission = self
            .submissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Submission {id} not found")))?;
        let resource = access::load(self.resources.as_ref(), submission.resource_id).await?;
        access::ensure_owner(ctx, &resource, "grade submissions for")?;

        if !submission.status.can_transition_to(Status::Graded) {
            return Err(AppError::invalid_transition(format!(
                "Submission cannot move from {} to {}",
                submission.status,
                Status::Graded
            )));
        }
        if let Some(expected) = request.expected_updated_at {
            if expected != submission.updated_at {
                return Err(AppError::conflict(format!(
                    "Submission {id} was modified by someone else; reload and retry"
                )));
            }
        }

        let grade = request.grade.trim();
        if grade.is_empty() {
            return Err(AppError::validation("Grade is required"));
        }
        if grade.chars().count() > MAX_GRADE_LEN {
            return Err(AppError::validation(format!(
                "Grade must be at most {MAX_GRADE_LEN} characters"
            )));
        }

        let expected = submission.updated_at;
        let now = timestamp::advance(expected);
        submission.status = Status::Graded;
        submission.grade = Some(grade.to_string());
        submission.feedback = request.feedback.filter(|f| !f.trim().is_empty());
        submission.graded_by = Some(ctx.user_id);
        submission.graded_at = Some(now);
        submission.updated_at = now;
        let saved = self.submissions.update(&submission, expected).await?;

        info!(
            submission_id = %id,
            resource_id = %resource.id,
            grader = %ctx.user_id,
            "Submission graded"
        );

        self.notifier
            .notify(
                &resource,
                NotificationEvent::SubmissionGraded,
                &[saved.student_id],
                ctx.deadline_or(self.notifier.default_deadline()),
            )
            .await;

        Ok(saved)
    }

    /// Every submission for a resource, oldest first. Owner only.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        resource_id: ResourceId,
    ) -> Result<Vec<Submission>, AppError> {
        let resource = access::load(self.resources.as_ref(), resource_id).await?;
        access::ensure_owner(ctx, &resource, "view submissions for")?;
        self.submissions.list_by_resource(resource_id).await
    }
}
