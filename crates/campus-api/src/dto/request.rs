//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use campus_core::error::AppError;
use campus_core::types::NotificationId;
use campus_entity::resource::{ResourceKind, Scope, Status};
use campus_service::{GradeRequest, NewResource, ResourcePatch, TransitionRequest};

/// Distinguish an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Create resource request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateResourceRequest {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Department of the scope.
    #[serde(alias = "dept")]
    pub department: String,
    /// Year of the scope.
    pub year: String,
    /// Optional subject.
    #[serde(default)]
    pub subject: Option<String>,
    /// Title.
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Initial status.
    #[serde(default)]
    pub status: Option<Status>,
    /// Deadline.
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
}

impl CreateResourceRequest {
    /// Convert into service input, validating the scope.
    pub fn into_input(self) -> Result<NewResource, AppError> {
        Ok(NewResource {
            kind: self.kind,
            scope: Scope::new(&self.department, &self.year, self.subject.as_deref())?,
            title: self.title,
            description: self.description,
            status: self.status,
            due_at: self.due_at,
        })
    }
}

/// Partial update request body.
///
/// Scope fields are accepted by the parser so the service can reject them
/// with a clear message instead of silently ignoring them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateResourceRequest {
    /// New title.
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New deadline; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub due_at: Option<Option<DateTime<Utc>>>,
    /// New status.
    pub status: Option<Status>,
    /// Reason recorded with the status change.
    #[serde(alias = "reason")]
    pub status_reason: Option<String>,
    /// Compare-and-swap token.
    pub expected_updated_at: Option<DateTime<Utc>>,
    /// Not updatable.
    pub scope: Option<serde_json::Value>,
    /// Not updatable.
    #[serde(alias = "dept")]
    pub department: Option<String>,
    /// Not updatable.
    pub year: Option<String>,
    /// Not updatable.
    pub subject: Option<String>,
}

impl From<UpdateResourceRequest> for ResourcePatch {
    fn from(req: UpdateResourceRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            due_at: req.due_at,
            status: req.status,
            status_reason: req.status_reason,
            expected_updated_at: req.expected_updated_at,
            scope: req.scope,
            department: req.department,
            year: req.year,
            subject: req.subject,
        }
    }
}

/// Status transition request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransitionBody {
    /// Target status.
    #[serde(alias = "target")]
    pub status: Status,
    /// Reason, required when rejecting.
    #[serde(default)]
    pub reason: Option<String>,
    /// Extra data stored with the change.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// Compare-and-swap token.
    #[serde(default)]
    pub expected_updated_at: Option<DateTime<Utc>>,
}

impl From<TransitionBody> for TransitionRequest {
    fn from(body: TransitionBody) -> Self {
        Self {
            target: body.status,
            reason: body.reason,
            metadata: body.metadata,
            expected_updated_at: body.expected_updated_at,
        }
    }
}

/// Submission request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitRequest {
    /// Answer text or a link to the work.
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// Grade request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GradeBody {
    /// Grade label.
    #[validate(length(min = 1, max = 32, message = "Grade must be 1-32 characters"))]
    pub grade: String,
    /// Feedback for the student.
    #[serde(default)]
    pub feedback: Option<String>,
    /// Compare-and-swap token.
    #[serde(default)]
    pub expected_updated_at: Option<DateTime<Utc>>,
}

impl From<GradeBody> for GradeRequest {
    fn from(body: GradeBody) -> Self {
        Self {
            grade: body.grade,
            feedback: body.feedback,
            expected_updated_at: body.expected_updated_at,
        }
    }
}

/// Mark-read request body: either explicit ids or `all: true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MarkReadRequest {
    /// Notifications to mark.
    #[serde(default)]
    pub ids: Vec<NotificationId>,
    /// Mark the whole inbox.
    #[serde(default)]
    pub all: bool,
}

/// Query for `GET /api/resources`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceListQuery {
    /// Department to list.
    #[serde(alias = "dept")]
    pub department: Option<String>,
    /// Year to list.
    pub year: Option<String>,
    /// Subject filter.
    pub subject: Option<String>,
    /// Kind filter.
    pub kind: Option<ResourceKind>,
    /// Status filter.
    pub status: Option<Status>,
}

impl ResourceListQuery {
    /// The scope being listed; department and year are required.
    pub fn scope(&self) -> Result<Scope, AppError> {
        let department = self
            .department
            .as_deref()
            .ok_or_else(|| AppError::validation("department query parameter is required"))?;
        let year = self
            .year
            .as_deref()
            .ok_or_else(|| AppError::validation("year query parameter is required"))?;
        Scope::new(department, year, self.subject.as_deref())
    }
}

/// Query for `GET /api/resources/mine`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnedListQuery {
    /// Kind filter.
    pub kind: Option<ResourceKind>,
    /// Status filter.
    pub status: Option<Status>,
}

/// Query for attachment uploads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadQuery {
    /// Named upload policy.
    pub policy: Option<String>,
}

/// Query for `GET /api/notifications`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationQuery {
    /// Recipient; must be the caller when given.
    pub recipient: Option<Uuid>,
    /// Only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
    /// Maximum number of items.
    pub limit: Option<u32>,
}
