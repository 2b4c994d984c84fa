//! # campus-service
//!
//! Business logic for the campus resource service. Each service
//! orchestrates repositories, blob storage and the notifier for one area:
//! scoped resources, their attachments, status workflows, submissions and
//! notifications.
//!
//! Services follow constructor injection; every dependency is handed in at
//! construction time behind an `Arc`.

pub mod attachment;
pub mod context;
pub mod notification;
pub mod resource;
pub mod submission;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use attachment::{AttachmentService, FileUpload, HttpSummarizer, Summarizer, UploadOutcome};
pub use context::RequestContext;
pub use notification::{NotificationList, NotificationService, Notifier};
pub use resource::{NewResource, OwnedQuery, ResourcePatch, ResourceQuery, ResourceService};
pub use submission::{GradeRequest, SubmissionService};
pub use workflow::{TransitionRequest, WorkflowService};
