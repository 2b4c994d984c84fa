//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::{Duration, Instant};

use campus_core::config::AppConfig;
use campus_database::Repositories;
use campus_service::{
    AttachmentService, NotificationService, Notifier, ResourceService, SubmissionService,
    Summarizer, WorkflowService,
};
use campus_storage::StorageManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Repository backend, kept for health checks.
    pub repositories: Repositories,
    /// Blob storage.
    pub storage: StorageManager,
    /// Scoped resource CRUD.
    pub resource_service: Arc<ResourceService>,
    /// Attachment pipeline.
    pub attachment_service: Arc<AttachmentService>,
    /// Status transitions.
    pub workflow_service: Arc<WorkflowService>,
    /// Submissions and grading.
    pub submission_service: Arc<SubmissionService>,
    /// Notification inbox.
    pub notification_service: Arc<NotificationService>,
    /// When the process started serving.
    pub started_at: Instant,
}

impl AppState {
    /// Wire every service over the given backends.
    pub fn build(
        config: AppConfig,
        repositories: Repositories,
        storage: StorageManager,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Self {
        let notifier = Arc::new(Notifier::new(
            repositories.notifications.clone(),
            repositories.directory.clone(),
            Duration::from_secs(config.notification.timeout_seconds),
        ));

        let resource_service = Arc::new(ResourceService::new(
            repositories.resources.clone(),
            repositories.attachments.clone(),
            repositories.submissions.clone(),
            storage.clone(),
            notifier.clone(),
        ));
        let attachment_service = Arc::new(AttachmentService::new(
            repositories.resources.clone(),
            repositories.attachments.clone(),
            storage.clone(),
            summarizer,
            config.upload.clone(),
        ));
        let workflow_service = Arc::new(WorkflowService::new(
            repositories.resources.clone(),
            repositories.attachments.clone(),
            notifier.clone(),
        ));
        let submission_service = Arc::new(SubmissionService::new(
            repositories.resources.clone(),
            repositories.submissions.clone(),
            notifier,
        ));
        let notification_service = Arc::new(NotificationService::new(
            repositories.notifications.clone(),
            config.notification.clone(),
        ));

        Self {
            config: Arc::new(config),
            repositories,
            storage,
            resource_service,
            attachment_service,
            workflow_service,
            submission_service,
            notification_service,
            started_at: Instant::now(),
        }
    }
}
