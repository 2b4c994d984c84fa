//! Fixtures shared by the service unit tests.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use campus_core::config::{UploadConfig, UploadPolicy};
use campus_core::types::{timestamp, ResourceId, UserId};
use campus_database::repositories::memory::MemoryDatabase;
use campus_database::repositories::RecipientDirectory;
use campus_entity::profile::{Profile, ProfileRole};
use campus_entity::resource::{Resource, ResourceDetail, ResourceKind, Scope, Status};
use campus_storage::{MemoryStorageProvider, StorageManager};

use crate::attachment::{AttachmentService, FileUpload, Summarizer, UploadOutcome};
use crate::context::RequestContext;
use crate::notification::Notifier;
use crate::resource::{NewResource, ResourceService};
use crate::submission::SubmissionService;
use crate::workflow::WorkflowService;

fn scope(department: &str, year: &str) -> Scope {
    Scope::new(department, year, None::<&str>).expect("valid scope")
}

/// A published material built in memory, not persisted.
pub(crate) fn material(owner_id: UserId, department: &str, year: &str) -> Resource {
    let now = timestamp::now();
    Resource {
        id: ResourceId::new(),
        owner_id,
        kind: ResourceKind::Material,
        scope: scope(department, year),
        title: "DS Notes".to_string(),
        description: String::new(),
        status: Status::Published,
        due_at: None,
        status_changed_at: None,
        status_changed_by: None,
        status_reason: None,
        status_metadata: None,
        created_at: now,
        updated_at: now,
    }
}

/// Create input for a study material.
pub(crate) fn new_material(department: &str, year: &str, title: &str) -> NewResource {
    NewResource {
        kind: ResourceKind::Material,
        scope: scope(department, year),
        title: title.to_string(),
        description: None,
        status: None,
        due_at: None,
    }
}

/// Register `count` students of one cohort in the directory.
pub(crate) async fn seed_cohort(
    db: &Arc<MemoryDatabase>,
    department: &str,
    year: &str,
    count: usize,
) -> Vec<UserId> {
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let profile = Profile {
            user_id: UserId::new(),
            role: ProfileRole::Student,
            department: Some(department.to_string()),
            year: Some(year.to_string()),
        };
        db.upsert(&profile).await.expect("upsert profile");
        ids.push(profile.user_id);
    }
    ids
}

/// A pending CSE/2nd leave application owned by `ctx`.
pub(crate) async fn leave(h: &Harness, ctx: &RequestContext) -> ResourceDetail {
    let input = NewResource {
        kind: ResourceKind::Leave,
        scope: scope("CSE", "2nd"),
        title: "Medical leave".to_string(),
        description: Some("Three days from Monday".to_string()),
        status: None,
        due_at: None,
    };
    h.resources.create(ctx, input).await.expect("create leave")
}

/// Every service wired over the in-memory backends.
pub(crate) struct Harness {
    pub db: Arc<MemoryDatabase>,
    pub blobs: Arc<MemoryStorageProvider>,
    pub resources: ResourceService,
    pub attachments: AttachmentService,
    pub workflow: WorkflowService,
    pub submissions: SubmissionService,
}

impl Harness {
    pub async fn new() -> Self {
        Self::build(None)
    }

    pub async fn with_summarizer(summarizer: Arc<dyn Summarizer>) -> Self {
        Self::build(Some(summarizer))
    }

    fn build(summarizer: Option<Arc<dyn Summarizer>>) -> Self {
        let db = Arc::new(MemoryDatabase::new());
        let blobs = Arc::new(MemoryStorageProvider::new());
        let storage = StorageManager::new(blobs.clone(), 3);
        let notifier = Arc::new(Notifier::new(db.clone(), db.clone(), Duration::from_secs(5)));
        let upload = UploadConfig {
            retry_backoff_ms: 1,
            ..Default::default()
        };

        Self {
            resources: ResourceService::new(
                db.clone(),
                db.clone(),
                db.clone(),
                storage.clone(),
                notifier.clone(),
            ),
            attachments: AttachmentService::new(db.clone(), db.clone(), storage, summarizer, upload),
            workflow: WorkflowService::new(db.clone(), db.clone(), notifier.clone()),
            submissions: SubmissionService::new(db.clone(), db.clone(), notifier),
            db,
            blobs,
        }
    }

    /// A CSE faculty member with no year.
    pub fn faculty(&self) -> RequestContext {
        let mut ctx = RequestContext::new(UserId::new());
        ctx.department = Some("CSE".to_string());
        ctx
    }

    /// A student of the given cohort.
    pub fn student(&self, department: &str, year: &str) -> RequestContext {
        RequestContext::new(UserId::new()).with_cohort(department, year)
    }

    pub async fn seed_cohort(&self, department: &str, year: &str, count: usize) -> Vec<UserId> {
        seed_cohort(&self.db, department, year, count).await
    }

    /// A CSE/2nd exam created in `status`.
    pub async fn create_exam(&self, ctx: &RequestContext, status: Status) -> ResourceDetail {
        let input = NewResource {
            kind: ResourceKind::Exam,
            scope: scope("CSE", "2nd"),
            title: "Data Structures Midterm".to_string(),
            description: None,
            status: Some(status),
            due_at: None,
        };
        self.resources.create(ctx, input).await.expect("create exam")
    }

    /// Upload `size` bytes under the documents policy.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        resource_id: ResourceId,
        file_name: &str,
        size: usize,
    ) -> UploadOutcome {
        let upload = FileUpload {
            file_name: file_name.to_string(),
            mime_type: "application/octet-stream".to_string(),
            bytes: Bytes::from(vec![0u8; size]),
        };
        self.attachments
            .upload(ctx, resource_id, upload, &UploadPolicy::documents())
            .await
            .expect("upload")
    }
}
