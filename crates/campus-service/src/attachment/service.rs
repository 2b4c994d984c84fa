//! Attachment pipeline: policy check, blob write, metadata insert with
//! retries, deadline rollback and the optional derived summary.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, warn};

use campus_core::config::{UploadConfig, UploadPolicy};
use campus_core::error::{AppError, ErrorKind};
use campus_core::traits::ByteStream;
use campus_core::types::{timestamp, AttachmentId, ResourceId};
use campus_database::repositories::{AttachmentRepository, ResourceRepository};
use campus_entity::attachment::{extension_of, stem_of, Attachment};
use campus_entity::resource::Resource;
use campus_storage::StorageManager;

use super::policy;
use super::summarizer::Summarizer;
use crate::context::RequestContext;
use crate::resource::access;

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Original file name.
    pub file_name: String,
    /// MIME type reported by the client.
    pub mime_type: String,
    /// File content.
    pub bytes: Bytes,
}

/// Result of a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// The stored primary attachment.
    pub attachment: Attachment,
    /// The generated summary, when one was produced.
    pub derived: Option<Attachment>,
}

/// Stores and serves resource attachments.
#[derive(Clone)]
pub struct AttachmentService {
    resources: Arc<dyn ResourceRepository>,
    attachments: Arc<dyn AttachmentRepository>,
    storage: StorageManager,
    summarizer: Option<Arc<dyn Summarizer>>,
    config: UploadConfig,
}

impl std::fmt::Debug for AttachmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentService")
            .field("summarizer", &self.summarizer.is_some())
            .finish()
    }
}

impl AttachmentService {
    /// Creates a new attachment service.
    pub fn new(
        resources: Arc<dyn ResourceRepository>,
        attachments: Arc<dyn AttachmentRepository>,
        storage: StorageManager,
        summarizer: Option<Arc<dyn Summarizer>>,
        config: UploadConfig,
    ) -> Self {
        Self {
            resources,
            attachments,
            storage,
            summarizer,
            config,
        }
    }

    /// Resolve a named policy, falling back to the configured default.
    pub fn policy(&self, name: Option<&str>) -> Result<&UploadPolicy, AppError> {
        self.config.policy(name).ok_or_else(|| {
            AppError::validation(format!(
                "Unknown upload policy '{}'",
                name.unwrap_or(&self.config.default_policy)
            ))
        })
    }

    /// Attach a file to a resource. Owner only.
    ///
    /// Nothing is written when the policy rejects the file. The blob and its
    /// row are written under the caller's deadline (or the configured
    /// default); on expiry both are removed and `Timeout` is returned.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        resource_id: ResourceId,
        upload: FileUpload,
        policy: &UploadPolicy,
    ) -> Result<UploadOutcome, AppError> {
        let resource = access::load(self.resources.as_ref(), resource_id).await?;
        access::ensure_owner(ctx, &resource, "attach files to")?;
        policy::enforce(policy, &upload.file_name, upload.bytes.len() as u64)?;

        let deadline = ctx.deadline_or(Duration::from_secs(self.config.timeout_seconds));
        let started = Instant::now();

        let attachment = self
            .store(
                &resource,
                &upload.file_name,
                &upload.mime_type,
                upload.bytes.clone(),
                None,
                deadline,
            )
            .await?;

        info!(
            resource_id = %resource_id,
            attachment_id = %attachment.id,
            file_name = %attachment.file_name,
            size_bytes = attachment.size_bytes,
            "Attachment uploaded"
        );

        let remaining = deadline.saturating_sub(started.elapsed());
        let derived = self.derive(&resource, &attachment, upload, remaining).await;
        self.touch(resource_id).await;

        Ok(UploadOutcome { attachment, derived })
    }

    /// Fetch attachment metadata under the parent resource's read rules.
    pub async fn get(&self, ctx: &RequestContext, id: AttachmentId) -> Result<Attachment, AppError> {
        let (attachment, _) = self.load_readable(ctx, id).await?;
        Ok(attachment)
    }

    /// List a resource's attachments, oldest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        resource_id: ResourceId,
    ) -> Result<Vec<Attachment>, AppError> {
        let resource = access::load(self.resources.as_ref(), resource_id).await?;
        access::ensure_readable(ctx, &resource)?;
        self.attachments.list_by_resource(resource_id).await
    }

    /// Open an attachment's blob for streaming.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        id: AttachmentId,
    ) -> Result<(Attachment, ByteStream), AppError> {
        let (attachment, _) = self.load_readable(ctx, id).await?;
        let stream = self.storage.provider().read(&attachment.storage_ref).await?;
        Ok((attachment, stream))
    }

    /// Remove an attachment. Owner of the parent resource only.
    ///
    /// The blob goes first, then the row. A failure between the two leaves
    /// a row pointing at a missing blob, which the orphan sweep detects.
    pub async fn delete(&self, ctx: &RequestContext, id: AttachmentId) -> Result<(), AppError> {
        let attachment = self
            .attachments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Attachment {id} not found")))?;
        let resource = access::load(self.resources.as_ref(), attachment.resource_id).await?;
        access::ensure_owner(ctx, &resource, "remove attachments from")?;

        self.storage
            .delete_with_retries(&attachment.storage_ref)
            .await?;
        self.attachments.delete(id).await?;
        self.touch(resource.id).await;

        info!(
            resource_id = %resource.id,
            attachment_id = %id,
            "Attachment deleted"
        );
        Ok(())
    }

    async fn load_readable(
        &self,
        ctx: &RequestContext,
        id: AttachmentId,
    ) -> Result<(Attachment, Resource), AppError> {
        let attachment = self
            .attachments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Attachment {id} not found")))?;
        let resource = access::load(self.resources.as_ref(), attachment.resource_id).await?;
        access::ensure_readable(ctx, &resource)?;
        Ok((attachment, resource))
    }

    /// Write blob and row under `deadline`, rolling both back on expiry.
    async fn store(
        &self,
        resource: &Resource,
        file_name: &str,
        mime_type: &str,
        bytes: Bytes,
        derived_from: Option<AttachmentId>,
        deadline: Duration,
    ) -> Result<Attachment, AppError> {
        let id = AttachmentId::new();
        let attachment = Attachment {
            id,
            resource_id: resource.id,
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes: bytes.len() as i64,
            storage_ref: Attachment::storage_ref_for(resource.owner_id, resource.id, id, file_name),
            derived_from,
            created_at: timestamp::now(),
        };

        match tokio::time::timeout(deadline, self.persist(&attachment, bytes)).await {
            Ok(result) => result.map(|()| attachment),
            Err(_) => {
                if let Err(e) = self.attachments.delete(id).await {
                    warn!(attachment_id = %id, error = %e, "Row rollback after timeout failed");
                }
                self.discard_blob(&attachment.storage_ref).await;
                warn!(
                    resource_id = %resource.id,
                    file_name,
                    deadline_ms = deadline.as_millis() as u64,
                    "Upload deadline elapsed; rolled back"
                );
                Err(AppError::timeout(format!(
                    "Upload of '{file_name}' did not finish within {} ms",
                    deadline.as_millis()
                )))
            }
        }
    }

    async fn persist(&self, attachment: &Attachment, bytes: Bytes) -> Result<(), AppError> {
        if let Err(e) = self
            .storage
            .provider()
            .write(&attachment.storage_ref, bytes)
            .await
        {
            self.discard_blob(&attachment.storage_ref).await;
            return Err(e);
        }

        let attempts = self.config.metadata_retries.max(1);
        let mut attempt = 1;
        loop {
            match self.attachments.insert(attachment).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is(ErrorKind::Database) && attempt < attempts => {
                    warn!(
                        attachment_id = %attachment.id,
                        attempt,
                        error = %e,
                        "Attachment insert failed; retrying"
                    );
                    let backoff = self.config.retry_backoff_ms * u64::from(attempt);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
                Err(e) => {
                    self.discard_blob(&attachment.storage_ref).await;
                    return Err(e);
                }
            }
        }
    }

    async fn discard_blob(&self, storage_ref: &str) {
        if let Err(e) = self.storage.delete_with_retries(storage_ref).await {
            warn!(storage_ref, error = %e, "Blob rollback failed; left for the orphan sweep");
        }
    }

    /// Generate and store `<stem>.summary.txt`. Never fails the upload.
    async fn derive(
        &self,
        resource: &Resource,
        primary: &Attachment,
        upload: FileUpload,
        deadline: Duration,
    ) -> Option<Attachment> {
        let summarizer = self.summarizer.as_ref()?;
        let extension = extension_of(&primary.file_name)?;
        if !summarizer.supports(&extension) {
            return None;
        }

        let file_name = format!("{}.summary.txt", stem_of(&primary.file_name));
        let started = Instant::now();
        let result = async {
            let summary = tokio::time::timeout(
                deadline,
                summarizer.summarize(&upload.file_name, &upload.mime_type, upload.bytes),
            )
            .await
            .map_err(|_| AppError::timeout("Summarizer did not answer within the upload deadline"))??;
            self.store(
                resource,
                &file_name,
                "text/plain",
                Bytes::from(summary),
                Some(primary.id),
                deadline.saturating_sub(started.elapsed()),
            )
            .await
        }
        .await;

        match result {
            Ok(derived) => {
                info!(
                    attachment_id = %primary.id,
                    derived_id = %derived.id,
                    "Derived summary stored"
                );
                Some(derived)
            }
            Err(e) => {
                warn!(
                    attachment_id = %primary.id,
                    error = %e,
                    "Derived summary skipped"
                );
                None
            }
        }
    }

    async fn touch(&self, resource_id: ResourceId) {
        if let Err(e) = self.resources.touch(resource_id).await {
            warn!(resource_id = %resource_id, error = %e, "Failed to bump resource updated_at");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use futures::StreamExt;

    use campus_core::result::AppResult;
    use campus_core::traits::StorageProvider;
    use campus_storage::MemoryStorageProvider;

    use super::*;
    use crate::testing::{new_material, Harness};

    const MB: u64 = 1024 * 1024;

    fn pdf(name: &str, size: usize) -> FileUpload {
        FileUpload {
            file_name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: Bytes::from(vec![b'%'; size]),
        }
    }

    #[derive(Debug, Default)]
    struct FakeSummarizer {
        calls: AtomicUsize,
        fail: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        fn supports(&self, extension: &str) -> bool {
            extension == "pdf"
        }

        async fn summarize(&self, file_name: &str, _mime: &str, bytes: Bytes) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(AppError::external_service("summarizer offline"));
            }
            Ok(format!("{file_name}: {} bytes", bytes.len()))
        }
    }

    /// Memory storage whose writes take a while.
    #[derive(Debug)]
    struct SlowStorage {
        inner: MemoryStorageProvider,
        delay: Duration,
    }

    #[async_trait]
    impl StorageProvider for SlowStorage {
        fn provider_type(&self) -> &str {
            "slow"
        }

        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }

        async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
            self.inner.write(path, data).await?;
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        async fn read(&self, path: &str) -> AppResult<ByteStream> {
            self.inner.read(path).await
        }

        async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
            self.inner.read_bytes(path).await
        }

        async fn delete(&self, path: &str) -> AppResult<()> {
            self.inner.delete(path).await
        }

        async fn exists(&self, path: &str) -> AppResult<bool> {
            self.inner.exists(path).await
        }
    }

    async fn material_id(h: &Harness, ctx: &RequestContext) -> ResourceId {
        h.resources
            .create(ctx, new_material("CSE", "2nd", "DS Notes"))
            .await
            .unwrap()
            .resource
            .id
    }

    #[tokio::test]
    async fn test_oversized_upload_writes_nothing() {
        let h = Harness::new().await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;
        let policy = UploadPolicy::new(10 * MB, &["pdf"]);

        let err = h
            .attachments
            .upload(&owner, id, pdf("big.pdf", (11 * MB) as usize), &policy)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::PayloadTooLarge);
        assert!(h.blobs.is_empty().await);
        assert_eq!(h.db.attachment_count().await, 0);
    }

    #[tokio::test]
    async fn test_disallowed_extension_writes_nothing() {
        let h = Harness::new().await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;

        let err = h
            .attachments
            .upload(&owner, id, pdf("setup.exe", 10), &UploadPolicy::documents())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnsupportedMediaType);
        assert!(h.blobs.is_empty().await);
        assert_eq!(h.db.attachment_count().await, 0);
    }

    #[tokio::test]
    async fn test_upload_stores_blob_and_row() {
        let h = Harness::new().await;
        let owner = h.faculty();
        let created = h
            .resources
            .create(&owner, new_material("CSE", "2nd", "DS Notes"))
            .await
            .unwrap()
            .resource;
        let policy = UploadPolicy::new(25 * MB, &["pdf"]);

        let outcome = h
            .attachments
            .upload(&owner, created.id, pdf("notes.pdf", 2_000_000), &policy)
            .await
            .unwrap();

        assert_eq!(outcome.attachment.size_bytes, 2_000_000);
        assert_eq!(outcome.attachment.resource_id, created.id);
        assert!(outcome.derived.is_none());
        assert!(h.blobs.paths().await.contains(&outcome.attachment.storage_ref));

        let detail = h.resources.get(&owner, created.id).await.unwrap();
        assert_eq!(detail.attachments, vec![outcome.attachment]);
        assert!(detail.resource.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_upload_owner_only() {
        let h = Harness::new().await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;

        let err = h
            .attachments
            .upload(&h.student("CSE", "2nd"), id, pdf("notes.pdf", 10), &UploadPolicy::documents())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert!(h.blobs.is_empty().await);
    }

    #[tokio::test]
    async fn test_metadata_insert_retries_then_succeeds() {
        let h = Harness::new().await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;
        h.db.fail_next_attachment_inserts(2).await;

        let outcome = h
            .attachments
            .upload(&owner, id, pdf("notes.pdf", 64), &UploadPolicy::documents())
            .await
            .unwrap();

        assert_eq!(h.db.attachment_count().await, 1);
        assert_eq!(h.blobs.paths().await, vec![outcome.attachment.storage_ref]);
    }

    #[tokio::test]
    async fn test_exhausted_retries_remove_blob() {
        let h = Harness::new().await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;
        h.db.fail_next_attachment_inserts(3).await;

        let err = h
            .attachments
            .upload(&owner, id, pdf("notes.pdf", 64), &UploadPolicy::documents())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Database);
        assert_eq!(h.db.attachment_count().await, 0);
        assert!(h.blobs.is_empty().await);
    }

    #[tokio::test]
    async fn test_blob_write_failure_leaves_nothing() {
        let h = Harness::new().await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;
        h.blobs.set_fail_writes(true);

        let err = h
            .attachments
            .upload(&owner, id, pdf("notes.pdf", 64), &UploadPolicy::documents())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Storage);
        assert_eq!(h.db.attachment_count().await, 0);
        assert!(h.blobs.is_empty().await);
    }

    #[tokio::test]
    async fn test_deadline_rolls_back_blob_and_row() {
        let h = Harness::new().await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;

        let slow = Arc::new(SlowStorage {
            inner: MemoryStorageProvider::new(),
            delay: Duration::from_millis(500),
        });
        let service = AttachmentService::new(
            h.db.clone(),
            h.db.clone(),
            StorageManager::new(slow.clone(), 3),
            None,
            UploadConfig::default(),
        );

        let ctx = owner.clone().with_deadline(Duration::from_millis(20));
        let err = service
            .upload(&ctx, id, pdf("notes.pdf", 64), &UploadPolicy::documents())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(h.db.attachment_count().await, 0);
        assert!(slow.inner.is_empty().await);
    }

    #[tokio::test]
    async fn test_summary_stored_as_derived_attachment() {
        let summarizer = Arc::new(FakeSummarizer::default());
        let h = Harness::with_summarizer(summarizer.clone()).await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;

        let outcome = h
            .attachments
            .upload(&owner, id, pdf("DS Notes.pdf", 256), &UploadPolicy::documents())
            .await
            .unwrap();

        let derived = outcome.derived.expect("derived summary");
        assert_eq!(derived.file_name, "DS Notes.summary.txt");
        assert_eq!(derived.mime_type, "text/plain");
        assert_eq!(derived.derived_from, Some(outcome.attachment.id));
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);

        let (_, mut stream) = h.attachments.download(&owner, derived.id).await.unwrap();
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"DS Notes.pdf: 256 bytes");

        let listed = h.attachments.list(&owner, id).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_summary_failure_keeps_primary() {
        let summarizer = Arc::new(FakeSummarizer {
            fail: true,
            ..Default::default()
        });
        let h = Harness::with_summarizer(summarizer.clone()).await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;

        let outcome = h
            .attachments
            .upload(&owner, id, pdf("notes.pdf", 64), &UploadPolicy::documents())
            .await
            .unwrap();
        assert!(outcome.derived.is_none());
        assert_eq!(h.db.attachment_count().await, 1);

        h.attachments
            .upload(&owner, id, pdf("slides.pptx", 64), &UploadPolicy::documents())
            .await
            .unwrap();
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_summary_respects_upload_deadline() {
        let summarizer = Arc::new(FakeSummarizer {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        let h = Harness::with_summarizer(summarizer.clone()).await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;

        let ctx = owner.clone().with_deadline(Duration::from_millis(200));
        let started = std::time::Instant::now();
        let outcome = h
            .attachments
            .upload(&ctx, id, pdf("notes.pdf", 64), &UploadPolicy::documents())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(outcome.derived.is_none());
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.db.attachment_count().await, 1);
    }

    #[tokio::test]
    async fn test_read_rules_follow_parent() {
        let h = Harness::new().await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;
        let attachment = h.upload(&owner, id, "notes.pdf", 32).await.attachment;

        assert!(h.attachments.get(&h.student("CSE", "2nd"), attachment.id).await.is_ok());
        let err = h
            .attachments
            .download(&h.student("CSE", "3rd"), attachment.id)
            .await
            .err()
            .expect("download should be rejected");
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let err = h.attachments.get(&owner, AttachmentId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_removes_blob_then_row() {
        let h = Harness::new().await;
        let owner = h.faculty();
        let id = material_id(&h, &owner).await;
        let attachment = h.upload(&owner, id, "notes.pdf", 32).await.attachment;

        let err = h
            .attachments
            .delete(&h.student("CSE", "2nd"), attachment.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        h.blobs.fail_next_deletes(10);
        let err = h.attachments.delete(&owner, attachment.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert_eq!(h.db.attachment_count().await, 1);

        h.blobs.fail_next_deletes(0);
        h.attachments.delete(&owner, attachment.id).await.unwrap();
        assert_eq!(h.db.attachment_count().await, 0);
        assert!(h.blobs.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_policy_name() {
        let h = Harness::new().await;
        assert!(h.attachments.policy(None).is_ok());
        assert!(h.attachments.policy(Some("images")).is_ok());
        let err = h.attachments.policy(Some("videos")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
