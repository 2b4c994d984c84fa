//! Resource CRUD with ownership and scope enforcement.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use campus_core::error::AppError;
use campus_core::types::{timestamp, PageRequest, PageResponse, ResourceId};
use campus_database::repositories::{
    AttachmentRepository, ResourceRepository, SubmissionRepository,
};
use campus_entity::attachment::Attachment;
use campus_entity::notification::NotificationEvent;
use campus_entity::resource::model::MAX_TITLE_LEN;
use campus_entity::resource::{
    Resource, ResourceDetail, ResourceFilter, ResourceKind, Scope, Status,
};
use campus_storage::StorageManager;

use super::access;
use crate::context::RequestContext;
use crate::notification::Notifier;
use crate::workflow::apply_transition;

/// Input for [`ResourceService::create`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResource {
    /// What is being created.
    pub kind: ResourceKind,
    /// Visibility scope; department and year are required.
    pub scope: Scope,
    /// Display title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Initial status; defaults to the kind's workflow default.
    #[serde(default)]
    pub status: Option<Status>,
    /// Optional deadline.
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
}

/// Input for [`ResourceService::list_by_scope`].
#[derive(Debug, Clone)]
pub struct ResourceQuery {
    /// Department and year to match, plus subject when given.
    pub scope: Scope,
    /// Restrict to one kind.
    pub kind: Option<ResourceKind>,
    /// Restrict to one status.
    pub status: Option<Status>,
    /// Page to return.
    pub page: PageRequest,
}

/// Input for [`ResourceService::list_owned`].
#[derive(Debug, Clone, Default)]
pub struct OwnedQuery {
    /// Restrict to one kind.
    pub kind: Option<ResourceKind>,
    /// Restrict to one status.
    pub status: Option<Status>,
    /// Page to return.
    pub page: PageRequest,
}

/// Partial update for [`ResourceService::update`].
///
/// The scope fields exist only so that an attempt to change the scope can
/// be reported; any of them being present fails the whole patch.
#[derive(Debug, Clone, Default)]
pub struct ResourcePatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New deadline; `Some(None)` clears it.
    pub due_at: Option<Option<DateTime<Utc>>>,
    /// New status, checked against the transition table.
    pub status: Option<Status>,
    /// Reason recorded with a status change.
    pub status_reason: Option<String>,
    /// Compare-and-swap token from the caller's last read.
    pub expected_updated_at: Option<DateTime<Utc>>,
    /// Rejected: a whole replacement scope.
    pub scope: Option<serde_json::Value>,
    /// Rejected: department.
    pub department: Option<String>,
    /// Rejected: year.
    pub year: Option<String>,
    /// Rejected: subject.
    pub subject: Option<String>,
}

impl ResourcePatch {
    /// Names of scope fields present in the patch.
    pub fn scope_fields(&self) -> Vec<&'static str> {
        [
            ("scope", self.scope.is_some()),
            ("department", self.department.is_some()),
            ("year", self.year.is_some()),
            ("subject", self.subject.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

/// Trim a title and enforce the non-blank and length rules.
fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

/// Creates, reads, updates and deletes scoped resources.
#[derive(Clone)]
pub struct ResourceService {
    resources: Arc<dyn ResourceRepository>,
    attachments: Arc<dyn AttachmentRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    storage: StorageManager,
    notifier: Arc<Notifier>,
}

impl std::fmt::Debug for ResourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService").finish()
    }
}

impl ResourceService {
    /// Creates a new resource service.
    pub fn new(
        resources: Arc<dyn ResourceRepository>,
        attachments: Arc<dyn AttachmentRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        storage: StorageManager,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            resources,
            attachments,
            submissions,
            storage,
            notifier,
        }
    }

    /// Creates a resource owned by the caller and notifies its scope.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: NewResource,
    ) -> Result<ResourceDetail, AppError> {
        let scope = Scope::new(
            &input.scope.department,
            &input.scope.year,
            input.scope.subject.as_deref(),
        )?;
        let title = validate_title(&input.title)?;
        let workflow = input.kind.workflow();
        let status = input.status.unwrap_or_else(|| input.kind.default_status());
        if !workflow.accepts_initial(status) {
            return Err(AppError::validation(format!(
                "A {} cannot be created as {status}",
                input.kind.label()
            )));
        }

        let now = timestamp::now();
        let resource = Resource {
            id: ResourceId::new(),
            owner_id: ctx.user_id,
            kind: input.kind,
            scope,
            title,
            description: input.description.unwrap_or_default(),
            status,
            due_at: input.due_at,
            status_changed_at: None,
            status_changed_by: None,
            status_reason: None,
            status_metadata: None,
            created_at: now,
            updated_at: now,
        };
        self.resources.insert(&resource).await?;

        info!(
            resource_id = %resource.id,
            kind = %resource.kind,
            scope = %resource.scope,
            owner_id = %ctx.user_id,
            status = %resource.status,
            "Resource created"
        );

        self.notifier
            .fan_out(
                &resource,
                NotificationEvent::ResourceCreated,
                ctx.user_id,
                ctx.deadline_or(self.notifier.default_deadline()),
            )
            .await;

        Ok(ResourceDetail::new(resource, Vec::new()))
    }

    /// Fetches a resource with its attachments.
    pub async fn get(&self, ctx: &RequestContext, id: ResourceId) -> Result<ResourceDetail, AppError> {
        let resource = access::load(self.resources.as_ref(), id).await?;
        access::ensure_readable(ctx, &resource)?;
        let attachments = self.attachments.list_by_resource(id).await?;
        Ok(ResourceDetail::new(resource, attachments))
    }

    /// Lists resources in a scope, newest first.
    ///
    /// A caller outside the queried department and year only sees the
    /// resources they own there.
    pub async fn list_by_scope(
        &self,
        ctx: &RequestContext,
        query: ResourceQuery,
    ) -> Result<PageResponse<ResourceDetail>, AppError> {
        let owner_id = (!ctx.in_scope(&query.scope)).then_some(ctx.user_id);
        let filter = ResourceFilter {
            department: Some(query.scope.department),
            year: Some(query.scope.year),
            subject: query.scope.subject,
            kind: query.kind,
            status: query.status,
            owner_id,
        };
        self.page(&filter, &query.page).await
    }

    /// Lists the caller's own resources, newest first.
    pub async fn list_owned(
        &self,
        ctx: &RequestContext,
        query: OwnedQuery,
    ) -> Result<PageResponse<ResourceDetail>, AppError> {
        let filter = ResourceFilter {
            kind: query.kind,
            status: query.status,
            owner_id: Some(ctx.user_id),
            ..Default::default()
        };
        self.page(&filter, &query.page).await
    }

    async fn page(
        &self,
        filter: &ResourceFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<ResourceDetail>, AppError> {
        let (rows, total) = self.resources.list(filter, page).await?;
        let ids: Vec<ResourceId> = rows.iter().map(|r| r.id).collect();

        let mut by_resource: HashMap<ResourceId, Vec<Attachment>> = HashMap::new();
        for attachment in self.attachments.list_by_resources(&ids).await? {
            by_resource
                .entry(attachment.resource_id)
                .or_default()
                .push(attachment);
        }

        let items = rows
            .into_iter()
            .map(|r| {
                let attachments = by_resource.remove(&r.id).unwrap_or_default();
                ResourceDetail::new(r, attachments)
            })
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    /// Applies a partial update. Owner only.
    ///
    /// Scope fields are refused with `Validation`. A status change goes
    /// through the transition table; repeating the current status is not a
    /// change. A stale `expected_updated_at` yields `Conflict`.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: ResourceId,
        patch: ResourcePatch,
    ) -> Result<ResourceDetail, AppError> {
        let scope_fields = patch.scope_fields();
        if !scope_fields.is_empty() {
            return Err(AppError::validation(format!(
                "Scope is fixed at creation; remove {} from the update",
                scope_fields.join(", ")
            )));
        }

        let mut resource = access::load(self.resources.as_ref(), id).await?;
        access::ensure_owner(ctx, &resource, "update")?;
        access::ensure_fresh(&resource, patch.expected_updated_at)?;
        let expected = resource.updated_at;

        let mut changed = false;
        if let Some(title) = patch.title {
            let title = validate_title(&title)?;
            changed |= title != resource.title;
            resource.title = title;
        }
        if let Some(description) = patch.description {
            changed |= description != resource.description;
            resource.description = description;
        }
        if let Some(due_at) = patch.due_at {
            changed |= due_at != resource.due_at;
            resource.due_at = due_at;
        }

        let mut status_changed = false;
        if let Some(target) = patch.status.filter(|s| *s != resource.status) {
            apply_transition(&mut resource, target, patch.status_reason, None, ctx.user_id)?;
            status_changed = true;
            changed = true;
        }

        if !changed {
            let attachments = self.attachments.list_by_resource(id).await?;
            return Ok(ResourceDetail::new(resource, attachments));
        }

        if !status_changed {
            resource.updated_at = timestamp::advance(expected);
        }
        let saved = self.resources.update(&resource, expected).await?;
        info!(resource_id = %id, status_changed, "Resource updated");

        if status_changed {
            self.notifier
                .fan_out(
                    &saved,
                    NotificationEvent::StatusChanged,
                    ctx.user_id,
                    ctx.deadline_or(self.notifier.default_deadline()),
                )
                .await;
        }

        let attachments = self.attachments.list_by_resource(id).await?;
        Ok(ResourceDetail::new(saved, attachments))
    }

    /// Deletes a resource, its attachment rows and their blobs. Owner only.
    ///
    /// Assignments and exams may only be deleted while `draft` or
    /// `scheduled` and before any submission exists. Rows go first in one
    /// guarded step, then blobs; blobs that cannot be removed after retries
    /// are logged for the orphan sweep.
    pub async fn delete(&self, ctx: &RequestContext, id: ResourceId) -> Result<(), AppError> {
        let resource = access::load(self.resources.as_ref(), id).await?;
        access::ensure_owner(ctx, &resource, "delete")?;

        if resource.kind.restricts_delete() {
            if !resource.is_deletable_status() {
                return Err(AppError::conflict(format!(
                    "A {} can only be deleted while draft or scheduled (currently {})",
                    resource.kind.label(),
                    resource.status
                )));
            }
            let submissions = self.submissions.count_by_resource(id).await?;
            if submissions > 0 {
                return Err(AppError::conflict(format!(
                    "{} has {submissions} submission(s) and cannot be deleted",
                    resource.kind.label()
                )));
            }
        }

        let removed = self
            .resources
            .delete_cascade(id, resource.updated_at)
            .await?;
        let refs: Vec<String> = removed.iter().map(|a| a.storage_ref.clone()).collect();
        let leftovers = self.storage.delete_all(&refs).await;
        if !leftovers.is_empty() {
            error!(
                resource_id = %id,
                leftovers = ?leftovers,
                "Attachment blobs left behind after resource delete"
            );
        }

        info!(
            resource_id = %id,
            attachments = removed.len(),
            blobs_left = leftovers.len(),
            "Resource deleted"
        );
        Ok(())
    }
}
