//! Resource status transitions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use campus_core::error::AppError;
use campus_core::types::{timestamp, ResourceId, UserId};
use campus_database::repositories::{AttachmentRepository, ResourceRepository};
use campus_entity::notification::NotificationEvent;
use campus_entity::resource::{Resource, ResourceDetail, Status};

use crate::context::RequestContext;
use crate::notification::Notifier;
use crate::resource::access;

/// A requested status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    /// Status to move to.
    pub target: Status,
    /// Reason, required when rejecting.
    #[serde(default)]
    pub reason: Option<String>,
    /// Arbitrary data recorded with the change.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// Compare-and-swap token from the caller's last read.
    #[serde(default)]
    pub expected_updated_at: Option<DateTime<Utc>>,
}

impl TransitionRequest {
    /// A bare transition to `target`.
    pub fn to(target: Status) -> Self {
        Self {
            target,
            reason: None,
            metadata: None,
            expected_updated_at: None,
        }
    }

    /// Attach a reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Check `resource.status -> target` against the table and stamp the audit
/// fields on success. Does not persist anything.
pub(crate) fn apply_transition(
    resource: &mut Resource,
    target: Status,
    reason: Option<String>,
    metadata: Option<serde_json::Value>,
    actor: UserId,
) -> Result<(), AppError> {
    let from = resource.status;
    if !from.can_transition_to(target) {
        return Err(AppError::invalid_transition(format!(
            "{} cannot move from {from} to {target}",
            resource.kind.label()
        )));
    }
    if target.requires_reason() && reason.as_deref().is_none_or(|r| r.trim().is_empty()) {
        return Err(AppError::validation(format!(
            "A reason is required to mark a {} as {target}",
            resource.kind.label()
        )));
    }

    let now = timestamp::advance(resource.updated_at);
    resource.status = target;
    resource.status_changed_at = Some(now);
    resource.status_changed_by = Some(actor);
    resource.status_reason = reason;
    resource.status_metadata = metadata;
    resource.updated_at = now;
    Ok(())
}

/// Moves resources through their workflow.
#[derive(Clone)]
pub struct WorkflowService {
    resources: Arc<dyn ResourceRepository>,
    attachments: Arc<dyn AttachmentRepository>,
    notifier: Arc<Notifier>,
}

impl std::fmt::Debug for WorkflowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowService").finish()
    }
}

impl WorkflowService {
    /// Creates a new workflow service.
    pub fn new(
        resources: Arc<dyn ResourceRepository>,
        attachments: Arc<dyn AttachmentRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            resources,
            attachments,
            notifier,
        }
    }

    /// Moves a resource to `request.target`. Owner only.
    ///
    /// The write is guarded by `updated_at`; a stale `expected_updated_at`
    /// or a concurrent writer yields `Conflict`. Recipients in scope are
    /// notified afterwards on a best-effort basis.
    pub async fn transition(
        &self,
        ctx: &RequestContext,
        id: ResourceId,
        request: TransitionRequest,
    ) -> Result<ResourceDetail, AppError> {
        let mut resource = access::load(self.resources.as_ref(), id).await?;
        access::ensure_owner(ctx, &resource, "change the status of")?;
        access::ensure_fresh(&resource, request.expected_updated_at)?;

        let expected = resource.updated_at;
        let from = resource.status;
        apply_transition(
            &mut resource,
            request.target,
            request.reason,
            request.metadata,
            ctx.user_id,
        )?;
        let saved = self.resources.update(&resource, expected).await?;

        info!(
            resource_id = %id,
            kind = %saved.kind,
            from = %from,
            to = %saved.status,
            actor = %ctx.user_id,
            "Resource status changed"
        );

        self.notifier
            .fan_out(
                &saved,
                NotificationEvent::StatusChanged,
                ctx.user_id,
                ctx.deadline_or(self.notifier.default_deadline()),
            )
            .await;

        let attachments = self.attachments.list_by_resource(id).await?;
        Ok(ResourceDetail::new(saved, attachments))
    }
}
