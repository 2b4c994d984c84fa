//! Read and ownership checks shared by every service.

use chrono::{DateTime, Utc};

use campus_core::error::AppError;
use campus_core::types::ResourceId;
use campus_database::repositories::ResourceRepository;
use campus_entity::resource::Resource;

use crate::context::RequestContext;

/// Fetch a resource or fail with `NotFound`.
pub(crate) async fn load(
    repo: &dyn ResourceRepository,
    id: ResourceId,
) -> Result<Resource, AppError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Resource {id} not found")))
}

/// Owners always read; others need a cohort inside the resource's scope.
pub(crate) fn ensure_readable(ctx: &RequestContext, resource: &Resource) -> Result<(), AppError> {
    if ctx.can_read(resource) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "Resource {} is limited to {}",
            resource.id, resource.scope
        )))
    }
}

/// Only the owner may mutate.
pub(crate) fn ensure_owner(
    ctx: &RequestContext,
    resource: &Resource,
    action: &str,
) -> Result<(), AppError> {
    if resource.is_owned_by(ctx.user_id) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "Only the owner can {action} resource {}",
            resource.id
        )))
    }
}

/// Fail with `Conflict` when the caller's token no longer matches.
pub(crate) fn ensure_fresh(
    resource: &Resource,
    expected_updated_at: Option<DateTime<Utc>>,
) -> Result<(), AppError> {
    match expected_updated_at {
        Some(expected) if expected != resource.updated_at => Err(AppError::conflict(format!(
            "Resource {} changed since it was read; reload and retry",
            resource.id
        ))),
        _ => Ok(()),
    }
}
