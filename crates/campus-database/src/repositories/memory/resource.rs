use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_core::types::{timestamp, PageRequest, ResourceId};
use campus_entity::attachment::Attachment;
use campus_entity::resource::{Resource, ResourceFilter};

use super::MemoryDatabase;
use crate::repositories::ResourceRepository;

fn stale(id: ResourceId) -> AppError {
    AppError::conflict(format!(
        "Resource {id} was modified concurrently; reload and retry"
    ))
}

fn missing(id: ResourceId) -> AppError {
    AppError::not_found(format!("Resource {id} not found"))
}

#[async_trait]
impl ResourceRepository for MemoryDatabase {
    async fn insert(&self, resource: &Resource) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.resources.contains_key(&resource.id) {
            return Err(AppError::conflict(format!(
                "Resource {} already exists",
                resource.id
            )));
        }
        tables.resources.insert(resource.id, resource.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ResourceId) -> AppResult<Option<Resource>> {
        Ok(self.tables.read().await.resources.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &ResourceFilter,
        page: &PageRequest,
    ) -> AppResult<(Vec<Resource>, u64)> {
        let tables = self.tables.read().await;
        let mut matched: Vec<&Resource> = tables
            .resources
            .values()
            .filter(|r| filter.matches(r))
            .collect();
        matched.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let total = matched.len() as u64;
        let rows = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok((rows, total))
    }

    async fn update(
        &self,
        resource: &Resource,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Resource> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .resources
            .get_mut(&resource.id)
            .ok_or_else(|| missing(resource.id))?;
        if stored.updated_at != expected_updated_at {
            return Err(stale(resource.id));
        }

        stored.title = resource.title.clone();
        stored.description = resource.description.clone();
        stored.status = resource.status;
        stored.due_at = resource.due_at;
        stored.status_changed_at = resource.status_changed_at;
        stored.status_changed_by = resource.status_changed_by;
        stored.status_reason = resource.status_reason.clone();
        stored.status_metadata = resource.status_metadata.clone();
        stored.updated_at = resource.updated_at;
        Ok(stored.clone())
    }

    async fn touch(&self, id: ResourceId) -> AppResult<DateTime<Utc>> {
        let mut tables = self.tables.write().await;
        let stored = tables.resources.get_mut(&id).ok_or_else(|| missing(id))?;
        stored.updated_at = timestamp::advance(stored.updated_at);
        Ok(stored.updated_at)
    }

    async fn delete_cascade(
        &self,
        id: ResourceId,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Vec<Attachment>> {
        let mut tables = self.tables.write().await;
        let stored = tables.resources.get(&id).ok_or_else(|| missing(id))?;
        if stored.updated_at != expected_updated_at {
            return Err(stale(id));
        }
        if tables.submissions.values().any(|s| s.resource_id == id) {
            return Err(AppError::conflict(format!(
                "Resource {id} still has submissions"
            )));
        }

        let mut removed: Vec<Attachment> = Vec::new();
        tables.attachments.retain(|_, a| {
            if a.resource_id == id {
                removed.push(a.clone());
                false
            } else {
                true
            }
        });
        tables.resources.remove(&id);

        removed.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(removed)
    }
}
