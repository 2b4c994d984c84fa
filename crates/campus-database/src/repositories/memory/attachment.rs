use async_trait::async_trait;

use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_core::types::{AttachmentId, ResourceId};
use campus_entity::attachment::Attachment;

use super::MemoryDatabase;
use crate::repositories::AttachmentRepository;

fn oldest_first(rows: &mut [Attachment]) {
    rows.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
}

#[async_trait]
impl AttachmentRepository for MemoryDatabase {
    async fn insert(&self, attachment: &Attachment) -> AppResult<()> {
        if self.take_attachment_fault().await {
            return Err(AppError::database("Injected attachment insert failure"));
        }

        let mut tables = self.tables.write().await;
        if !tables.resources.contains_key(&attachment.resource_id) {
            return Err(AppError::conflict(format!(
                "Resource {} does not exist",
                attachment.resource_id
            )));
        }
        if tables.attachments.contains_key(&attachment.id) {
            return Err(AppError::conflict(format!(
                "Attachment {} already exists",
                attachment.id
            )));
        }
        tables.attachments.insert(attachment.id, attachment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: AttachmentId) -> AppResult<Option<Attachment>> {
        Ok(self.tables.read().await.attachments.get(&id).cloned())
    }

    async fn list_by_resource(&self, resource_id: ResourceId) -> AppResult<Vec<Attachment>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Attachment> = tables
            .attachments
            .values()
            .filter(|a| a.resource_id == resource_id)
            .cloned()
            .collect();
        oldest_first(&mut rows);
        Ok(rows)
    }

    async fn list_by_resources(&self, resource_ids: &[ResourceId]) -> AppResult<Vec<Attachment>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Attachment> = tables
            .attachments
            .values()
            .filter(|a| resource_ids.contains(&a.resource_id))
            .cloned()
            .collect();
        oldest_first(&mut rows);
        Ok(rows)
    }

    async fn delete(&self, id: AttachmentId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.attachments.remove(&id).is_some();
        if removed {
            for other in tables.attachments.values_mut() {
                if other.derived_from == Some(id) {
                    other.derived_from = None;
                }
            }
        }
        Ok(removed)
    }
}
