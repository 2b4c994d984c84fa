use async_trait::async_trait;

use campus_core::result::AppResult;
use campus_core::types::UserId;
use campus_entity::profile::Profile;
use campus_entity::resource::Scope;

use super::MemoryDatabase;
use crate::repositories::RecipientDirectory;

#[async_trait]
impl RecipientDirectory for MemoryDatabase {
    async fn resolve(&self, scope: &Scope, actor: UserId) -> AppResult<Vec<UserId>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .filter(|p| p.user_id != actor && p.in_scope(scope))
            .map(|p| p.user_id)
            .collect())
    }

    async fn upsert(&self, profile: &Profile) -> AppResult<()> {
        self.tables
            .write()
            .await
            .profiles
            .insert(profile.user_id, profile.clone());
        Ok(())
    }
}
