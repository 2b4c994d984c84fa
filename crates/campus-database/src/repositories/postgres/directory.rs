//! Recipient directory backed by the `profiles` table.

use async_trait::async_trait;
use sqlx::PgPool;

use campus_core::error::{AppError, ErrorKind};
use campus_core::result::AppResult;
use campus_core::types::UserId;
use campus_entity::profile::Profile;
use campus_entity::resource::Scope;

use crate::repositories::RecipientDirectory;

/// PostgreSQL-backed [`RecipientDirectory`].
#[derive(Debug, Clone)]
pub struct PgRecipientDirectory {
    pool: PgPool,
}

impl PgRecipientDirectory {
    /// Create a new directory over `profiles`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientDirectory for PgRecipientDirectory {
    async fn resolve(&self, scope: &Scope, actor: UserId) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM profiles \
             WHERE department = $1 AND year = $2 AND user_id <> $3 ORDER BY user_id",
        )
        .bind(&scope.department)
        .bind(&scope.year)
        .bind(actor)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to resolve recipients", e))
    }

    async fn upsert(&self, profile: &Profile) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO profiles (user_id, role, department, year) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE \
             SET role = EXCLUDED.role, department = EXCLUDED.department, year = EXCLUDED.year",
        )
        .bind(profile.user_id)
        .bind(profile.role)
        .bind(&profile.department)
        .bind(&profile.year)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert profile", e))?;
        Ok(())
    }
}
