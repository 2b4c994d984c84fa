//! Recipient lookup for notification fan-out.

use async_trait::async_trait;

use campus_core::result::AppResult;
use campus_core::types::UserId;
use campus_entity::profile::Profile;
use campus_entity::resource::Scope;

/// Resolves the principals inside a scope.
#[async_trait]
pub trait RecipientDirectory: Send + Sync + 'static {
    /// Everyone in `scope`'s department and year except `actor`, in a stable order.
    async fn resolve(&self, scope: &Scope, actor: UserId) -> AppResult<Vec<UserId>>;

    /// Insert or replace a directory entry.
    async fn upsert(&self, profile: &Profile) -> AppResult<()>;
}
