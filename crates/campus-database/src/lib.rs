//! # campus-database
//!
//! Repository traits for every campus entity, with a PostgreSQL
//! implementation (sqlx) and an in-memory implementation used by tests and
//! by the `memory` database backend.

pub mod connection;
pub mod migration;
pub mod repositories;

use std::sync::Arc;

use campus_core::config::DatabaseConfig;
use campus_core::error::AppError;
use tracing::info;

pub use connection::DatabasePool;
use repositories::memory::MemoryDatabase;
use repositories::postgres::{
    PgAttachmentRepository, PgNotificationRepository, PgRecipientDirectory, PgResourceRepository,
    PgSubmissionRepository,
};
use repositories::{
    AttachmentRepository, NotificationRepository, RecipientDirectory, ResourceRepository,
    SubmissionRepository,
};

/// Every repository the services need, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    /// Resource rows.
    pub resources: Arc<dyn ResourceRepository>,
    /// Attachment metadata rows.
    pub attachments: Arc<dyn AttachmentRepository>,
    /// Notification rows.
    pub notifications: Arc<dyn NotificationRepository>,
    /// Submission rows.
    pub submissions: Arc<dyn SubmissionRepository>,
    /// Recipient lookup for fan-out.
    pub directory: Arc<dyn RecipientDirectory>,
    /// Pool handle, present for the PostgreSQL backend.
    pub pool: Option<DatabasePool>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories")
            .field("backend", &self.backend())
            .finish()
    }
}

impl Repositories {
    /// Build PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            resources: Arc::new(PgResourceRepository::new(pg.clone())),
            attachments: Arc::new(PgAttachmentRepository::new(pg.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pg.clone())),
            submissions: Arc::new(PgSubmissionRepository::new(pg.clone())),
            directory: Arc::new(PgRecipientDirectory::new(pg)),
            pool: Some(pool),
        }
    }

    /// Build repositories backed by a single in-memory store.
    pub fn memory(db: Arc<MemoryDatabase>) -> Self {
        Self {
            resources: db.clone(),
            attachments: db.clone(),
            notifications: db.clone(),
            submissions: db.clone(),
            directory: db,
            pool: None,
        }
    }

    /// Connect the backend named in configuration, running migrations for
    /// PostgreSQL when enabled.
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, AppError> {
        match config.backend.as_str() {
            "postgres" => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    migration::run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
            "memory" => {
                info!("Using in-memory database backend; data is lost on restart");
                Ok(Self::memory(Arc::new(MemoryDatabase::new())))
            }
            other => Err(AppError::configuration(format!(
                "Unknown database backend '{other}'"
            ))),
        }
    }

    /// Name of the active backend.
    pub fn backend(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Check backend connectivity.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }
}
