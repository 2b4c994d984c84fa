//! Embedded schema migrations.

use sqlx::PgPool;
use tracing::info;

use campus_core::error::{AppError, ErrorKind};

/// Apply every migration under `migrations/` that the database has not seen.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let migrator = sqlx::migrate!("../../migrations");
    info!(
        available = migrator.iter().count(),
        "Applying pending schema migrations"
    );

    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, format!("Schema migration failed: {e}"), e)
    })?;

    info!("Schema is up to date");
    Ok(())
}
