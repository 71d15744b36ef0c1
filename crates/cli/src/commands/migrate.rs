//! Database migration command.
//!
//! Applies the migrations embedded in `emporium_store::db::MIGRATOR`
//! (`crates/store/migrations/`). Already applied migrations are skipped.

use emporium_store::db;

use super::{CommandError, connect};

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending store migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!(
        available = db::MIGRATOR.iter().count(),
        "Running store migrations..."
    );
    db::migrate(&pool).await?;

    tracing::info!("Store migrations complete!");
    Ok(())
}
