//! PostgreSQL persistence adapter.

mod diesel_storage;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_storage::DieselStorage;
pub use pool::{DbPool, PoolConfig};

use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::StorageError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run pending migrations over a short-lived synchronous connection.
///
/// Called once at boot, before the async pool is built.
pub fn run_migrations(database_url: &str) -> Result<(), StorageError> {
    let mut conn = diesel::pg::PgConnection::establish(database_url)
        .map_err(|err| StorageError::unavailable(err.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| StorageError::query(format!("migrations failed: {err}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied database migrations");
    }
    Ok(())
}
