//! SeaORM-based database layer
//!
//! Owns the connection pool and exposes the create/update/delete and
//! lookup-by-unique-key operations the rest of the crate uses. Uniqueness is
//! the only invariant enforcement delegated to the store: constraint
//! violations surface as [`CmsError::Conflict`].

pub mod entities;
pub mod migration;

mod permission_ops;
mod role_ops;
mod user_ops;

use crate::config::DatabaseConfig;
use crate::utils::error::{CmsError, Result};
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{info, warn};

use migration::Migrator;

/// Database handle shared by every component that needs persistence
#[derive(Debug, Clone)]
pub struct Database {
    db: DatabaseConnection,
}

impl Database {
    /// Open a connection pool against the configured URL
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.connection_timeout))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .sqlx_logging(false);

        let db = SeaDatabase::connect(opt).await.map_err(CmsError::Database)?;

        info!("Database connection established");
        Ok(Self { db })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");
        Migrator::up(&self.db, None).await.map_err(|e| {
            warn!("Migration failed: {}", e);
            CmsError::Database(e)
        })?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Borrow the raw connection (used by the ops modules)
    pub(crate) fn conn(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Check database liveness with a trivial query
    pub async fn health_check(&self) -> bool {
        self.db.ping().await.is_ok()
    }
}

/// Map a unique-constraint violation to a caller-facing conflict error;
/// any other database error passes through unchanged.
pub(crate) fn map_unique_violation(err: DbErr, message: &str) -> CmsError {
    let text = err.to_string().to_lowercase();
    if text.contains("unique") || text.contains("duplicate") {
        CmsError::conflict(message)
    } else {
        CmsError::Database(err)
    }
}
