//! Storage layer for the CMS backend
//!
//! A thin wrapper holding the database handle; constructed once at startup
//! and passed explicitly into every component that needs persistence.

pub mod database;

use crate::config::DatabaseConfig;
use crate::utils::error::Result;
use tracing::info;

pub use database::Database;

/// Storage layer owning the persistence collaborators
#[derive(Debug, Clone)]
pub struct StorageLayer {
    /// Relational database
    pub database: Database,
}

impl StorageLayer {
    /// Connect the storage layer
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Initializing storage layer");
        let database = Database::new(config).await?;
        Ok(Self { database })
    }

    /// Borrow the database handle
    pub fn db(&self) -> &Database {
        &self.database
    }

    /// Check storage health
    pub async fn health_check(&self) -> bool {
        self.database.health_check().await
    }
}
