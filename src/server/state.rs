//! Application state shared across HTTP handlers
//!
//! Explicit application-context object constructed once at startup; every
//! handler receives it through `web::Data` instead of reaching for ambient
//! global state.

use crate::auth::AuthSystem;
use crate::config::Config;
use crate::storage::StorageLayer;
use std::sync::Arc;

/// HTTP server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Configuration (shared read-only)
    pub config: Arc<Config>,
    /// Authentication system
    pub auth: Arc<AuthSystem>,
    /// Storage layer
    pub storage: Arc<StorageLayer>,
}

impl AppState {
    /// Create a new AppState with shared resources
    pub fn new(config: Config, auth: AuthSystem, storage: Arc<StorageLayer>) -> Self {
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            storage,
        }
    }
}
