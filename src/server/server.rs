//! HTTP server core implementation
//!
//! This module provides the HttpServer struct and its core methods.

use crate::auth::AuthSystem;
use crate::config::{Config, ServerConfig};
use crate::server::routes;
use crate::server::state::AppState;
use crate::storage::StorageLayer;
use crate::utils::error::{CmsError, Result};
use actix_cors::Cors;
use actix_web::{middleware::DefaultHeaders, web, App, HttpServer as ActixHttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server: connects storage, applies pending
    /// migrations and wires the authentication system.
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let storage = Arc::new(StorageLayer::new(&config.database).await?);
        storage.db().migrate().await?;

        let auth = AuthSystem::new(&config.security, Arc::clone(&storage));
        let state = AppState::new(config.clone(), auth, storage);

        Ok(Self {
            config: config.server.clone(),
            state,
        })
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .wrap(DefaultHeaders::new().add(("Server", "cms-rs")))
            .configure(routes::pages::configure_routes)
            .configure(routes::auth::configure_routes)
            .configure(routes::admin::configure_routes)
            .default_service(web::route().to(routes::not_found))
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);

        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .bind(&bind_addr)
            .map_err(|e| {
                CmsError::Internal(format!("Failed to bind to {}: {}", bind_addr, e))
            })?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| CmsError::Internal(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
