//! Server startup
//!
//! Environment-driven entry point used by the `cms` binary.

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use tracing::info;

/// Run the server with configuration loaded from the environment
pub async fn run_server() -> Result<()> {
    info!("Starting cms-rs");

    let config = Config::from_env()?;

    let server = HttpServer::new(&config).await?;
    info!(
        "Server starting at: http://{}:{}",
        config.server().host,
        config.server().port
    );

    server.start().await
}
