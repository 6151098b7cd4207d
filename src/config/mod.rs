//! Configuration management for the CMS backend
//!
//! Configuration is environment-driven (optionally via a `.env` file loaded by
//! the binaries). Every component receives the pieces it needs through
//! [`Config`]; nothing reads ambient global state after startup.

use crate::utils::error::{CmsError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info};

/// Main configuration struct for the CMS backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration (signing key, session lifetime)
    pub security: SecurityConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`sqlite://...` or `postgres://...`)
    pub url: String,
    /// Maximum pool connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Secret signing key for session tokens
    pub secret_key: String,
    /// Session token lifetime in seconds
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://cms.db?mode=rwc".to_string(),
            max_connections: 10,
            connection_timeout: 10,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key: "dev_key_change_me_in_production_envs".to_string(),
            session_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let defaults = Config::default();

        let server = ServerConfig {
            host: env::var("CMS_HOST").unwrap_or(defaults.server.host),
            port: parse_env("CMS_PORT", defaults.server.port)?,
        };

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            max_connections: parse_env("CMS_DB_MAX_CONNECTIONS", defaults.database.max_connections)?,
            connection_timeout: parse_env(
                "CMS_DB_CONNECT_TIMEOUT_SECS",
                defaults.database.connection_timeout,
            )?,
        };

        let security = SecurityConfig {
            secret_key: env::var("SECRET_KEY").unwrap_or(defaults.security.secret_key),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", defaults.security.session_ttl_secs)?,
        };

        let config = Self {
            server,
            database,
            security,
        };

        config.validate()?;
        Ok(config)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Get database configuration
    pub fn database(&self) -> &DatabaseConfig {
        &self.database
    }

    /// Get security configuration
    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        if self.server.host.is_empty() {
            return Err(CmsError::Config("Server host must not be empty".into()));
        }
        if self.server.port == 0 {
            return Err(CmsError::Config("Server port must not be 0".into()));
        }
        if self.database.url.is_empty() {
            return Err(CmsError::Config("Database URL must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(CmsError::Config(
                "Database pool must allow at least one connection".into(),
            ));
        }
        if self.security.secret_key.len() < 16 {
            return Err(CmsError::Config(
                "SECRET_KEY must be at least 16 characters".into(),
            ));
        }
        if self.security.session_ttl_secs == 0 {
            return Err(CmsError::Config(
                "Session lifetime must be greater than 0".into(),
            ));
        }

        debug!("Configuration validation completed");
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| CmsError::Config(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
