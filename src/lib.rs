//! # cms-rs
//!
//! Backend for a small content-management system: user registration and
//! authentication, role-based access control with a flat role/permission
//! model, administrative CRUD over users/roles/permissions and idempotent
//! bootstrap seeding.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cms_rs::server::run_server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     run_server().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{CmsError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
