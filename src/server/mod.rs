//! HTTP server implementation
//!
//! This module provides the HTTP server, routing and access-control gate.

pub mod builder;
pub mod gate;
pub mod routes;
pub mod server;
pub mod state;

pub use builder::run_server;
pub use state::AppState;
