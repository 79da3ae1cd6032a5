//! Application state management.
//!
//! This module defines the shared application state passed to route builders.
//! The state contains:
//! - Configuration
//! - MongoDB client

use mongodb::{Client, Database};

/// Shared application state.
///
/// Cloning is cheap: the client and database handles share one connection pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    /// Database resolved from `MongoConfig::database_name`
    pub db: Database,
}
