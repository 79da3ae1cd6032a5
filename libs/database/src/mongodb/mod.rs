//! MongoDB connector and utilities
//!
//! Connection management, health checks and index helpers.

mod config;
mod connector;
mod health;
mod indexes;

pub use config::{FALLBACK_DATABASE, MongoConfig};
pub use connector::{
    MongoError, connect_from_config, connect_from_config_with_retry, resolve_database,
};
pub use health::{HealthStatus, check_health, check_health_detailed};
pub use indexes::{
    DUPLICATE_KEY_CODE, drop_index_if_exists, duplicate_key_index, is_missing_namespace_or_index,
    parse_duplicate_key_index, server_error_code,
};

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database, bson};
