//! Database connectors and utilities.
//!
//! The service stores everything in MongoDB; this crate owns connecting to
//! it (with startup retry), health probing and collection index housekeeping.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connector, health checks and index helpers
//! - `config` - `core_config::FromEnv` support for [`mongodb::MongoConfig`]
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{self, MongoConfig};
//!
//! let config = MongoConfig::new("mongodb://localhost:27017/attendance");
//! let client = mongodb::connect_from_config_with_retry(&config, None).await?;
//! let db = mongodb::resolve_database(&client, &config);
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{RetryConfig, retry, retry_with_backoff};
