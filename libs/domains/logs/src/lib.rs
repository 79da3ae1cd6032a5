//! Logs Domain
//!
//! Free-form log records. A log is whatever JSON object the caller sends,
//! stored verbatim next to a server-assigned UUID and `createdAt`/`updatedAt`.
//! The only rules: the body is a non-empty object and it does not set the
//! keys listed in [`models::RESERVED_KEYS`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_logs::{handlers, LogService, MongoLogRepository};
//!
//! # async fn example(db: mongodb::Database) -> Result<(), Box<dyn std::error::Error>> {
//! let repository = MongoLogRepository::new(db);
//! repository.init_indexes().await?;
//!
//! let router = handlers::router(LogService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{LogError, LogResult};
pub use handlers::ApiDoc;
pub use models::{LogEntry, LogFilter, LogPayload};
pub use mongodb::MongoLogRepository;
pub use repository::{InMemoryLogRepository, LogRepository};
pub use service::LogService;
