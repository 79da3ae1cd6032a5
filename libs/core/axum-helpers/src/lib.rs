//! # Axum Helpers
//!
//! Shared building blocks for the HTTP services in this workspace.
//!
//! ## Modules
//!
//! - **[`server`]**: Router assembly, liveness/health endpoints, graceful shutdown
//! - **[`http`]**: CORS configuration
//! - **[`errors`]**: Uniform error payload with error codes
//! - **[`response`]**: Success envelopes
//! - **[`extractors`]**: UUID path and validated JSON or form body extractors
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router, liveness_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let router = create_router::<ApiDoc>(liveness_router())?;
//!     create_production_app(router, &ServerConfig::default(), Duration::from_secs(30), async {}).await
//! }
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod response;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, liveness_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer_from_env, create_cors_layer, create_permissive_cors_layer};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use response::{ApiResponse, Created, MessageResponse};

pub use extractors::{UuidPath, ValidatedBody, ValidatedJson};
