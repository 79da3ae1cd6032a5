//! Server infrastructure: router assembly, health endpoints and graceful shutdown.
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router, liveness_router};
//!
//! let routes = Router::new()
//!     .merge(liveness_router())
//!     .merge(health_router(app_info!()))
//!     .nest("/user", users_router);
//! let router = create_router::<ApiDoc>(routes)?;
//! create_production_app(router, &config.server, Duration::from_secs(30), async {}).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router, handle_panic};
pub use health::{
    HealthCheckFuture, HealthResponse, LIVENESS_MESSAGE, health_router, liveness_router,
    run_health_checks,
};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
