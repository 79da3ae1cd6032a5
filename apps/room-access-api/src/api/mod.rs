//! API routes module
//!
//! This module defines all HTTP routes of the room access API.

pub mod health;
pub mod logs;
pub mod users;

use axum::Router;
use axum_helpers::{create_router, health_router, liveness_router};

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Domain routes plus readiness
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/user", users::router(state))
        .nest("/log", logs::router(state))
        .merge(health::router(state.clone()))
}

/// The complete application: `/`, `/health`, `/ready`, `/user`, `/log`,
/// Swagger UI and the shared middleware stack.
pub fn app(state: &AppState) -> std::io::Result<Router> {
    let apis = routes(state)
        .merge(liveness_router())
        .merge(health_router(state.config.app));

    create_router::<ApiDoc>(apis)
}

/// Create collection indexes; called once at startup.
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    users::init_indexes(db).await?;
    logs::init_indexes(db).await?;
    Ok(())
}
