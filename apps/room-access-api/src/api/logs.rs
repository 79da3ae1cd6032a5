//! Logs API routes

use axum::Router;
use domain_logs::{LogService, MongoLogRepository, handlers};

use crate::state::AppState;

/// Create logs router
pub fn router(state: &AppState) -> Router {
    let repository = MongoLogRepository::new(state.db.clone());
    handlers::router(LogService::new(repository))
}

pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    MongoLogRepository::new(db.clone()).init_indexes().await?;
    Ok(())
}
