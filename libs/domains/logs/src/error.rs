use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Log not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Stored log is malformed: {0}")]
    Malformed(String),

    #[error("BSON encoding error: {0}")]
    Encoding(#[from] mongodb::bson::ser::Error),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type LogResult<T> = Result<T, LogError>;

impl From<LogError> for AppError {
    fn from(err: LogError) -> Self {
        match err {
            LogError::NotFound(id) => AppError::NotFound(format!("Log '{}' not found", id)),
            LogError::Validation(msg) => AppError::BadRequest(msg),
            LogError::Database(e) => AppError::Database(e),
            e @ (LogError::Malformed(_) | LogError::Encoding(_) | LogError::Internal(_)) => {
                AppError::InternalServerError(e.to_string())
            }
        }
    }
}

impl IntoResponse for LogError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
