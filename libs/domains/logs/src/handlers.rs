use axum::{
    Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{ApiResponse, Created, ErrorResponse, MessageResponse, UuidPath, ValidatedBody};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::LogResult;
use crate::models::{LogEntry, LogFilter, LogPayload};
use crate::repository::LogRepository;
use crate::service::LogService;

/// OpenAPI documentation for the `/log` routes
#[derive(OpenApi)]
#[openapi(
    paths(list_logs, create_log, get_log, update_log, delete_log),
    components(schemas(LogEntry, LogPage, LogPayload, ErrorResponse, MessageResponse)),
    tags(
        (name = "Logs", description = "Free-form log records")
    )
)]
pub struct ApiDoc;

/// Create the logs router with all HTTP endpoints
pub fn router<R: LogRepository + 'static>(service: LogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_logs).post(create_log))
        .route("/{id}", get(get_log).put(update_log).delete(delete_log))
        .with_state(shared_service)
}

/// One page of logs
#[derive(Debug, Serialize, ToSchema)]
pub struct LogPage {
    pub items: Vec<LogEntry>,
    pub total: u64,
    pub limit: i64,
    pub offset: u64,
}

/// List logs, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Logs",
    params(LogFilter),
    responses(
        (status = 200, description = "Page of logs inside `{ success, data }`", body = LogPage),
        (status = 400, description = "Invalid paging", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn list_logs<R: LogRepository>(
    State(service): State<Arc<LogService<R>>>,
    Query(filter): Query<LogFilter>,
) -> LogResult<ApiResponse<LogPage>> {
    let (limit, offset) = (filter.limit, filter.offset);
    let (items, total) = service.list_logs(filter).await?;

    Ok(ApiResponse::ok(LogPage {
        items,
        total,
        limit,
        offset,
    }))
}

/// Create a log from any non-empty JSON object
///
/// A form-encoded body is accepted too; its values are stored as strings.
#[utoipa::path(
    post,
    path = "",
    tag = "Logs",
    request_body = LogPayload,
    responses(
        (status = 201, description = "Log created, inside `{ success, data }`", body = LogEntry),
        (status = 400, description = "Empty body, reserved or invalid key", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn create_log<R: LogRepository>(
    State(service): State<Arc<LogService<R>>>,
    ValidatedBody(payload): ValidatedBody<LogPayload>,
) -> LogResult<impl IntoResponse> {
    let entry = service.create_log(payload).await?;
    Ok(Created(entry))
}

/// Get a log by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Logs",
    params(("id" = uuid::Uuid, Path, description = "Log ID")),
    responses(
        (status = 200, description = "Log found, inside `{ success, data }`", body = LogEntry),
        (status = 400, description = "Invalid UUID", body = ErrorResponse),
        (status = 404, description = "No such log", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn get_log<R: LogRepository>(
    State(service): State<Arc<LogService<R>>>,
    UuidPath(id): UuidPath,
) -> LogResult<ApiResponse<LogEntry>> {
    Ok(ApiResponse::ok(service.get_log(id).await?))
}

/// Merge top-level fields into a log
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Logs",
    params(("id" = uuid::Uuid, Path, description = "Log ID")),
    request_body = LogPayload,
    responses(
        (status = 200, description = "Log updated, inside `{ success, data }`", body = LogEntry),
        (status = 400, description = "Invalid UUID, empty body, reserved or invalid key", body = ErrorResponse),
        (status = 404, description = "No such log", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn update_log<R: LogRepository>(
    State(service): State<Arc<LogService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedBody(payload): ValidatedBody<LogPayload>,
) -> LogResult<ApiResponse<LogEntry>> {
    Ok(ApiResponse::ok(service.update_log(id, payload).await?))
}

/// Delete a log
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Logs",
    params(("id" = uuid::Uuid, Path, description = "Log ID")),
    responses(
        (status = 200, description = "Log deleted", body = MessageResponse),
        (status = 400, description = "Invalid UUID", body = ErrorResponse),
        (status = 404, description = "No such log", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn delete_log<R: LogRepository>(
    State(service): State<Arc<LogService<R>>>,
    UuidPath(id): UuidPath,
) -> LogResult<MessageResponse> {
    service.delete_log(id).await?;
    Ok(MessageResponse::ok(format!("Log '{}' deleted", id)))
}
