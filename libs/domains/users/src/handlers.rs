use axum::{
    Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{ApiResponse, Created, ErrorResponse, MessageResponse, ValidatedBody};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::UserResult;
use crate::models::{CreateUser, Role, UpdateUser, UserFilter, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the `/user` routes
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, delete_user),
    components(schemas(
        UserResponse,
        UserPage,
        CreateUser,
        UpdateUser,
        Role,
        ErrorResponse,
        MessageResponse
    )),
    tags(
        (name = "Users", description = "User records: identity, credentials and room access")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{userId}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(shared_service)
}

/// One page of users
#[derive(Debug, Serialize, ToSchema)]
pub struct UserPage {
    pub items: Vec<UserResponse>,
    pub total: u64,
    pub limit: i64,
    pub offset: u64,
}

/// List users
///
/// Newest first. Filter by `role` and `allowedRoom`.
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(UserFilter),
    responses(
        (status = 200, description = "Page of users inside `{ success, data }`", body = UserPage),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(filter): Query<UserFilter>,
) -> UserResult<ApiResponse<UserPage>> {
    let (limit, offset) = (filter.limit, filter.offset);
    let (items, total) = service.list_users(filter).await?;

    Ok(ApiResponse::ok(UserPage {
        items,
        total,
        limit,
        offset,
    }))
}

/// Create a user
///
/// The password is stored as a salted bcrypt hash. Accepts a JSON or
/// form-encoded body.
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created, inside `{ success, data }`", body = UserResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "userId or secretKey already in use", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedBody(input): ValidatedBody<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;
    Ok(Created(user))
}

/// Get a user by `userId`
#[utoipa::path(
    get,
    path = "/{userId}",
    tag = "Users",
    params(("userId" = String, Path, description = "External user identifier")),
    responses(
        (status = 200, description = "User found, inside `{ success, data }`", body = UserResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(user_id): Path<String>,
) -> UserResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(service.get_user(&user_id).await?))
}

/// Update a user
///
/// Absent fields are left untouched; the password is rehashed only when set.
/// Accepts a JSON or form-encoded body.
#[utoipa::path(
    put,
    path = "/{userId}",
    tag = "Users",
    params(("userId" = String, Path, description = "External user identifier")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated, inside `{ success, data }`", body = UserResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 409, description = "secretKey already in use", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(user_id): Path<String>,
    ValidatedBody(input): ValidatedBody<UpdateUser>,
) -> UserResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(service.update_user(&user_id, input).await?))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{userId}",
    tag = "Users",
    params(("userId" = String, Path, description = "External user identifier")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(user_id): Path<String>,
) -> UserResult<MessageResponse> {
    service.delete_user(&user_id).await?;
    Ok(MessageResponse::ok(format!("User '{}' deleted", user_id)))
}
