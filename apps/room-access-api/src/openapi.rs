//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Room Access API",
        version = "0.1.0",
        description = "Users with room access rights and free-form access logs, stored in MongoDB"
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    nest(
        (path = "/user", api = domain_users::ApiDoc),
        (path = "/log", api = domain_logs::ApiDoc)
    ),
    tags(
        (name = "Users", description = "User management endpoints"),
        (name = "Logs", description = "Log management endpoints")
    )
)]
pub struct ApiDoc;
