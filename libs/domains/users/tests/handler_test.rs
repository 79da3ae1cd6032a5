//! Handler tests for the Users domain
//!
//! These tests drive the `/user` router over the in-memory repository:
//! - Request deserialization and validation
//! - Response envelopes and status codes
//! - Credentials never leaving the service
//! - JSON and form-encoded bodies

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::TestDataBuilder;
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app(repo: InMemoryUserRepository) -> Router {
    let service = UserService::with_hasher(repo, BcryptHasher::new(4).unwrap());
    handlers::router(service)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn lecturer(user_id: &str, secret_key: &str) -> Value {
    json!({
        "userId": user_id,
        "secretKey": secret_key,
        "password": "S3cure-pw",
        "role": "LECTURER",
        "allowedRoom": "B-204"
    })
}

#[tokio::test]
async fn test_create_user_returns_201_without_credentials() {
    let builder = TestDataBuilder::from_test_name("handler_create_201");
    let user_id = builder.name("user", "main");
    let app = app(InMemoryUserRepository::new());

    let response = app
        .oneshot(json_request("POST", "/", lecturer(&user_id, "key-1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["userId"], user_id.as_str());
    assert_eq!(body["data"]["role"], "LECTURER");
    assert_eq!(body["data"]["allowedRoom"], "B-204");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("secretKey").is_none());
}

#[tokio::test]
async fn test_create_user_stores_bcrypt_hash() {
    let repo = InMemoryUserRepository::new();
    let app = app(repo.clone());

    let response = app
        .oneshot(json_request("POST", "/", lecturer("lect-1", "key-1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let stored = repo.find_by_user_id("lect-1").await.unwrap().unwrap();
    assert_ne!(stored.password, "S3cure-pw");
    assert!(stored.password.starts_with("$2b$"));
}

#[tokio::test]
async fn test_create_duplicate_user_id_returns_409() {
    let app = app(InMemoryUserRepository::new());

    let first = app
        .clone()
        .oneshot(json_request("POST", "/", lecturer("lect-1", "key-1")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(json_request("POST", "/", lecturer("lect-1", "key-2")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body: Value = json_body(second.into_body()).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("lect-1"));
}

#[tokio::test]
async fn test_create_duplicate_secret_key_returns_409() {
    let app = app(InMemoryUserRepository::new());

    app.clone()
        .oneshot(json_request("POST", "/", lecturer("lect-1", "key-1")))
        .await
        .unwrap();

    let response = app
        .oneshot(json_request("POST", "/", lecturer("lect-2", "key-1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = json_body(response.into_body()).await;
    assert!(!body["message"].as_str().unwrap().contains("key-1"));
}

#[tokio::test]
async fn test_create_user_validates_input() {
    let app = app(InMemoryUserRepository::new());

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({
                "userId": "",
                "secretKey": "key-1",
                "password": "S3cure-pw",
                "role": "ADMIN"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_create_user_rejects_unknown_role() {
    let app = app(InMemoryUserRepository::new());

    let mut payload = lecturer("lect-1", "key-1");
    payload["role"] = json!("STUDENT");

    let response = app.oneshot(json_request("POST", "/", payload)).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_get_missing_user_returns_404() {
    let app = app(InMemoryUserRepository::new());

    let response = app.oneshot(empty_request("GET", "/nobody")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_update_without_password_keeps_hash() {
    let repo = InMemoryUserRepository::new();
    let app = app(repo.clone());

    app.clone()
        .oneshot(json_request("POST", "/", lecturer("lect-1", "key-1")))
        .await
        .unwrap();
    let before = repo.find_by_user_id("lect-1").await.unwrap().unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/lect-1",
            json!({ "role": "ADMIN", "allowedRoom": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["data"]["role"], "ADMIN");
    assert!(body["data"].get("allowedRoom").is_none());

    let after = repo.find_by_user_id("lect-1").await.unwrap().unwrap();
    assert_eq!(after.password, before.password);
}

#[tokio::test]
async fn test_list_users_filters_by_role() {
    let app = app(InMemoryUserRepository::new());

    app.clone()
        .oneshot(json_request("POST", "/", lecturer("lect-1", "key-1")))
        .await
        .unwrap();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/",
            json!({
                "userId": "admin-1",
                "secretKey": "key-2",
                "password": "S3cure-pw",
                "role": "ADMIN"
            }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(empty_request("GET", "/?role=ADMIN"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["userId"], "admin-1");
}

#[tokio::test]
async fn test_delete_user() {
    let app = app(InMemoryUserRepository::new());

    app.clone()
        .oneshot(json_request("POST", "/", lecturer("lect-1", "key-1")))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/lect-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["success"], true);

    let response = app
        .oneshot(empty_request("GET", "/lect-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_and_update_user_from_form_body() {
    let repo = InMemoryUserRepository::new();
    let app = app(repo.clone());

    let response = app
        .clone()
        .oneshot(form_request(
            "POST",
            "/",
            "userId=lect-9&secretKey=card%2F9&password=S3cure-pw&role=LECTURER&allowedRoom=B-204",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["data"]["userId"], "lect-9");
    assert_eq!(body["data"]["allowedRoom"], "B-204");

    let stored = repo.find_by_user_id("lect-9").await.unwrap().unwrap();
    assert_eq!(stored.secret_key, "card/9");
    assert!(BcryptHasher::new(4).unwrap().verify("S3cure-pw", &stored.password).unwrap());

    let response = app
        .oneshot(form_request("PUT", "/lect-9", "role=ADMIN"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["data"]["role"], "ADMIN");
    assert_eq!(body["data"]["allowedRoom"], "B-204");
}

#[tokio::test]
async fn test_form_body_with_unknown_role_is_rejected() {
    let response = app(InMemoryUserRepository::new())
        .oneshot(form_request(
            "POST",
            "/",
            "userId=lect-1&secretKey=k&password=pw&role=JANITOR",
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_list_users_rejects_zero_limit() {
    let app = app(InMemoryUserRepository::new());
    app.clone()
        .oneshot(json_request("POST", "/", lecturer("lect-1", "key-1")))
        .await
        .unwrap();

    for uri in ["/?limit=0", "/?limit=201"] {
        let response = app.clone().oneshot(empty_request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let body: Value = json_body(response.into_body()).await;
        assert_eq!(body["success"], false);
    }
}
