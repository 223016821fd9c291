#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use coolreq_api::auth::jwt::JwtConfig;
use coolreq_api::auth::password::hash_password;
use coolreq_api::auth::revocation::{PgRevocationStore, RevocationConfig, Revocations};
use coolreq_api::config::ServerConfig;
use coolreq_api::router::build_app_router;
use coolreq_api::state::AppState;
use coolreq_db::models::user::{CreateUser, User};
use coolreq_db::repositories::UserRepo;

/// Password given to every user created through [`create_user`].
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            expiry_mins: 60,
        },
        revocation: RevocationConfig::default(),
    }
}

/// Build the full application router (same middleware stack as production)
/// backed by the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let revocations = Arc::new(Revocations::new(
        Arc::new(PgRevocationStore::new(pool.clone())),
        config.revocation.key_prefix.clone(),
    ));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        revocations,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a user directly in the database with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, username: &str, is_moderator: bool) -> User {
    let input = CreateUser {
        full_name: format!("{username} tester"),
        username: username.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
    };
    let user = UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
    if is_moderator {
        UserRepo::set_moderator(pool, user.id, true)
            .await
            .expect("promotion should succeed");
    }
    user
}

/// Log in via the API and return the session token.
pub async fn login(app: &Router, username: &str) -> String {
    let body = serde_json::json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    let json = body_json(response).await;
    json["token"].as_str().expect("token").to_string()
}

/// Create a user and return their session token.
pub async fn user_token(pool: &PgPool, app: &Router, username: &str, is_moderator: bool) -> (User, String) {
    let user = create_user(pool, username, is_moderator).await;
    let token = login(app, username).await;
    (user, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
}

fn with_json(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    builder(method, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    builder(method, uri, token).body(Body::empty()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty("GET", uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty("GET", uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, with_json("POST", uri, None, body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, with_json("POST", uri, Some(token), body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty("POST", uri, Some(token))).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, with_json("PUT", uri, Some(token), body)).await
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty("PUT", uri, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty("DELETE", uri, Some(token))).await
}

/// Send a request with a raw `Authorization` header value.
pub async fn post_with_authorization(app: Router, uri: &str, header: &str) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", header)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
