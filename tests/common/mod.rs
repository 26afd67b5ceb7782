#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test,
};
use serde_json::json;
use tasklist::{
    auth::TokenResponse,
    config::{CacheBackend, Config, Environment},
    AppState,
};

pub const TEST_SECRET: &str = "integration-test-secret";

/// In-memory database, the cheapest bcrypt cost (4).
pub fn test_config(cache: CacheBackend) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_port: 0,
        server_host: "127.0.0.1".to_string(),
        environment: Environment::Development,
        jwt_secret: TEST_SECRET.to_string(),
        token_ttl_minutes: 30,
        bcrypt_cost: 4,
        cache,
    }
}

pub async fn test_state(cache: CacheBackend) -> AppState {
    AppState::from_config(&test_config(cache))
        .await
        .expect("Failed to build test state")
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register<S, B>(app: &S, username: &str, password: &str) -> StatusCode
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": username,
            "password": password,
            "confirm_password": password
        }))
        .to_request();
    test::call_service(app, req).await.status()
}

/// Logs in and returns the status together with the token, if one was issued.
pub async fn login<S, B>(app: &S, username: &str, password: &str) -> (StatusCode, Option<String>)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form([("username", username), ("password", password)])
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    let token = if status.is_success() {
        let parsed: TokenResponse =
            serde_json::from_slice(&body).expect("Failed to parse login response JSON");
        assert_eq!(parsed.token_type, "bearer");
        Some(parsed.access_token)
    } else {
        None
    };
    (status, token)
}

pub async fn register_and_login<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    assert_eq!(register(app, username, password).await, StatusCode::CREATED);
    let (status, token) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK);
    token.expect("login returned no token")
}
