//! Router-level tests. The pool connects lazily and every request here is
//! answered before a query runs, so no database is needed. Requests that
//! carry a valid token resolve the user from the database and live in
//! `authenticated_routes_test.rs`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use scamwatch_api::config::Config;
use scamwatch_api::db::Database;
use scamwatch_api::models::UserRole;
use scamwatch_api::services::auth_service::issue_token;
use scamwatch_api::{app, AppState};

fn test_config() -> Config {
    let mut config = Config::load().expect("config should load from defaults");
    config.virustotal.api_key = None;
    config.gemini.api_key = None;
    config
}

fn test_app(config: &Config) -> Router {
    let db = Database::connect_lazy(config).expect("lazy pool");
    let state = AppState::new(db, config.clone()).expect("state");
    app(state)
}

fn token_for(role: UserRole, config: &Config) -> (Uuid, String) {
    let id = Uuid::new_v4();
    let token = issue_token(id, "tester@example.com", role, config).expect("token");
    (id, token)
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_check_returns_ok() {
    let config = test_config();
    let response = test_app(&config)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let config = test_config();
    let (status, body) = send(test_app(&config), Method::GET, "/api/auth/me", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let config = test_config();
    let (_, token) = token_for(UserRole::Admin, &config);
    let tampered = format!("{}x", token);

    let (status, _) = send(
        test_app(&config),
        Method::GET,
        "/api/admin/dashboard",
        Some(&tampered),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_require_a_token() {
    let config = test_config();

    for (method, uri) in [
        (Method::GET, "/api/admin/dashboard"),
        (Method::GET, "/api/admin/reports"),
        (Method::PUT, "/api/admin/reports/00000000-0000-0000-0000-000000000000/approve"),
        (Method::DELETE, "/api/admin/blacklist/00000000-0000-0000-0000-000000000000"),
        (Method::GET, "/api/admin/users"),
    ] {
        let (status, body) = send(test_app(&config), method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} without token", method, uri);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn report_with_missing_fields_is_rejected() {
    let config = test_config();
    let (status, body) = send(
        test_app(&config),
        Method::POST,
        "/api/reports",
        None,
        Some(json!({ "url": "https://shop-deal.top" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn report_with_unknown_scam_type_is_rejected() {
    let config = test_config();
    let (status, body) = send(
        test_app(&config),
        Method::POST,
        "/api/reports",
        None,
        Some(json!({
            "url": "https://shop-deal.top",
            "reason": "Never delivered the order",
            "scamType": "pyramid"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_json_uses_error_envelope() {
    let config = test_config();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/url-checker/check")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"url\": "))
        .unwrap();

    let response = test_app(&config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn post_creation_requires_a_token() {
    let config = test_config();
    let (status, _) = send(
        test_app(&config),
        Method::POST,
        "/api/posts",
        None,
        Some(json!({ "title": "Fake parcel", "content": "Beware" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whitespace_only_required_fields_are_rejected() {
    let config = test_config();
    let (status, body) = send(
        test_app(&config),
        Method::POST,
        "/api/reports",
        None,
        Some(json!({
            "url": "https://parcel-fee.top/pay",
            "reason": "    ",
            "scamType": "phishing"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        test_app(&config),
        Method::POST,
        "/api/volunteers",
        None,
        Some(json!({
            "fullName": "   ",
            "email": "helper@example.com",
            "phone": "0901234567",
            "specialty": "Outreach"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_query_strings_use_error_envelope() {
    let config = test_config();

    for uri in [
        "/api/posts?page=abc",
        "/api/blacklist?limit=-1",
        "/api/events?include_past=maybe",
        "/api/quiz?count=many",
        "/api/newsfeed?limit=ten",
    ] {
        let (status, body) = send(test_app(&config), Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false, "{}", uri);
        assert_eq!(body["error"], "BAD_REQUEST", "{}", uri);
    }
}

#[tokio::test]
async fn trusted_domains_short_circuit_url_check() {
    let config = test_config();
    let (status, body) = send(
        test_app(&config),
        Method::POST,
        "/api/url-checker/check",
        None,
        Some(json!({ "url": "https://accounts.google.com/signin?continue=x" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["source"], "trusted");
    assert_eq!(body["data"]["safe"], true);
    assert_eq!(body["data"]["normalized_url"], "accounts.google.com/signin");
}

#[tokio::test]
async fn empty_url_check_is_rejected() {
    let config = test_config();
    let (status, _) = send(
        test_app(&config),
        Method::POST,
        "/api/url-checker/check",
        None,
        Some(json!({ "url": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quiz_falls_back_to_builtin_questions() {
    let config = test_config();
    let (status, body) = send(test_app(&config), Method::GET, "/api/quiz?count=3", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "builtin");
    assert_eq!(body["data"]["questions"].as_array().map(Vec::len), Some(3));

    let (status, _) = send(test_app(&config), Method::GET, "/api/quiz?count=50", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_requires_a_query() {
    let config = test_config();
    let (status, _) = send(test_app(&config), Method::GET, "/api/search?q=%20", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
