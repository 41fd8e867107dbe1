use std::net::SocketAddr;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use tripplan::{config::AppConfig, db::init_pool, routes::create_router, state::AppState};

async fn test_app() -> (Router, TempDir) {
    let root = TempDir::new().expect("temp dir for api tests");
    let db_path = root.path().join("api.sqlite");

    let config = AppConfig {
        database_url: format!("sqlite://{}", db_path.to_string_lossy()),
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        cookie_secret: "api-test-cookie-secret".into(),
    };
    let db = init_pool(&config.database_url).await.expect("pool");
    sqlx::migrate!("./migrations").run(&db).await.expect("migrations");

    (create_router(AppState::new(config, db)), root)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn session_cookie(response: &Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .expect("ascii cookie");
    raw.split(';').next().expect("cookie pair").to_string()
}

async fn register(app: &Router, username: &str, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/register",
            json!({
                "username": username,
                "email": email,
                "password": "correct-horse-battery",
            }),
        ))
        .await
        .expect("register response");
    assert_eq!(response.status(), StatusCode::CREATED);
    session_cookie(&response)
}

#[tokio::test]
async fn session_cookie_authenticates_follow_up_requests() {
    let (app, _root) = test_app().await;
    let cookie = register(&app, "maria", "maria@example.com").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("me response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body["username"], "maria");
    assert_eq!(body["email"], "maria@example.com");
}

#[tokio::test]
async fn requests_without_a_session_are_unauthorized() {
    let (app, _root) = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("me response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn member_check_on_missing_trip_is_not_found() {
    let (app, _root) = test_app().await;
    let cookie = register(&app, "maria", "maria@example.com").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/trips/999/members/check?email=maria@example.com")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("check response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
