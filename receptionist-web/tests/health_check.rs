mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::test_settings;
use http_body_util::BodyExt;
use receptionist_web::{startup::build_router, AppState};
use tower::ServiceExt;

fn app() -> axum::Router {
    let state = AppState::new(test_settings("http://127.0.0.1:9")).unwrap();
    build_router(state)
}

#[tokio::test]
async fn health_check_reports_service() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "receptionist-web");
}

#[tokio::test]
async fn responses_carry_security_headers_and_request_id() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("content-security-policy").is_some());
    assert!(headers.get("x-request-id").is_some());
}

#[tokio::test]
async fn unknown_paths_render_not_found_page() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/no-such-page")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&body).contains("<html"));
}

#[tokio::test]
async fn stylesheet_is_served() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/static/app.css")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
