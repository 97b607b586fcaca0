use askama::Template;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub const SERVICE_NAME: &str = "receptionist-web";

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NotFoundTemplate {})
}
