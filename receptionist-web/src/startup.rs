use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::path::PathBuf;
use time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    analytics, app, auth, billing, calendar, calls, dashboard, demo, marketing, metrics, settings,
};
use crate::AppState;

const CRATE_DIR: &str = "receptionist-web";

/// `<crate>/static`, from the workspace root or the crate directory.
fn static_dir() -> PathBuf {
    let base = std::env::current_dir().unwrap_or_default();
    if base.ends_with(CRATE_DIR) {
        base.join("static")
    } else {
        base.join(CRATE_DIR).join("static")
    }
}

fn marketing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(marketing::home))
        .route("/pricing", get(marketing::pricing))
        .route("/features", get(marketing::features))
        .route("/faq", get(marketing::faq))
        .route("/about", get(marketing::about))
        .route("/terms", get(marketing::terms))
        .route("/privacy", get(marketing::privacy))
        .route(
            "/contact",
            get(marketing::contact).post(marketing::submit_contact),
        )
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(auth::sign_in))
        .route(auth::CALLBACK_PATH, get(auth::auth_callback))
        .route("/sign-out", get(auth::sign_out))
}

/// Every dashboard page is a shell plus a `/panel` fragment it loads.
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::overview_page))
        .route("/dashboard/panel", get(dashboard::overview_panel))
        .route("/dashboard/shop", post(dashboard::create_shop))
        .route("/dashboard/shop/toggle", post(dashboard::toggle_ai))
        .route(
            "/dashboard/settings",
            get(settings::settings_page).post(settings::save_settings),
        )
        .route("/dashboard/settings/panel", get(settings::settings_panel))
        .route("/dashboard/settings/delete", post(settings::delete_shop))
        .route("/dashboard/calls", get(calls::calls_page))
        .route("/dashboard/calls/panel", get(calls::calls_panel))
        .route("/dashboard/calls/:id", get(calls::call_page))
        .route("/dashboard/calls/:id/panel", get(calls::call_panel))
        .route("/dashboard/billing", get(billing::billing_page))
        .route("/dashboard/billing/panel", get(billing::billing_panel))
        .route("/dashboard/billing/checkout", post(billing::checkout))
        .route("/dashboard/billing/portal", post(billing::portal))
        .route("/dashboard/analytics", get(analytics::analytics_page))
        .route("/dashboard/analytics/panel", get(analytics::analytics_panel))
        .route("/dashboard/calendar", get(calendar::calendar_page))
        .route("/dashboard/calendar/panel", get(calendar::calendar_panel))
        .route("/dashboard/calendar/connect", post(calendar::connect))
        .route("/dashboard/calendar/disconnect", post(calendar::disconnect))
}

fn demo_routes() -> Router<AppState> {
    Router::new()
        .route("/demo", get(demo::demo_page))
        .route("/demo/chat", get(demo::chat_start))
        .route("/demo/chat/:node/choose", post(demo::chat_choose))
        .route("/demo/chat/:node/continue", post(demo::chat_continue))
        .route("/demo/audio/:sample", get(demo::audio_sample))
        .route("/demo/audio/:sample/player", get(demo::audio_player))
        .route(
            "/demo/audio/:sample/segments/:index",
            get(demo::audio_segment),
        )
        .route(
            "/demo/audio/:sample/segments/:index/ended",
            get(demo::audio_segment_ended),
        )
}

pub fn build_router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.settings.server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)))
        .with_signed(state.session_key.clone());

    Router::new()
        .route("/health", get(app::health_check))
        .route("/metrics", get(metrics::metrics))
        .merge(marketing_routes())
        .merge(auth_routes())
        .merge(dashboard_routes())
        .merge(demo_routes())
        .nest_service("/static", ServeDir::new(static_dir()))
        .fallback(app::not_found)
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .with_state(state)
}
