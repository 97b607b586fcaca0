use askama::Template;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use super::{upstream_failure, DashboardShellTemplate, Section};
use crate::models::AuthUser;
use crate::views::{analytics::parse_period, AnalyticsView};
use crate::AppState;

#[derive(Template)]
#[template(path = "dashboard/analytics_panel.html")]
pub struct AnalyticsPanelTemplate {
    pub view: AnalyticsView,
}

#[derive(Deserialize)]
pub struct PeriodParams {
    pub days: Option<String>,
}

fn panel_url(days: u32) -> String {
    format!("/dashboard/analytics/panel?days={days}")
}

pub async fn analytics_page(
    user: AuthUser,
    Query(params): Query<PeriodParams>,
) -> impl IntoResponse {
    let days = parse_period(params.days.as_deref());
    DashboardShellTemplate::new(&user, Section::Analytics, "Analytics", panel_url(days))
}

pub async fn analytics_panel(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
    Query(params): Query<PeriodParams>,
) -> Response {
    let days = parse_period(params.days.as_deref());
    match state.api.call_analytics(&user.access_token, days).await {
        Ok(analytics) => AnalyticsPanelTemplate {
            view: AnalyticsView::new(&analytics, days),
        }
        .into_response(),
        Err(e) => upstream_failure(&session, &headers, e, &panel_url(days)).await,
    }
}
