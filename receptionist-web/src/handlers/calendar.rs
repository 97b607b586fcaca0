use askama::Template;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use super::{action_failure, upstream_failure, DashboardShellTemplate, Section};
use crate::models::{AuthUser, CalendarStatus};
use crate::utils::htmx;
use crate::AppState;

const PANEL_URL: &str = "/dashboard/calendar/panel";

#[derive(Template)]
#[template(path = "dashboard/calendar_panel.html")]
pub struct CalendarPanelTemplate {
    pub connected: bool,
    pub provider: String,
    pub email: String,
    pub notice: String,
    pub notice_kind: &'static str,
}

impl CalendarPanelTemplate {
    fn new(status: &CalendarStatus) -> Self {
        Self {
            connected: status.connected,
            provider: match status.provider.as_str() {
                "google" => "Google Calendar".to_string(),
                other => other.to_string(),
            },
            email: status.email.clone().unwrap_or_default(),
            notice: String::new(),
            notice_kind: "info",
        }
    }
}

pub async fn calendar_page(user: AuthUser) -> impl IntoResponse {
    DashboardShellTemplate::new(&user, Section::Calendar, "Calendar", PANEL_URL)
}

pub async fn calendar_panel(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
) -> Response {
    match state.api.calendar_status(&user.access_token).await {
        Ok(status) => CalendarPanelTemplate::new(&status).into_response(),
        Err(e) => upstream_failure(&session, &headers, e, PANEL_URL).await,
    }
}

/// Send the browser to the provider's consent screen.
pub async fn connect(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
) -> Response {
    match state.api.calendar_auth_url(&user.access_token).await {
        Ok(auth) => {
            tracing::info!(user_id = %user.user_id, "Starting calendar authorization");
            htmx::full_page_redirect(&auth.authorization_url)
        }
        Err(e) => {
            tracing::warn!(user_id = %user.user_id, error = %e, "Calendar authorization failed");
            action_failure(&session, &headers, e).await
        }
    }
}

pub async fn disconnect(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
) -> Response {
    let result = match state.api.calendar_disconnect(&user.access_token).await {
        Ok(result) => result,
        Err(e) => return action_failure(&session, &headers, e).await,
    };

    let status = match state.api.calendar_status(&user.access_token).await {
        Ok(status) => status,
        Err(e) => return upstream_failure(&session, &headers, e, PANEL_URL).await,
    };

    tracing::info!(user_id = %user.user_id, success = result.success, "Calendar disconnected");
    let mut panel = CalendarPanelTemplate::new(&status);
    panel.notice_kind = if result.success { "success" } else { "error" };
    panel.notice = if result.message.is_empty() {
        "Calendar disconnected.".to_string()
    } else {
        result.message
    };
    panel.into_response()
}
