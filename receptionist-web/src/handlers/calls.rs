use askama::Template;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use super::{upstream_failure, DashboardShellTemplate, Section};
use crate::models::{AuthUser, CallLog, CustomerContext};
use crate::services::ApiError;
use crate::views::{CallDetail, CallRow};
use crate::AppState;

const LIST_PANEL_URL: &str = "/dashboard/calls/panel";

#[derive(Template)]
#[template(path = "dashboard/calls_panel.html")]
pub struct CallsPanelTemplate {
    pub calls: Vec<CallRow>,
    pub limit: u32,
}

#[derive(Template)]
#[template(path = "dashboard/call_detail_panel.html")]
pub struct CallDetailPanelTemplate {
    pub call: CallDetail,
    pub history_error: String,
}

fn detail_panel_url(call_id: &str) -> String {
    format!("/dashboard/calls/{call_id}/panel")
}

pub async fn calls_page(user: AuthUser) -> impl IntoResponse {
    DashboardShellTemplate::new(&user, Section::Calls, "Call history", LIST_PANEL_URL)
}

pub async fn calls_panel(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
) -> Response {
    let limit = state.settings.api.call_history_limit;
    match state.api.list_calls(&user.access_token, limit).await {
        Ok(calls) => CallsPanelTemplate {
            calls: calls.iter().map(CallRow::new).collect(),
            limit,
        }
        .into_response(),
        Err(e) => upstream_failure(&session, &headers, e, LIST_PANEL_URL).await,
    }
}

pub async fn call_page(user: AuthUser, Path(call_id): Path<String>) -> impl IntoResponse {
    DashboardShellTemplate::new(&user, Section::Calls, "Call details", detail_panel_url(&call_id))
}

/// Call record plus the caller's earlier interactions with the shop.
pub async fn call_panel(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
    Path(call_id): Path<String>,
) -> Response {
    let retry_url = detail_panel_url(&call_id);
    let call = match state.api.get_call(&user.access_token, &call_id).await {
        Ok(call) => call,
        Err(e) => return upstream_failure(&session, &headers, e, &retry_url).await,
    };

    match caller_history(&state, &user, &call).await {
        Ok(context) => CallDetailPanelTemplate {
            call: CallDetail::new(&call, context.as_ref()),
            history_error: String::new(),
        }
        .into_response(),
        Err(ApiError::Unauthorized) => {
            upstream_failure(&session, &headers, ApiError::Unauthorized, &retry_url).await
        }
        Err(e) => CallDetailPanelTemplate {
            call: CallDetail::new(&call, None),
            history_error: e.user_message(),
        }
        .into_response(),
    }
}

/// A caller with no stored context, or no usable number, has no history.
async fn caller_history(
    state: &AppState,
    user: &AuthUser,
    call: &CallLog,
) -> Result<Option<CustomerContext>, ApiError> {
    let Some(number) = call.caller_number.as_deref() else {
        return Ok(None);
    };

    match state.api.customer_context(&user.access_token, number).await {
        Ok(context) => Ok(Some(context)),
        Err(ApiError::NotFound(_)) | Err(ApiError::InvalidRequest(_)) => Ok(None),
        Err(e) => {
            tracing::warn!(call_id = %call.id, error = %e, "Customer context lookup failed");
            Err(e)
        }
    }
}
