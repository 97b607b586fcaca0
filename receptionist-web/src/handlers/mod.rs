pub mod analytics;
pub mod app;
pub mod auth;
pub mod billing;
pub mod calendar;
pub mod calls;
pub mod dashboard;
pub mod demo;
pub mod marketing;
pub mod metrics;
pub mod settings;

use askama::Template;
use axum::{
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::user::{AuthUser, UserProfile, SIGN_IN_PATH};
use crate::services::ApiError;
use crate::utils::htmx;

/// Dashboard sections shown in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    Calls,
    Analytics,
    Billing,
    Calendar,
    Settings,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Overview,
        Section::Calls,
        Section::Analytics,
        Section::Billing,
        Section::Calendar,
        Section::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Calls => "Call history",
            Section::Analytics => "Analytics",
            Section::Billing => "Billing",
            Section::Calendar => "Calendar",
            Section::Settings => "Settings",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Section::Overview => "/dashboard",
            Section::Calls => "/dashboard/calls",
            Section::Analytics => "/dashboard/analytics",
            Section::Billing => "/dashboard/billing",
            Section::Calendar => "/dashboard/calendar",
            Section::Settings => "/dashboard/settings",
        }
    }
}

pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
}

/// Page frame for every dashboard screen. The body is a loading placeholder
/// that fetches `panel_url` once the page is shown.
#[derive(Template)]
#[template(path = "dashboard/shell.html")]
pub struct DashboardShellTemplate {
    pub user: UserProfile,
    pub title: String,
    pub nav: Vec<NavItem>,
    pub panel_url: String,
    pub notice: String,
    pub notice_kind: &'static str,
}

impl DashboardShellTemplate {
    pub fn new(
        user: &AuthUser,
        section: Section,
        title: impl Into<String>,
        panel_url: impl Into<String>,
    ) -> Self {
        Self {
            user: user.profile(),
            title: title.into(),
            nav: Section::ALL
                .iter()
                .map(|s| NavItem {
                    label: s.label(),
                    href: s.path(),
                    active: *s == section,
                })
                .collect(),
            panel_url: panel_url.into(),
            notice: String::new(),
            notice_kind: "info",
        }
    }

    pub fn with_notice(mut self, kind: &'static str, message: impl Into<String>) -> Self {
        self.notice_kind = kind;
        self.notice = message.into();
        self
    }
}

/// Page-level failure with a retry button that reloads the panel.
#[derive(Template)]
#[template(path = "partials/error_banner.html")]
pub struct ErrorBannerTemplate {
    pub message: String,
    pub retry_url: String,
}

/// Inline message after a form action.
#[derive(Template)]
#[template(path = "partials/notice.html")]
pub struct NoticeTemplate {
    pub kind: &'static str,
    pub message: String,
}

impl NoticeTemplate {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success",
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            message: message.into(),
        }
    }
}

/// Drop the session and send the browser to sign-in.
pub async fn sign_in_again(session: &Session, headers: &HeaderMap) -> Response {
    session.clear().await;
    htmx::redirect(headers, SIGN_IN_PATH)
}

/// Render a failed panel load. The banner is returned with 200 so htmx
/// swaps it into the page.
pub async fn upstream_failure(
    session: &Session,
    headers: &HeaderMap,
    error: ApiError,
    retry_url: &str,
) -> Response {
    if matches!(error, ApiError::Unauthorized) {
        tracing::info!("Receptionist API rejected the session token");
        return sign_in_again(session, headers).await;
    }

    ErrorBannerTemplate {
        message: error.user_message(),
        retry_url: retry_url.to_string(),
    }
    .into_response()
}

/// Render a failed form action as a notice above the panel, leaving the
/// form in place.
pub async fn action_failure(session: &Session, headers: &HeaderMap, error: ApiError) -> Response {
    if matches!(error, ApiError::Unauthorized) {
        tracing::info!("Receptionist API rejected the session token");
        return sign_in_again(session, headers).await;
    }

    htmx::retarget(
        NoticeTemplate::error(error.user_message()).into_response(),
        htmx::ACTION_NOTICE_TARGET,
    )
}

/// Validation messages in field order, for display above a form.
pub fn validation_messages(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field.replace('_', " ")))
            })
        })
        .collect()
}

/// `validator` hook for phone number fields.
pub fn validate_phone(phone: &str) -> Result<(), validator::ValidationError> {
    if crate::utils::phone::normalize_phone(phone).is_some() {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("phone");
        error.message = Some("Enter a valid phone number, e.g. (555) 123-4567".into());
        Err(error)
    }
}
