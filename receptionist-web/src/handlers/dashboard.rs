use askama::Template;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use validator::Validate;

use super::{
    action_failure, upstream_failure, validate_phone, validation_messages,
    DashboardShellTemplate, Section,
};
use crate::models::{AdapterType, AuthUser, ShopConfig, ShopConfigCreate, ShopConfigUpdate};
use crate::services::ApiError;
use crate::utils::{htmx, phone::format_phone};
use crate::views::{CallRow, ShopStatus, UsageMeter};
use crate::AppState;

const PANEL_URL: &str = "/dashboard/panel";

#[derive(Template)]
#[template(path = "dashboard/overview_panel.html")]
pub struct OverviewPanelTemplate {
    pub shop_name: String,
    pub phone: String,
    pub greeting: String,
    pub status: ShopStatus,
    pub adapter_label: &'static str,
    pub adapter_live: bool,
    pub plan_name: String,
    pub usage: Option<UsageMeter>,
    pub usage_error: String,
    pub calls: Vec<CallRow>,
    pub calls_error: String,
}

#[derive(Template)]
#[template(path = "dashboard/status_card.html")]
pub struct StatusCardTemplate {
    pub status: ShopStatus,
}

#[derive(Template)]
#[template(path = "dashboard/onboarding_panel.html")]
pub struct OnboardingTemplate {
    pub name: String,
    pub phone: String,
    pub adapter_type: AdapterType,
    pub adapters: [AdapterType; 3],
    pub errors: Vec<String>,
}

impl OnboardingTemplate {
    fn new(form: &OnboardingForm, errors: Vec<String>) -> Self {
        Self {
            name: form.name.clone(),
            phone: form.phone.clone(),
            adapter_type: form.adapter_type,
            adapters: [AdapterType::Mock, AdapterType::Tekmetric, AdapterType::Shopware],
            errors,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct OnboardingForm {
    #[validate(length(min = 1, max = 200, message = "Shop name must be 1 to 200 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[serde(default)]
    pub adapter_type: AdapterType,
}

pub async fn overview_page(user: AuthUser) -> impl IntoResponse {
    DashboardShellTemplate::new(&user, Section::Overview, "Overview", PANEL_URL)
}

pub async fn overview_panel(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
) -> Response {
    let token = user.access_token.as_str();
    let shop = match state.api.get_shop(token).await {
        Ok(shop) => shop,
        Err(ApiError::NotFound(_)) => {
            return OnboardingTemplate::new(&OnboardingForm::default(), Vec::new()).into_response()
        }
        Err(e) => return upstream_failure(&session, &headers, e, PANEL_URL).await,
    };

    let (subscription, calls) = tokio::join!(
        state.api.subscription(token),
        state
            .api
            .list_calls(token, state.settings.api.recent_calls_limit)
    );

    if matches!(subscription, Err(ApiError::Unauthorized))
        || matches!(calls, Err(ApiError::Unauthorized))
    {
        return upstream_failure(&session, &headers, ApiError::Unauthorized, PANEL_URL).await;
    }

    let (plan_name, usage, usage_error) = match subscription {
        Ok(subscription) => (
            subscription.plan_name.clone(),
            Some(UsageMeter::new(&subscription.usage)),
            String::new(),
        ),
        Err(e) => (String::new(), None, e.user_message()),
    };
    let (calls, calls_error) = match calls {
        Ok(calls) => (calls.iter().map(CallRow::new).collect(), String::new()),
        Err(e) => (Vec::new(), e.user_message()),
    };

    overview(&shop, plan_name, usage, usage_error, calls, calls_error).into_response()
}

fn overview(
    shop: &ShopConfig,
    plan_name: String,
    usage: Option<UsageMeter>,
    usage_error: String,
    calls: Vec<CallRow>,
    calls_error: String,
) -> OverviewPanelTemplate {
    OverviewPanelTemplate {
        shop_name: shop.name.clone(),
        phone: format_phone(&shop.phone),
        greeting: shop.settings.rendered_greeting(&shop.name),
        status: ShopStatus::from_settings(&shop.settings),
        adapter_label: shop.adapter_type.label(),
        adapter_live: shop.adapter_type.is_live(),
        plan_name,
        usage,
        usage_error,
        calls,
        calls_error,
    }
}

/// First-run setup when the user has no shop yet.
pub async fn create_shop(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<OnboardingForm>,
) -> Response {
    if let Err(errors) = form.validate() {
        return OnboardingTemplate::new(&form, validation_messages(&errors)).into_response();
    }

    let create = ShopConfigCreate {
        name: form.name.trim().to_string(),
        phone: form.phone.trim().to_string(),
        adapter_type: form.adapter_type,
        settings: None,
    };

    match state.api.create_shop(&user.access_token, &create).await {
        Ok(shop) => {
            tracing::info!(user_id = %user.user_id, shop_id = %shop.id, "Shop created");
            htmx::redirect(&headers, Section::Overview.path())
        }
        Err(ApiError::Unauthorized) => {
            upstream_failure(&session, &headers, ApiError::Unauthorized, PANEL_URL).await
        }
        Err(e) => {
            tracing::warn!(user_id = %user.user_id, error = %e, "Shop creation failed");
            OnboardingTemplate::new(&form, vec![e.user_message()]).into_response()
        }
    }
}

/// Pause or resume the AI receptionist.
pub async fn toggle_ai(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
) -> Response {
    let token = user.access_token.as_str();
    let shop = match state.api.get_shop(token).await {
        Ok(shop) => shop,
        Err(e) => return action_failure(&session, &headers, e).await,
    };

    let mut settings = shop.settings.clone();
    settings.ai_enabled = !settings.ai_enabled;
    let update = ShopConfigUpdate {
        settings: Some(settings),
        ..Default::default()
    };

    match state.api.update_shop(token, &update).await {
        Ok(updated) => {
            let status = ShopStatus::from_settings(&updated.settings);
            tracing::info!(
                user_id = %user.user_id,
                shop_id = %updated.id,
                status = status.label(),
                "AI receptionist toggled"
            );
            StatusCardTemplate { status }.into_response()
        }
        Err(e) => action_failure(&session, &headers, e).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onboarding_form_requires_name_and_phone() {
        let form = OnboardingForm {
            name: String::new(),
            phone: "12".to_string(),
            adapter_type: AdapterType::Mock,
        };
        let messages = validation_messages(&form.validate().unwrap_err());
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().any(|m| m.contains("Shop name")));
        assert!(messages.iter().any(|m| m.contains("valid phone number")));
    }

    #[test]
    fn onboarding_form_accepts_formatted_numbers() {
        let form = OnboardingForm {
            name: "Main Street Auto".to_string(),
            phone: "(555) 123-4567".to_string(),
            adapter_type: AdapterType::Tekmetric,
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn paused_shop_renders_paused_status() {
        let shop: ShopConfig = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "name": "Main Street Auto",
            "phone": "5551234567",
            "adapter_type": "mock",
            "settings": {"ai_enabled": false},
            "created_at": "2026-01-05T10:00:00Z",
            "updated_at": "2026-01-05T10:00:00Z"
        }))
        .unwrap();

        let html = overview(
            &shop,
            "Free".to_string(),
            None,
            String::new(),
            Vec::new(),
            String::new(),
        )
        .render()
        .unwrap();
        assert!(html.contains("Paused"));
        assert!(html.contains("status-paused"));
        assert!(html.contains("(555) 123-4567"));
        assert!(html.contains("Demo data"));
    }
}
