use askama::Template;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use tower_sessions::Session;
use validator::{Validate, ValidationError};

use super::{
    action_failure, upstream_failure, validate_phone, validation_messages,
    DashboardShellTemplate, Section,
};
use crate::models::{AuthUser, CallIntent, ShopConfig, ShopConfigUpdate, ShopSettings};
use crate::utils::{htmx, phone::normalize_phone};
use crate::AppState;

const PANEL_URL: &str = "/dashboard/settings/panel";

pub struct IntentOption {
    pub code: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub checked: bool,
}

#[derive(Template)]
#[template(path = "dashboard/settings_panel.html")]
pub struct SettingsPanelTemplate {
    pub name: String,
    pub phone: String,
    pub adapter_label: &'static str,
    pub ai_enabled: bool,
    pub transfer_number: String,
    pub greeting_message: String,
    pub max_call_duration_seconds: u32,
    pub sms_enabled: bool,
    pub sms_from_number: String,
    pub intents: Vec<IntentOption>,
    pub errors: Vec<String>,
    pub notice: String,
}

fn intent_options(selected: &[CallIntent]) -> Vec<IntentOption> {
    CallIntent::configurable()
        .iter()
        .map(|intent| IntentOption {
            code: intent.code(),
            label: intent.label(),
            description: intent.description(),
            checked: selected.contains(intent),
        })
        .collect()
}

impl SettingsPanelTemplate {
    fn from_shop(shop: &ShopConfig) -> Self {
        let settings = &shop.settings;
        Self {
            name: shop.name.clone(),
            phone: shop.phone.clone(),
            adapter_label: shop.adapter_type.label(),
            ai_enabled: settings.ai_enabled,
            transfer_number: settings.transfer_number.clone().unwrap_or_default(),
            greeting_message: settings.greeting_message.clone(),
            max_call_duration_seconds: settings.max_call_duration_seconds,
            sms_enabled: settings.sms_call_summary_enabled,
            sms_from_number: settings.sms_from_number.clone().unwrap_or_default(),
            intents: intent_options(&settings.allowed_intents),
            errors: Vec::new(),
            notice: String::new(),
        }
    }

    /// Echo a rejected submission back with its errors.
    fn from_form(form: &SettingsForm, adapter_label: &'static str, errors: Vec<String>) -> Self {
        Self {
            name: form.name.clone(),
            phone: form.phone.clone(),
            adapter_label,
            ai_enabled: form.ai_enabled.is_some(),
            transfer_number: form.transfer_number.clone(),
            greeting_message: form.greeting_message.clone(),
            max_call_duration_seconds: form.max_call_duration_seconds,
            sms_enabled: form.sms_call_summary_enabled.is_some(),
            sms_from_number: form.sms_from_number.clone(),
            intents: intent_options(&form.intents()),
            errors,
            notice: String::new(),
        }
    }
}

/// Blank is allowed; anything else must be a phone number.
fn validate_optional_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() {
        Ok(())
    } else {
        validate_phone(phone)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SettingsForm {
    #[validate(length(min = 1, max = 200, message = "Shop name must be 1 to 200 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[serde(default)]
    pub ai_enabled: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_optional_phone"))]
    pub transfer_number: String,
    #[validate(length(min = 1, max = 500, message = "Greeting must be 1 to 500 characters"))]
    pub greeting_message: String,
    #[validate(range(
        min = 30,
        max = 3600,
        message = "Maximum call length must be between 30 and 3600 seconds"
    ))]
    pub max_call_duration_seconds: u32,
    #[serde(default)]
    pub sms_call_summary_enabled: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_optional_phone"))]
    pub sms_from_number: String,
    #[serde(default)]
    pub allowed_intents: Vec<String>,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(normalize_phone(value).unwrap_or_else(|| value.to_string()))
    }
}

impl SettingsForm {
    fn intents(&self) -> Vec<CallIntent> {
        let mut intents: Vec<CallIntent> = self
            .allowed_intents
            .iter()
            .map(|raw| CallIntent::from_label(raw))
            .filter(|intent| *intent != CallIntent::Unknown)
            .collect();
        intents.sort();
        intents.dedup();
        intents
    }

    /// Checking SMS summaries without a sending number is rejected.
    fn check(&self) -> Result<(), Vec<String>> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => validation_messages(&e),
        };
        if self.sms_call_summary_enabled.is_some() && self.sms_from_number.trim().is_empty() {
            errors.push("Add an SMS sending number to turn on call summaries".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Apply the form on top of `current`, keeping settings the form does not
    /// cover.
    fn into_update(self, current: ShopSettings) -> ShopConfigUpdate {
        let settings = ShopSettings {
            ai_enabled: self.ai_enabled.is_some(),
            transfer_number: optional(&self.transfer_number),
            allowed_intents: self.intents(),
            greeting_message: self.greeting_message.trim().to_string(),
            max_call_duration_seconds: self.max_call_duration_seconds,
            sms_call_summary_enabled: self.sms_call_summary_enabled.is_some(),
            sms_from_number: optional(&self.sms_from_number),
            ..current
        };
        ShopConfigUpdate {
            name: Some(self.name.trim().to_string()),
            phone: Some(self.phone.trim().to_string()),
            adapter_type: None,
            settings: Some(settings),
        }
    }
}

pub async fn settings_page(user: AuthUser) -> impl IntoResponse {
    DashboardShellTemplate::new(&user, Section::Settings, "Settings", PANEL_URL)
}

pub async fn settings_panel(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
) -> Response {
    match state.api.get_shop(&user.access_token).await {
        Ok(shop) => SettingsPanelTemplate::from_shop(&shop).into_response(),
        Err(e) if e.is_not_found() => htmx::redirect(&headers, Section::Overview.path()),
        Err(e) => upstream_failure(&session, &headers, e, PANEL_URL).await,
    }
}

pub async fn save_settings(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<SettingsForm>,
) -> Response {
    let current = state.api.get_shop(&user.access_token).await;

    if let Err(errors) = form.check() {
        let shop_adapter = current
            .as_ref()
            .map(|shop| shop.adapter_type.label())
            .unwrap_or_default();
        return SettingsPanelTemplate::from_form(&form, shop_adapter, errors).into_response();
    }

    let current = match current {
        Ok(shop) => shop,
        Err(e) => return action_failure(&session, &headers, e).await,
    };
    let update = form.into_update(current.settings);

    match state.api.update_shop(&user.access_token, &update).await {
        Ok(shop) => {
            tracing::info!(user_id = %user.user_id, shop_id = %shop.id, "Shop settings saved");
            let mut panel = SettingsPanelTemplate::from_shop(&shop);
            panel.notice = "Settings saved.".to_string();
            panel.into_response()
        }
        Err(e) => {
            tracing::warn!(user_id = %user.user_id, error = %e, "Saving shop settings failed");
            action_failure(&session, &headers, e).await
        }
    }
}

pub async fn delete_shop(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
) -> Response {
    match state.api.delete_shop(&user.access_token).await {
        Ok(()) => {
            tracing::info!(user_id = %user.user_id, "Shop deleted");
            htmx::redirect(&headers, Section::Overview.path())
        }
        Err(e) => {
            tracing::warn!(user_id = %user.user_id, error = %e, "Deleting shop failed");
            action_failure(&session, &headers, e).await
        }
    }
}
