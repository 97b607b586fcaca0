use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::call::CallIntent;

/// Data source the backend uses for a shop's work orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterType {
    #[default]
    Mock,
    Tekmetric,
    Shopware,
}

impl AdapterType {
    /// Wire name, as used in forms and API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            AdapterType::Mock => "mock",
            AdapterType::Tekmetric => "tekmetric",
            AdapterType::Shopware => "shopware",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdapterType::Mock => "Demo data",
            AdapterType::Tekmetric => "Tekmetric",
            AdapterType::Shopware => "Shop-Ware",
        }
    }

    pub fn is_live(&self) -> bool {
        !matches!(self, AdapterType::Mock)
    }
}

pub const DEFAULT_GREETING: &str =
    "Thank you for calling {shop_name}. How can I help you today?";

/// AI and call handling settings.
///
/// The backend replaces the whole settings object on update, so fields the
/// dashboard does not edit (calendar booking setup and the like) are kept in
/// `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopSettings {
    pub ai_enabled: bool,
    pub transfer_number: Option<String>,
    pub allowed_intents: Vec<CallIntent>,
    pub greeting_message: String,
    pub max_call_duration_seconds: u32,
    pub sms_call_summary_enabled: bool,
    pub sms_from_number: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            ai_enabled: true,
            transfer_number: None,
            allowed_intents: CallIntent::configurable().to_vec(),
            greeting_message: DEFAULT_GREETING.to_string(),
            max_call_duration_seconds: 300,
            sms_call_summary_enabled: false,
            sms_from_number: None,
            extra: Map::new(),
        }
    }
}

impl ShopSettings {
    /// Greeting with the `{shop_name}` placeholder filled in.
    pub fn rendered_greeting(&self, shop_name: &str) -> String {
        self.greeting_message.replace("{shop_name}", shop_name)
    }

    pub fn allows(&self, intent: CallIntent) -> bool {
        self.allowed_intents.contains(&intent)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub adapter_type: AdapterType,
    #[serde(default)]
    pub settings: ShopSettings,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopConfigCreate {
    pub name: String,
    pub phone: String,
    pub adapter_type: AdapterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<ShopSettings>,
}

/// Partial update; `settings` replaces the whole settings object.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShopConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter_type: Option<AdapterType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<ShopSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_fill_defaults_and_keep_unknown_fields() {
        let settings: ShopSettings = serde_json::from_value(serde_json::json!({
            "ai_enabled": false,
            "calendar_settings": {"provider": "google"}
        }))
        .unwrap();

        assert!(!settings.ai_enabled);
        assert_eq!(settings.max_call_duration_seconds, 300);
        assert_eq!(settings.allowed_intents.len(), 5);
        assert!(settings.allows(CallIntent::GetHours));
        assert_eq!(
            settings.extra.get("calendar_settings"),
            Some(&serde_json::json!({"provider": "google"}))
        );
    }

    #[test]
    fn unknown_settings_survive_an_update() {
        let mut settings: ShopSettings = serde_json::from_value(serde_json::json!({
            "ai_enabled": true,
            "calendar_settings": {"provider": "google", "calendar_id": "primary"}
        }))
        .unwrap();
        settings.ai_enabled = false;

        let update = ShopConfigUpdate {
            settings: Some(settings),
            ..Default::default()
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["settings"]["ai_enabled"], false);
        assert_eq!(
            body["settings"]["calendar_settings"],
            serde_json::json!({"provider": "google", "calendar_id": "primary"})
        );
    }

    #[test]
    fn greeting_placeholder_is_filled() {
        let settings = ShopSettings::default();
        assert_eq!(
            settings.rendered_greeting("Main Street Auto"),
            "Thank you for calling Main Street Auto. How can I help you today?"
        );
    }

    #[test]
    fn update_omits_unset_fields() {
        let update = ShopConfigUpdate {
            name: Some("Main Street Auto".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"name": "Main Street Auto"})
        );
    }

    #[test]
    fn shop_config_parses_backend_payload() {
        let shop: ShopConfig = serde_json::from_value(serde_json::json!({
            "id": "65f0c0ffee",
            "name": "Main Street Auto",
            "phone": "+15551234567",
            "adapter_type": "tekmetric",
            "settings": {"ai_enabled": true},
            "created_at": "2026-01-05T10:00:00Z",
            "updated_at": "2026-01-06T10:00:00.500000"
        }))
        .unwrap();

        assert_eq!(shop.adapter_type, AdapterType::Tekmetric);
        assert!(shop.adapter_type.is_live());
    }
}
