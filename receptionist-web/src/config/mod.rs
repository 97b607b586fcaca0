use secrecy::Secret;
use serde::Deserialize;
use service_core::error::AppError;
use std::time::Duration;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub identity: IdentitySettings,
    pub contact: ContactSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Browser-facing origin, used to build provider return URLs.
    pub public_url: String,
    pub session_secret: Secret<String>,
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Collector endpoint; leave unset to log without span export.
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Clone)]
pub struct ApiSettings {
    /// Base URL of the receptionist backend (e.g. http://api:8000).
    pub url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_recent_calls_limit")]
    pub recent_calls_limit: u32,
    #[serde(default = "default_call_history_limit")]
    pub call_history_limit: u32,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_recent_calls_limit() -> u32 {
    5
}

fn default_call_history_limit() -> u32 {
    100
}

#[derive(Deserialize, Clone)]
pub struct IdentitySettings {
    /// Hosted sign-in page of the identity provider.
    pub sign_in_url: String,
}

#[derive(Deserialize, Clone)]
pub struct ContactSettings {
    pub max_submissions: u32,
    pub window_seconds: u64,
}

pub fn get_configuration() -> Result<Settings, AppError> {
    service_core::config::load_layered("receptionist-web")
}
