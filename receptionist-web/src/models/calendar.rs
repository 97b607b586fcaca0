use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarStatus {
    pub connected: bool,
    #[serde(default = "default_provider")]
    pub provider: String,
    pub email: Option<String>,
}

fn default_provider() -> String {
    "none".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarAuthorization {
    pub authorization_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarDisconnect {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
