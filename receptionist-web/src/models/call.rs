use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Backend-assigned category for what the caller wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallIntent {
    CheckStatus,
    GetHours,
    GetLocation,
    GetServices,
    TransferHuman,
    #[serde(other)]
    Unknown,
}

impl CallIntent {
    /// Intents a shop can switch on or off for its receptionist.
    pub const fn configurable() -> &'static [CallIntent] {
        &[
            CallIntent::CheckStatus,
            CallIntent::GetHours,
            CallIntent::GetLocation,
            CallIntent::GetServices,
            CallIntent::TransferHuman,
        ]
    }

    pub fn from_label(raw: &str) -> CallIntent {
        serde_json::from_value(serde_json::Value::String(raw.to_string()))
            .unwrap_or(CallIntent::Unknown)
    }

    pub fn code(&self) -> &'static str {
        match self {
            CallIntent::CheckStatus => "CHECK_STATUS",
            CallIntent::GetHours => "GET_HOURS",
            CallIntent::GetLocation => "GET_LOCATION",
            CallIntent::GetServices => "GET_SERVICES",
            CallIntent::TransferHuman => "TRANSFER_HUMAN",
            CallIntent::Unknown => "UNKNOWN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CallIntent::CheckStatus => "Status check",
            CallIntent::GetHours => "Hours inquiry",
            CallIntent::GetLocation => "Location / directions",
            CallIntent::GetServices => "Services & pricing",
            CallIntent::TransferHuman => "Asked for a person",
            CallIntent::Unknown => "Other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CallIntent::CheckStatus => "Look up a vehicle's repair status from the work order",
            CallIntent::GetHours => "Answer questions about opening hours",
            CallIntent::GetLocation => "Give the shop address and directions",
            CallIntent::GetServices => "Describe services offered",
            CallIntent::TransferHuman => "Forward the caller to your transfer number",
            CallIntent::Unknown => "Anything the receptionist could not classify",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallOutcome {
    Resolved,
    Transferred,
    Abandoned,
    Failed,
    Timeout,
    #[serde(other)]
    Unknown,
}

impl CallOutcome {
    pub fn from_label(raw: &str) -> CallOutcome {
        serde_json::from_value(serde_json::Value::String(raw.to_string()))
            .unwrap_or(CallOutcome::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CallOutcome::Resolved => "Resolved",
            CallOutcome::Transferred => "Transferred",
            CallOutcome::Abandoned => "Caller hung up",
            CallOutcome::Failed => "Failed",
            CallOutcome::Timeout => "Timed out",
            CallOutcome::Unknown => "Unknown",
        }
    }

    /// CSS modifier for the outcome badge.
    pub fn badge_class(&self) -> &'static str {
        match self {
            CallOutcome::Resolved => "badge-success",
            CallOutcome::Transferred => "badge-info",
            CallOutcome::Abandoned | CallOutcome::Timeout => "badge-warning",
            CallOutcome::Failed => "badge-danger",
            CallOutcome::Unknown => "badge-muted",
        }
    }
}

/// One AI-handled call. Never carries audio or transcript text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLog {
    pub id: String,
    pub shop_id: String,
    pub work_order_id: Option<String>,
    pub call_sid: Option<String>,
    pub caller_number: Option<String>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: Option<i64>,
    pub intent: CallIntent,
    #[serde(default)]
    pub confidence: f64,
    pub outcome: CallOutcome,
    #[serde(default)]
    pub slots: BTreeMap<String, serde_json::Value>,
    pub tool_called: Option<String>,
    #[serde(default)]
    pub tool_results: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub fallback_used: bool,
    pub transfer_reason: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl CallLog {
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCallCount {
    pub date: String,
    pub count: i64,
}

/// Aggregates computed upstream for the analytics page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAnalytics {
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub period_start: DateTime<Utc>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub period_end: DateTime<Utc>,
    pub total_calls: i64,
    pub avg_duration_seconds: Option<f64>,
    #[serde(default)]
    pub calls_by_day: Vec<DailyCallCount>,
    #[serde(default)]
    pub outcomes: HashMap<String, i64>,
    #[serde(default)]
    pub resolution_rate: f64,
    #[serde(default)]
    pub intents: HashMap<String, i64>,
    #[serde(default)]
    pub calls_by_hour: HashMap<String, i64>,
}
