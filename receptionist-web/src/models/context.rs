use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One prior touchpoint with a caller, on any channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub channel: String,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    pub intent: Option<String>,
    pub summary: Option<String>,
    pub outcome: Option<String>,
}

/// What the backend remembers about a caller across voice and SMS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerContext {
    pub phone_number: String,
    pub shop_id: String,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub last_interaction: DateTime<Utc>,
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
    #[serde(default)]
    pub known_info: BTreeMap<String, serde_json::Value>,
}

impl CustomerContext {
    /// Most recent interactions first.
    pub fn recent_interactions(&self, limit: usize) -> Vec<&InteractionRecord> {
        let mut records: Vec<&InteractionRecord> = self.interactions.iter().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit);
        records
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.known_info.get("name").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_interactions_are_newest_first() {
        let context: CustomerContext = serde_json::from_value(serde_json::json!({
            "phone_number": "+15551234567",
            "shop_id": "s1",
            "last_interaction": "2026-03-03T10:00:00Z",
            "interactions": [
                {"channel": "voice", "timestamp": "2026-03-01T10:00:00Z", "intent": "GET_HOURS"},
                {"channel": "sms", "timestamp": "2026-03-03T10:00:00Z", "summary": "Car ready"},
                {"channel": "voice", "timestamp": "2026-03-02T10:00:00Z"}
            ],
            "known_info": {"name": "Dana Ruiz"}
        }))
        .unwrap();

        let recent = context.recent_interactions(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].channel, "sms");
        assert_eq!(context.customer_name(), Some("Dana Ruiz"));
    }
}
