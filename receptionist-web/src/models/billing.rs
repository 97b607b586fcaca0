use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Starter,
    Professional,
    Enterprise,
}

impl PlanTier {
    pub const ALL: [PlanTier; 4] = [
        PlanTier::Free,
        PlanTier::Starter,
        PlanTier::Professional,
        PlanTier::Enterprise,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Starter => "starter",
            PlanTier::Professional => "professional",
            PlanTier::Enterprise => "enterprise",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Starter => "Starter",
            PlanTier::Professional => "Professional",
            PlanTier::Enterprise => "Enterprise",
        }
    }

    /// Tiers that can be bought through self-serve checkout.
    pub fn is_self_serve(&self) -> bool {
        matches!(self, PlanTier::Starter | PlanTier::Professional)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    PastDue,
    Trialing,
}

impl SubscriptionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "Active",
            SubscriptionStatus::Canceled => "Canceled",
            SubscriptionStatus::PastDue => "Past due",
            SubscriptionStatus::Trialing => "Trial",
        }
    }

    pub fn needs_attention(&self) -> bool {
        matches!(self, SubscriptionStatus::PastDue | SubscriptionStatus::Canceled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub call_count: i64,
    #[serde(default)]
    pub call_limit: Option<i64>,
    #[serde(default)]
    pub minutes_used: f64,
    /// `None` together with `call_limit: None` means unlimited.
    #[serde(default)]
    pub minute_limit: Option<i64>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub period_start: DateTime<Utc>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub period_end: DateTime<Utc>,
    #[serde(default)]
    pub percentage_used: f64,
}

impl Usage {
    /// Minute-metered plans report minutes; older backends only report calls.
    pub fn is_minute_metered(&self) -> bool {
        self.minute_limit.is_some()
    }

    pub fn is_unlimited(&self) -> bool {
        self.minute_limit.is_none() && self.call_limit.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub plan_tier: PlanTier,
    pub plan_name: String,
    pub status: SubscriptionStatus,
    pub price_monthly: i64,
    pub usage: Usage,
    pub stripe_customer_id: Option<String>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub current_period_start: DateTime<Utc>,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub current_period_end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub allowed: bool,
    #[serde(default)]
    pub minutes_remaining: Option<i64>,
    #[serde(default)]
    pub calls_remaining: Option<i64>,
    pub plan_tier: PlanTier,
    #[serde(default)]
    pub upgrade_required: bool,
    pub concurrent_limit: Option<i64>,
    #[serde(default)]
    pub concurrent_count: i64,
    pub concurrent_available: Option<i64>,
    #[serde(default)]
    pub queue_size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub plan_tier: PlanTier,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortalRequest {
    pub return_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalResponse {
    pub portal_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_order_by_size() {
        assert!(PlanTier::Free < PlanTier::Starter);
        assert!(PlanTier::Professional < PlanTier::Enterprise);
    }

    #[test]
    fn only_paid_standard_tiers_are_self_serve() {
        let self_serve: Vec<_> = PlanTier::ALL.iter().filter(|t| t.is_self_serve()).collect();
        assert_eq!(self_serve, vec![&PlanTier::Starter, &PlanTier::Professional]);
    }

    #[test]
    fn usage_from_call_metered_backend() {
        let usage: Usage = serde_json::from_value(serde_json::json!({
            "call_count": 40,
            "call_limit": 100,
            "period_start": "2026-03-01T00:00:00",
            "period_end": "2026-03-31T00:00:00",
            "percentage_used": 40.0
        }))
        .unwrap();

        assert!(!usage.is_minute_metered());
        assert!(!usage.is_unlimited());
        assert_eq!(usage.minutes_used, 0.0);
    }

    #[test]
    fn status_uses_snake_case() {
        let status: SubscriptionStatus = serde_json::from_str("\"past_due\"").unwrap();
        assert_eq!(status, SubscriptionStatus::PastDue);
        assert!(status.needs_attention());
    }
}
