use crate::models::{PlanTier, QuotaStatus, Usage};
use crate::utils::format::{format_date, format_minutes, format_percent, format_price};

pub const WARNING_THRESHOLD: f64 = 80.0;
pub const LIMIT_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageState {
    Normal,
    Warning,
    LimitReached,
    Unlimited,
}

impl UsageState {
    pub fn classify(usage: &Usage) -> Self {
        if usage.percentage_used >= LIMIT_THRESHOLD {
            UsageState::LimitReached
        } else if usage.percentage_used >= WARNING_THRESHOLD {
            UsageState::Warning
        } else if usage.is_unlimited() {
            UsageState::Unlimited
        } else {
            UsageState::Normal
        }
    }

    pub fn is_limit_reached(&self) -> bool {
        matches!(self, UsageState::LimitReached)
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            UsageState::Normal => "usage-normal",
            UsageState::Warning => "usage-warning",
            UsageState::LimitReached => "usage-limit",
            UsageState::Unlimited => "usage-unlimited",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            UsageState::Normal | UsageState::Unlimited => "",
            UsageState::Warning => {
                "You have used most of this period's allowance. Upgrade to keep the AI answering."
            }
            UsageState::LimitReached => {
                "Usage limit reached. Calls are transferred to your shop until you upgrade or the period resets."
            }
        }
    }
}

/// Progress bar for the current billing period.
#[derive(Debug, Clone)]
pub struct UsageMeter {
    pub state: UsageState,
    /// Bar width in percent, always within 0..=100.
    pub bar_width: u32,
    pub percent_label: String,
    pub amount_label: String,
    pub period_label: String,
}

impl UsageMeter {
    pub fn new(usage: &Usage) -> Self {
        let state = UsageState::classify(usage);
        let percent = if usage.percentage_used.is_finite() {
            usage.percentage_used.clamp(0.0, 100.0)
        } else {
            0.0
        };

        let amount_label = match (usage.minute_limit, usage.call_limit) {
            (Some(limit), _) => format!(
                "{} of {} minutes",
                format_minutes(usage.minutes_used),
                limit
            ),
            (None, Some(limit)) => format!("{} of {} calls", usage.call_count, limit),
            (None, None) => format!(
                "{} minutes used, {} calls",
                format_minutes(usage.minutes_used),
                usage.call_count
            ),
        };

        Self {
            state,
            bar_width: if state == UsageState::Unlimited {
                0
            } else {
                percent.round() as u32
            },
            percent_label: format_percent(percent),
            amount_label,
            period_label: format!(
                "{} – {}",
                format_date(&usage.period_start),
                format_date(&usage.period_end)
            ),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.state == UsageState::Unlimited
    }

    pub fn has_message(&self) -> bool {
        !self.state.message().is_empty()
    }
}

/// A plan as sold on the pricing page and billing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanInfo {
    pub tier: PlanTier,
    /// `None` means negotiated pricing.
    pub monthly_price: Option<u32>,
    /// `None` means unlimited.
    pub included_minutes: Option<u32>,
    /// `None` means unlimited.
    pub concurrent_calls: Option<u32>,
    pub tagline: &'static str,
    pub highlights: &'static [&'static str],
}

pub const PLAN_CATALOG: [PlanInfo; 4] = [
    PlanInfo {
        tier: PlanTier::Free,
        monthly_price: Some(0),
        included_minutes: Some(10),
        concurrent_calls: Some(2),
        tagline: "Try the receptionist on your own line.",
        highlights: &[
            "Repair status, hours and directions",
            "Call history",
            "Demo data adapter",
        ],
    },
    PlanInfo {
        tier: PlanTier::Starter,
        monthly_price: Some(49),
        included_minutes: Some(100),
        concurrent_calls: Some(5),
        tagline: "For a single-bay shop that misses calls at the counter.",
        highlights: &[
            "Everything in Free",
            "Tekmetric and Shop-Ware integration",
            "SMS call summaries",
            "Call analytics",
        ],
    },
    PlanInfo {
        tier: PlanTier::Professional,
        monthly_price: Some(99),
        included_minutes: Some(500),
        concurrent_calls: Some(10),
        tagline: "For busy shops that want every call answered.",
        highlights: &[
            "Everything in Starter",
            "Google Calendar booking",
            "Caller history across voice and SMS",
            "Priority support",
        ],
    },
    PlanInfo {
        tier: PlanTier::Enterprise,
        monthly_price: None,
        included_minutes: None,
        concurrent_calls: None,
        tagline: "Multi-location groups and dealer service departments.",
        highlights: &[
            "Everything in Professional",
            "Unlimited minutes and concurrent calls",
            "Custom integrations",
            "Dedicated onboarding",
        ],
    },
];

pub fn plan_info(tier: PlanTier) -> &'static PlanInfo {
    match tier {
        PlanTier::Free => &PLAN_CATALOG[0],
        PlanTier::Starter => &PLAN_CATALOG[1],
        PlanTier::Professional => &PLAN_CATALOG[2],
        PlanTier::Enterprise => &PLAN_CATALOG[3],
    }
}

impl PlanInfo {
    pub fn name(&self) -> &'static str {
        self.tier.name()
    }

    pub fn code(&self) -> &'static str {
        self.tier.code()
    }

    pub fn price_label(&self) -> String {
        format_price(self.monthly_price)
    }

    pub fn allowance_label(&self) -> String {
        match self.included_minutes {
            Some(minutes) => format!("{minutes} minutes / month"),
            None => "Unlimited minutes".to_string(),
        }
    }

    pub fn concurrency_label(&self) -> String {
        match self.concurrent_calls {
            Some(1) => "1 call at a time".to_string(),
            Some(calls) => format!("{calls} concurrent calls"),
            None => "Unlimited concurrent calls".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    Current,
    Upgrade,
    Downgrade,
    ContactSales,
}

impl PlanAction {
    pub fn label(&self) -> &'static str {
        match self {
            PlanAction::Current => "Current plan",
            PlanAction::Upgrade => "Upgrade",
            PlanAction::Downgrade => "Downgrade",
            PlanAction::ContactSales => "Contact sales",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlanCard {
    pub plan: &'static PlanInfo,
    pub action: PlanAction,
    pub enabled: bool,
}

impl PlanCard {
    pub fn is_current(&self) -> bool {
        self.action == PlanAction::Current
    }

    /// Upgrades go through checkout; plan reductions through the billing
    /// portal; enterprise through the contact form.
    pub fn form_action(&self) -> &'static str {
        match self.action {
            PlanAction::Upgrade => "/dashboard/billing/checkout",
            PlanAction::Downgrade | PlanAction::Current => "/dashboard/billing/portal",
            PlanAction::ContactSales => "/contact",
        }
    }

    pub fn is_link(&self) -> bool {
        self.action == PlanAction::ContactSales
    }
}

pub fn plan_cards(current: PlanTier, usage: UsageState) -> Vec<PlanCard> {
    PLAN_CATALOG
        .iter()
        .map(|plan| {
            let action = if plan.tier == current {
                PlanAction::Current
            } else if plan.tier == PlanTier::Enterprise {
                PlanAction::ContactSales
            } else if plan.tier > current {
                PlanAction::Upgrade
            } else {
                PlanAction::Downgrade
            };

            let enabled = match action {
                PlanAction::Current => false,
                PlanAction::Upgrade | PlanAction::ContactSales => true,
                PlanAction::Downgrade => !usage.is_limit_reached(),
            };

            PlanCard {
                plan,
                action,
                enabled,
            }
        })
        .collect()
}

/// Concurrency line for the quota card.
pub fn concurrency_summary(quota: &QuotaStatus) -> String {
    match quota.concurrent_limit {
        Some(limit) => {
            let mut summary = format!(
                "{} of {} concurrent calls in use",
                quota.concurrent_count, limit
            );
            if quota.queue_size > 0 {
                summary.push_str(&format!(", {} waiting", quota.queue_size));
            }
            summary
        }
        None => format!("{} calls in progress (no limit)", quota.concurrent_count),
    }
}

pub fn remaining_summary(quota: &QuotaStatus) -> String {
    match (quota.minutes_remaining, quota.calls_remaining) {
        (Some(minutes), _) => format!("{minutes} minutes remaining"),
        (None, Some(calls)) => format!("{calls} calls remaining"),
        (None, None) => "Unlimited".to_string(),
    }
}
