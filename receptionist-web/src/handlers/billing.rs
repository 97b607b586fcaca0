use askama::Template;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use super::{action_failure, upstream_failure, DashboardShellTemplate, Section};
use crate::models::{
    AuthUser, CheckoutRequest, PlanTier, PortalRequest, QuotaStatus, Subscription,
};
use crate::services::ApiError;
use crate::utils::{format::format_date, htmx};
use crate::views::{billing, PlanCard, UsageMeter};
use crate::AppState;

const PANEL_URL: &str = "/dashboard/billing/panel";

#[derive(Template)]
#[template(path = "dashboard/billing_panel.html")]
pub struct BillingPanelTemplate {
    pub plan_name: String,
    pub status_label: &'static str,
    pub status_attention: bool,
    pub price_label: String,
    pub renews_on: String,
    pub meter: UsageMeter,
    pub plans: Vec<PlanCard>,
    pub has_portal: bool,
    pub quota: Option<QuotaSummary>,
    pub quota_error: String,
}

pub struct QuotaSummary {
    pub allowed: bool,
    pub upgrade_required: bool,
    pub remaining: String,
    pub concurrency: String,
}

impl QuotaSummary {
    fn new(quota: &QuotaStatus) -> Self {
        Self {
            allowed: quota.allowed,
            upgrade_required: quota.upgrade_required,
            remaining: billing::remaining_summary(quota),
            concurrency: billing::concurrency_summary(quota),
        }
    }
}

impl BillingPanelTemplate {
    fn new(subscription: &Subscription, quota: Result<QuotaStatus, ApiError>) -> Self {
        let meter = UsageMeter::new(&subscription.usage);
        let plans = billing::plan_cards(subscription.plan_tier, meter.state);
        let (quota, quota_error) = match quota {
            Ok(quota) => (Some(QuotaSummary::new(&quota)), String::new()),
            Err(e) => (None, e.user_message()),
        };

        Self {
            plan_name: subscription.plan_name.clone(),
            status_label: subscription.status.label(),
            status_attention: subscription.status.needs_attention(),
            price_label: billing::plan_info(subscription.plan_tier).price_label(),
            renews_on: format_date(&subscription.current_period_end),
            meter,
            plans,
            has_portal: subscription.stripe_customer_id.is_some(),
            quota,
            quota_error,
        }
    }
}

#[derive(Deserialize)]
pub struct BillingParams {
    pub success: Option<String>,
    pub canceled: Option<String>,
}

#[derive(Deserialize)]
pub struct CheckoutForm {
    pub plan_tier: PlanTier,
}

pub async fn billing_page(
    user: AuthUser,
    Query(params): Query<BillingParams>,
) -> impl IntoResponse {
    let shell = DashboardShellTemplate::new(&user, Section::Billing, "Billing", PANEL_URL);
    if params.success.is_some() {
        shell.with_notice("success", "Thanks! Your plan change is being applied.")
    } else if params.canceled.is_some() {
        shell.with_notice("info", "Checkout was canceled. Your plan has not changed.")
    } else {
        shell
    }
}

pub async fn billing_panel(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
) -> Response {
    let token = user.access_token.as_str();
    let (subscription, quota) = tokio::join!(state.api.subscription(token), state.api.quota(token));

    if matches!(quota, Err(ApiError::Unauthorized)) {
        return upstream_failure(&session, &headers, ApiError::Unauthorized, PANEL_URL).await;
    }

    match subscription {
        Ok(subscription) => BillingPanelTemplate::new(&subscription, quota).into_response(),
        Err(e) => upstream_failure(&session, &headers, e, PANEL_URL).await,
    }
}

/// Start hosted checkout for an upgrade.
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let request = CheckoutRequest {
        plan_tier: form.plan_tier,
        success_url: state.public_url("/dashboard/billing?success=true"),
        cancel_url: state.public_url("/dashboard/billing?canceled=true"),
    };

    match state.api.create_checkout(&user.access_token, &request).await {
        Ok(checkout) => {
            tracing::info!(
                user_id = %user.user_id,
                plan = form.plan_tier.code(),
                "Checkout session created"
            );
            htmx::full_page_redirect(&checkout.checkout_url)
        }
        Err(e) => {
            tracing::warn!(user_id = %user.user_id, error = %e, "Checkout failed");
            action_failure(&session, &headers, e).await
        }
    }
}

/// Open the billing portal for payment details, cancellation and plan reductions.
pub async fn portal(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    headers: HeaderMap,
) -> Response {
    let request = PortalRequest {
        return_url: state.public_url(Section::Billing.path()),
    };

    match state.api.create_portal(&user.access_token, &request).await {
        Ok(portal) => htmx::full_page_redirect(&portal.portal_url),
        Err(e) => {
            tracing::warn!(user_id = %user.user_id, error = %e, "Billing portal failed");
            action_failure(&session, &headers, e).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(percentage_used: f64) -> Subscription {
        serde_json::from_value(serde_json::json!({
            "plan_tier": "starter",
            "plan_name": "Starter",
            "status": "active",
            "price_monthly": 4900,
            "usage": {
                "call_count": 80,
                "minutes_used": percentage_used,
                "minute_limit": 100,
                "period_start": "2026-03-01T00:00:00Z",
                "period_end": "2026-03-31T00:00:00Z",
                "percentage_used": percentage_used
            },
            "stripe_customer_id": "cus_123",
            "current_period_start": "2026-03-01T00:00:00Z",
            "current_period_end": "2026-03-31T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn limit_reached_disables_downgrade() {
        let panel = BillingPanelTemplate::new(
            &subscription(104.0),
            Err(ApiError::Transport("x".into())),
        );
        let free = &panel.plans[0];
        assert_eq!(free.action, crate::views::PlanAction::Downgrade);
        assert!(!free.enabled);

        let html = panel.render().unwrap();
        assert!(html.contains("Usage limit reached"));
        assert!(html.contains("usage-limit"));
        assert!(html.contains("width: 100%"));
        assert!(html.contains("Downgrade"));
    }

    #[test]
    fn quota_failure_only_affects_its_card() {
        let panel = BillingPanelTemplate::new(
            &subscription(20.0),
            Err(ApiError::Transport("connection refused".into())),
        );
        assert!(panel.quota.is_none());
        assert!(!panel.quota_error.is_empty());
        assert!(panel.has_portal);
        assert_eq!(panel.meter.bar_width, 20);
    }
}
