use anyhow::Context;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use service_core::observability::{TracedClientExt, TracedRequest};
use std::time::{Duration, Instant};
use tracing::instrument;

use super::error::ApiError;
use super::metrics::record_upstream;
use crate::config::ApiSettings;
use crate::models::{
    CalendarAuthorization, CalendarDisconnect, CalendarStatus, CallAnalytics, CallLog,
    CheckoutRequest, CheckoutResponse, CustomerContext, PlanTier, PortalRequest, PortalResponse,
    QuotaStatus, ShopConfig, ShopConfigCreate, ShopConfigUpdate, Subscription,
};
use crate::utils::phone::normalize_phone;

pub const MAX_ANALYTICS_DAYS: u32 = 365;

/// Typed client for the receptionist REST API.
///
/// Every call is made on behalf of the signed-in user: the caller passes the
/// user's bearer token. No retries; failures surface as [`ApiError`].
#[derive(Clone)]
pub struct ReceptionistApi {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ReceptionistApi {
    pub fn new(settings: &ApiSettings) -> anyhow::Result<Self> {
        let base_url = Url::parse(&settings.url)
            .with_context(|| format!("invalid API url: {}", settings.url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API url cannot be used as a base: {}", settings.url);
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            timeout: settings.timeout(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ApiError::InvalidRequest("API url cannot be used as a base".to_string())
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn execute(
        &self,
        endpoint: &'static str,
        request: TracedRequest,
        token: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let started = Instant::now();
        let result = request
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                record_upstream(endpoint, status.as_str(), started.elapsed());
                if status.is_success() {
                    return Ok(response);
                }

                let body = response.text().await.unwrap_or_default();
                let error = ApiError::from_status(status, &body);
                tracing::warn!(
                    endpoint,
                    status = status.as_u16(),
                    error = %error,
                    "Receptionist API returned an error"
                );
                Err(error)
            }
            Err(e) => {
                record_upstream(endpoint, "error", started.elapsed());
                tracing::error!(endpoint, error = %e, "Receptionist API request failed");
                Err(ApiError::from(e))
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: TracedRequest,
        token: &str,
    ) -> Result<T, ApiError> {
        let response = self.execute(endpoint, request, token).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::error!(endpoint, error = %e, "Failed to decode receptionist API response");
            ApiError::Decode(e.to_string())
        })
    }

    // ---------------------------------------------------------------------
    // Shop
    // ---------------------------------------------------------------------

    #[instrument(skip_all)]
    pub async fn get_shop(&self, token: &str) -> Result<ShopConfig, ApiError> {
        let url = self.endpoint(&["api", "shops", "me"])?;
        self.fetch("get_shop", self.client.traced_get(url), token).await
    }

    #[instrument(skip_all, fields(name = %create.name))]
    pub async fn create_shop(
        &self,
        token: &str,
        create: &ShopConfigCreate,
    ) -> Result<ShopConfig, ApiError> {
        let url = self.endpoint(&["api", "shops", "me"])?;
        self.fetch("create_shop", self.client.traced_post(url).json(create), token).await
    }

    #[instrument(skip_all)]
    pub async fn update_shop(
        &self,
        token: &str,
        update: &ShopConfigUpdate,
    ) -> Result<ShopConfig, ApiError> {
        let url = self.endpoint(&["api", "shops", "me"])?;
        self.fetch("update_shop", self.client.traced_patch(url).json(update), token).await
    }

    #[instrument(skip_all)]
    pub async fn delete_shop(&self, token: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "shops", "me"])?;
        self.execute("delete_shop", self.client.traced_delete(url), token)
            .await?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Calls
    // ---------------------------------------------------------------------

    #[instrument(skip(self, token))]
    pub async fn list_calls(&self, token: &str, limit: u32) -> Result<Vec<CallLog>, ApiError> {
        let url = self.endpoint(&["api", "calls", "me"])?;
        let request = self.client.traced_get(url).query(&[("limit", limit)]);
        self.fetch("list_calls", request, token).await
    }

    #[instrument(skip(self, token))]
    pub async fn get_call(&self, token: &str, call_id: &str) -> Result<CallLog, ApiError> {
        if call_id.trim().is_empty() {
            return Err(ApiError::InvalidRequest("Call id is required".to_string()));
        }
        let url = self.endpoint(&["api", "calls", "me", call_id])?;
        self.fetch("get_call", self.client.traced_get(url), token).await
    }

    #[instrument(skip(self, token))]
    pub async fn call_analytics(&self, token: &str, days: u32) -> Result<CallAnalytics, ApiError> {
        if !(1..=MAX_ANALYTICS_DAYS).contains(&days) {
            return Err(ApiError::InvalidRequest(format!(
                "Analytics period must be between 1 and {MAX_ANALYTICS_DAYS} days"
            )));
        }
        let url = self.endpoint(&["api", "calls", "me", "analytics"])?;
        let request = self.client.traced_get(url).query(&[("days", days)]);
        self.fetch("call_analytics", request, token).await
    }

    /// Prior interactions with a caller. The number is normalised to E.164
    /// before it goes into the path.
    #[instrument(skip_all)]
    pub async fn customer_context(
        &self,
        token: &str,
        phone_number: &str,
    ) -> Result<CustomerContext, ApiError> {
        let normalized = normalize_phone(phone_number).ok_or_else(|| {
            ApiError::InvalidRequest(format!("Not a valid phone number: {phone_number}"))
        })?;
        let url = self.endpoint(&["api", "context", "customer", &normalized])?;
        self.fetch("customer_context", self.client.traced_get(url), token).await
    }

    // ---------------------------------------------------------------------
    // Billing
    // ---------------------------------------------------------------------

    #[instrument(skip_all)]
    pub async fn subscription(&self, token: &str) -> Result<Subscription, ApiError> {
        let url = self.endpoint(&["api", "billing", "subscription"])?;
        self.fetch("subscription", self.client.traced_get(url), token).await
    }

    #[instrument(skip_all)]
    pub async fn quota(&self, token: &str) -> Result<QuotaStatus, ApiError> {
        let url = self.endpoint(&["api", "billing", "quota"])?;
        self.fetch("quota", self.client.traced_get(url), token).await
    }

    #[instrument(skip_all, fields(plan_tier = request.plan_tier.code()))]
    pub async fn create_checkout(
        &self,
        token: &str,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, ApiError> {
        match request.plan_tier {
            PlanTier::Free => {
                return Err(ApiError::InvalidRequest(
                    "Cannot checkout for free tier".to_string(),
                ))
            }
            PlanTier::Enterprise => {
                return Err(ApiError::InvalidRequest(
                    "Enterprise requires custom pricing. Contact sales.".to_string(),
                ))
            }
            PlanTier::Starter | PlanTier::Professional => {}
        }

        let url = self.endpoint(&["api", "billing", "checkout"])?;
        self.fetch("create_checkout", self.client.traced_post(url).json(request), token).await
    }

    #[instrument(skip_all)]
    pub async fn create_portal(
        &self,
        token: &str,
        request: &PortalRequest,
    ) -> Result<PortalResponse, ApiError> {
        let url = self.endpoint(&["api", "billing", "portal"])?;
        self.fetch("create_portal", self.client.traced_post(url).json(request), token).await
    }

    // ---------------------------------------------------------------------
    // Calendar
    // ---------------------------------------------------------------------

    #[instrument(skip_all)]
    pub async fn calendar_auth_url(&self, token: &str) -> Result<CalendarAuthorization, ApiError> {
        let url = self.endpoint(&["api", "calendar", "google", "auth"])?;
        self.fetch("calendar_auth_url", self.client.traced_get(url), token).await
    }

    #[instrument(skip_all)]
    pub async fn calendar_status(&self, token: &str) -> Result<CalendarStatus, ApiError> {
        let url = self.endpoint(&["api", "calendar", "google", "status"])?;
        self.fetch("calendar_status", self.client.traced_get(url), token).await
    }

    #[instrument(skip_all)]
    pub async fn calendar_disconnect(&self, token: &str) -> Result<CalendarDisconnect, ApiError> {
        let url = self.endpoint(&["api", "calendar", "google", "disconnect"])?;
        self.fetch("calendar_disconnect", self.client.traced_post(url), token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(url: &str) -> ReceptionistApi {
        ReceptionistApi::new(&ApiSettings {
            url: url.to_string(),
            timeout_seconds: 5,
            recent_calls_limit: 5,
            call_history_limit: 100,
        })
        .unwrap()
    }

    #[test]
    fn endpoints_join_onto_base_url() {
        let api = api("http://localhost:8000");
        assert_eq!(
            api.endpoint(&["api", "shops", "me"]).unwrap().as_str(),
            "http://localhost:8000/api/shops/me"
        );
    }

    #[test]
    fn endpoints_keep_base_path_prefix() {
        let api = api("https://example.com/backend/");
        assert_eq!(
            api.endpoint(&["api", "billing", "quota"]).unwrap().as_str(),
            "https://example.com/backend/api/billing/quota"
        );
    }

    #[test]
    fn path_segments_are_escaped() {
        let api = api("http://localhost:8000");
        let url = api.endpoint(&["api", "calls", "me", "a/b c"]).unwrap();
        assert_eq!(url.path(), "/api/calls/me/a%2Fb%20c");
    }

    #[test]
    fn rejects_unusable_base_url() {
        let result = ReceptionistApi::new(&ApiSettings {
            url: "mailto:ops@example.com".to_string(),
            timeout_seconds: 5,
            recent_calls_limit: 5,
            call_history_limit: 100,
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn analytics_period_is_checked_locally() {
        let api = api("http://127.0.0.1:9");
        for days in [0, 366] {
            let err = api.call_analytics("token", days).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidRequest(_)));
        }
    }

    #[tokio::test]
    async fn checkout_refuses_free_and_enterprise() {
        let api = api("http://127.0.0.1:9");
        let request = |plan_tier| CheckoutRequest {
            plan_tier,
            success_url: "http://localhost:3000/dashboard/billing?success=true".to_string(),
            cancel_url: "http://localhost:3000/dashboard/billing?canceled=true".to_string(),
        };

        let free = api
            .create_checkout("token", &request(PlanTier::Free))
            .await
            .unwrap_err();
        assert_eq!(free.user_message(), "Cannot checkout for free tier");

        let enterprise = api
            .create_checkout("token", &request(PlanTier::Enterprise))
            .await
            .unwrap_err();
        assert_eq!(
            enterprise.user_message(),
            "Enterprise requires custom pricing. Contact sales."
        );
    }

    #[tokio::test]
    async fn customer_context_needs_a_phone_number() {
        let api = api("http://127.0.0.1:9");
        let err = api.customer_context("token", "n/a").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
