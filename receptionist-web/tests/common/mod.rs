//! Shared setup for receptionist-web integration tests.
//!
//! Each test gets its own app on a random port, pointed at a wiremock server
//! standing in for the receptionist API.

#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use receptionist_web::config::{
    ApiSettings, ContactSettings, IdentitySettings, ServerSettings, Settings,
};
use receptionist_web::startup::build_router;
use receptionist_web::AppState;
use secrecy::Secret;
use serde_json::{json, Value};
use std::net::SocketAddr;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN_SUBJECT: &str = "user_2abc";
pub const TEST_EMAIL: &str = "owner@mainstreetauto.test";
pub const CONTACT_LIMIT: u32 = 3;

pub fn test_settings(api_url: &str) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_url: "http://shop.test".to_string(),
            session_secret: Secret::new("x".repeat(64)),
            secure_cookies: false,
            log_level: "warn".to_string(),
            otlp_endpoint: None,
        },
        api: ApiSettings {
            url: api_url.to_string(),
            timeout_seconds: 5,
            recent_calls_limit: 5,
            call_history_limit: 100,
        },
        identity: IdentitySettings {
            sign_in_url: "https://accounts.example.com/sign-in".to_string(),
        },
        contact: ContactSettings {
            max_submissions: CONTACT_LIMIT,
            window_seconds: 600,
        },
    }
}

/// An unsigned token with the claims the dashboard reads.
pub fn make_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({"sub": TEST_TOKEN_SUBJECT, "email": TEST_EMAIL, "exp": exp}).to_string(),
    );
    format!("{header}.{payload}.signature")
}

pub struct TestApp {
    pub address: String,
    pub api: MockServer,
    pub client: reqwest::Client,
    pub token: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let api = MockServer::start().await;
        let state = AppState::new(test_settings(&api.uri())).expect("Failed to build app state");
        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .ok();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            address: format!("http://127.0.0.1:{}", port),
            api,
            client,
            token: make_token(chrono::Utc::now().timestamp() + 3600),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// GET as htmx does when loading a fragment.
    pub async fn get_fragment(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("HX-Request", "true")
            .send()
            .await
            .unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Come back from the identity provider with a valid token.
    pub async fn sign_in(&self) {
        let response = self
            .get(&format!("/auth/callback?token={}", self.token))
            .await;
        assert_eq!(response.status().as_u16(), 303, "sign-in callback should redirect");
    }

    /// Mount `GET <api_path>` answering `status` with `body`, requiring the
    /// session's bearer token.
    pub async fn mock_get(&self, api_path: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(api_path))
            .and(header("authorization", format!("Bearer {}", self.token).as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.api)
            .await;
    }
}

pub fn shop_json(ai_enabled: bool) -> Value {
    json!({
        "id": "65f0c0ffee",
        "name": "Main Street Auto",
        "phone": "+15551234567",
        "adapter_type": "mock",
        "settings": {
            "ai_enabled": ai_enabled,
            "transfer_number": "+15559876543",
            "allowed_intents": ["CHECK_STATUS", "GET_HOURS"],
            "greeting_message": "Thanks for calling {shop_name}!",
            "max_call_duration_seconds": 300,
            "sms_call_summary_enabled": false,
            "calendar_settings": {"provider": "google", "calendar_id": "primary"}
        },
        "created_at": "2026-01-05T10:00:00Z",
        "updated_at": "2026-01-05T10:00:00Z"
    })
}

pub fn subscription_json(tier: &str, percentage_used: f64) -> Value {
    json!({
        "plan_tier": tier,
        "plan_name": "Starter",
        "status": "active",
        "price_monthly": 4900,
        "usage": {
            "call_count": 40,
            "minutes_used": percentage_used,
            "minute_limit": 100,
            "period_start": "2026-03-01T00:00:00Z",
            "period_end": "2026-03-31T00:00:00Z",
            "percentage_used": percentage_used
        },
        "stripe_customer_id": "cus_123",
        "current_period_start": "2026-03-01T00:00:00Z",
        "current_period_end": "2026-03-31T00:00:00Z"
    })
}

pub fn quota_json() -> Value {
    json!({
        "allowed": true,
        "minutes_remaining": 0,
        "plan_tier": "starter",
        "upgrade_required": true,
        "concurrent_limit": 5,
        "concurrent_count": 1,
        "concurrent_available": 4,
        "queue_size": 0
    })
}

pub fn call_json(id: &str, caller: Option<&str>) -> Value {
    json!({
        "id": id,
        "shop_id": "65f0c0ffee",
        "work_order_id": "WO-1042",
        "caller_number": caller,
        "timestamp": "2026-03-02T14:05:00Z",
        "duration_seconds": 187,
        "intent": "CHECK_STATUS",
        "confidence": 0.93,
        "outcome": "RESOLVED",
        "slots": {"vehicle_make": "Honda"},
        "tool_called": "get_work_order_status",
        "tool_results": {"status": "in_progress"},
        "fallback_used": false,
        "metadata": {}
    })
}
