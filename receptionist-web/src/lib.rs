pub mod config;
pub mod demo;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;
pub mod views;

use anyhow::Context;
use config::Settings;
use demo::DemoLibrary;
use secrecy::ExposeSecret;
use service_core::middleware::rate_limit::{create_ip_rate_limiter, IpRateLimiter};
use services::ReceptionistApi;
use std::sync::Arc;
use tower_sessions::cookie::Key;

/// Shared application state: the API client, demo content and settings.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<ReceptionistApi>,
    pub demo: Arc<DemoLibrary>,
    pub settings: Arc<Settings>,
    pub contact_limiter: IpRateLimiter,
    pub session_key: Key,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let api = ReceptionistApi::new(&settings.api)?;
        let demo = DemoLibrary::load().context("demo content failed validation")?;
        let session_key = Key::try_from(settings.server.session_secret.expose_secret().as_bytes())
            .map_err(|_| anyhow::anyhow!("server.session_secret must be at least 64 bytes"))?;
        let contact_limiter = create_ip_rate_limiter(
            settings.contact.max_submissions,
            settings.contact.window_seconds,
        );

        Ok(Self {
            api: Arc::new(api),
            demo: Arc::new(demo),
            settings: Arc::new(settings),
            contact_limiter,
            session_key,
        })
    }

    /// Absolute URL on this site, for provider return links.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.settings.server.public_url.trim_end_matches('/'),
            path
        )
    }
}
