//! Prometheus exposition for the web tier.
//!
//! Request metrics come from `service_core::middleware::metrics`; calls to
//! the receptionist API are recorded here.

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0,
];

/// Install the global Prometheus recorder.
pub fn init_metrics() -> anyhow::Result<()> {
    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?;
    let handle = builder.install_recorder()?;

    if METRICS_HANDLE.set(handle).is_err() {
        anyhow::bail!("metrics recorder already initialized");
    }
    Ok(())
}

/// Metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record one call to the receptionist API. `status` is the HTTP status code,
/// or `error` when no response arrived.
pub fn record_upstream(endpoint: &'static str, status: &str, elapsed: Duration) {
    metrics::counter!(
        "upstream_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("upstream_request_duration_seconds", "endpoint" => endpoint)
        .record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_without_recorder_is_harmless() {
        record_upstream("get_shop", "200", Duration::from_millis(12));
        assert!(get_metrics().starts_with('#') || get_metrics().contains("upstream"));
    }
}
