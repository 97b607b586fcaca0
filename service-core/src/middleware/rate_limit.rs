use crate::error::AppError;
use axum::{extract::ConnectInfo, http::HeaderMap};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::keyed::DashMapStateStore,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

/// Rate limiter keyed by client IP address
pub type IpRateLimiter = Arc<RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock>>;

/// Allow `attempts` events per `window_seconds` for each client, all
/// available as a burst.
pub fn create_ip_rate_limiter(attempts: u32, window_seconds: u64) -> IpRateLimiter {
    let attempts = NonZeroU32::new(attempts).unwrap_or(NonZeroU32::MIN);
    let window_ms = (window_seconds.max(1) * 1000) / u64::from(attempts.get());
    let quota = Quota::with_period(Duration::from_millis(window_ms.max(1)))
        .unwrap_or_else(|| Quota::per_second(attempts))
        .allow_burst(attempts);

    Arc::new(RateLimiter::dashmap(quota))
}

/// Client address: the first `x-forwarded-for` hop when a proxy set one,
/// otherwise the peer of the connection.
pub fn client_ip(headers: &HeaderMap, peer: Option<ConnectInfo<SocketAddr>>) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| peer.map(|ConnectInfo(addr)| addr.ip()))
}

/// Take one cell for `ip`, or report how long to wait.
///
/// Requests with no known address share a single bucket.
pub fn check_ip_rate_limit(limiter: &IpRateLimiter, ip: Option<IpAddr>) -> Result<(), AppError> {
    let key = ip.unwrap_or_else(|| {
        tracing::warn!("Could not determine IP for rate limiting");
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    });

    limiter.check_key(&key).map_err(|negative| {
        let wait_time = negative.wait_time_from(DefaultClock::default().now());
        AppError::TooManyRequests(
            "Too many requests. Please try again later.".to_string(),
            Some(wait_time.as_secs().max(1)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn ip(raw: &str) -> Option<IpAddr> {
        Some(raw.parse().unwrap())
    }

    #[test]
    fn burst_is_exhausted_after_quota() {
        let limiter = create_ip_rate_limiter(2, 60);

        assert!(check_ip_rate_limit(&limiter, ip("10.0.0.1")).is_ok());
        assert!(check_ip_rate_limit(&limiter, ip("10.0.0.1")).is_ok());
        assert!(matches!(
            check_ip_rate_limit(&limiter, ip("10.0.0.1")),
            Err(AppError::TooManyRequests(_, Some(_)))
        ));
    }

    #[test]
    fn clients_have_separate_allowances() {
        let limiter = create_ip_rate_limiter(1, 60);

        assert!(check_ip_rate_limit(&limiter, ip("10.0.0.1")).is_ok());
        assert!(check_ip_rate_limit(&limiter, ip("10.0.0.1")).is_err());
        assert!(check_ip_rate_limit(&limiter, ip("10.0.0.2")).is_ok());
    }

    #[test]
    fn zero_attempts_still_allows_one() {
        let limiter = create_ip_rate_limiter(0, 10);
        assert!(check_ip_rate_limit(&limiter, None).is_ok());
    }

    #[test]
    fn forwarded_address_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        let peer = ConnectInfo("127.0.0.1:4000".parse::<SocketAddr>().unwrap());

        assert_eq!(client_ip(&headers, Some(peer)), ip("203.0.113.7"));
        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), ip("127.0.0.1"));
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }
}
