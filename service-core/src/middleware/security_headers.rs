use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Content policy for server-rendered pages: own assets plus the htmx bundle,
/// inline styles for chart bar widths, and same-origin audio for the demo.
const PAGE_CSP: &str = "default-src 'self'; \
     script-src 'self' https://unpkg.com; \
     style-src 'self' 'unsafe-inline'; \
     img-src 'self' data:; \
     media-src 'self'; \
     connect-src 'self'; \
     frame-ancestors 'none'";

const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let path = req.uri().path();
    let is_machine_route = path == "/health" || path == "/metrics";

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        header::HeaderValue::from_static(if is_machine_route { API_CSP } else { PAGE_CSP }),
    );

    response
}
