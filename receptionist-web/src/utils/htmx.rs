use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
};

pub const HX_REQUEST: &str = "HX-Request";
pub const HX_REDIRECT: &str = "HX-Redirect";
pub const HX_RETARGET: &str = "HX-Retarget";
pub const HX_RESWAP: &str = "HX-Reswap";

/// Element id every dashboard page reserves for action messages.
pub const ACTION_NOTICE_TARGET: &str = "#action-notice";

pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

/// Navigate the browser to `location`.
///
/// htmx swaps redirect responses into the target element, so fragment
/// requests get an `HX-Redirect` header instead of a 303.
pub fn redirect(headers: &HeaderMap, location: &str) -> Response {
    if is_htmx(headers) {
        full_page_redirect(location)
    } else {
        Redirect::to(location).into_response()
    }
}

pub fn full_page_redirect(location: &str) -> Response {
    let mut response_headers = HeaderMap::new();
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response_headers.insert(HX_REDIRECT, value);
            (StatusCode::OK, response_headers, "").into_response()
        }
        Err(_) => {
            tracing::error!(location = %location, "Refusing to redirect to invalid location");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Swap `response` into `target` instead of the element that made the request.
pub fn retarget(mut response: Response, target: &'static str) -> Response {
    let headers = response.headers_mut();
    headers.insert(HX_RETARGET, HeaderValue::from_static(target));
    headers.insert(HX_RESWAP, HeaderValue::from_static("innerHTML"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn plain_requests_get_see_other() {
        let response = redirect(&HeaderMap::new(), "/sign-in");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/sign-in");
    }

    #[test]
    fn htmx_requests_get_hx_redirect() {
        let mut headers = HeaderMap::new();
        headers.insert(HX_REQUEST, HeaderValue::from_static("true"));

        let response = redirect(&headers, "/sign-in");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(HX_REDIRECT).unwrap(), "/sign-in");
    }

    #[test]
    fn retarget_points_htmx_at_another_element() {
        let response = retarget(StatusCode::OK.into_response(), ACTION_NOTICE_TARGET);
        assert_eq!(response.headers().get(HX_RETARGET).unwrap(), "#action-notice");
        assert_eq!(response.headers().get(HX_RESWAP).unwrap(), "innerHTML");
    }
}
