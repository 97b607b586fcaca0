use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure talking to the receptionist API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The bearer token was rejected (401/403); the user has to sign in again.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API returned {status}: {detail}")]
    Status { status: StatusCode, detail: String },

    #[error("Request to receptionist API failed: {0}")]
    Transport(String),

    #[error("Could not decode API response: {0}")]
    Decode(String),

    /// Rejected before anything was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = extract_detail(status, body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound(detail),
            _ => ApiError::Status { status, detail },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// Text for the page-level error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            ApiError::NotFound(detail) => detail.clone(),
            ApiError::Status { status, detail } if status.is_server_error() => format!(
                "The receptionist service had a problem ({}). {}",
                status.as_u16(),
                detail
            ),
            ApiError::Status { detail, .. } => detail.clone(),
            ApiError::Transport(_) => {
                "We couldn't reach the receptionist service. Check your connection and reload the page."
                    .to_string()
            }
            ApiError::Decode(_) => {
                "The receptionist service sent a response we couldn't read.".to_string()
            }
            ApiError::InvalidRequest(detail) => detail.clone(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_timeout() {
            ApiError::Transport(format!("timed out: {err}"))
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Validation(Vec<ValidationIssue>),
}

#[derive(Deserialize)]
struct ValidationIssue {
    msg: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Detail,
}

/// Pull the human-readable `detail` out of an error body.
///
/// Handles `{"detail": "..."}` and request-validation bodies of the form
/// `{"detail": [{"msg": ...}, ...]}`; anything else falls back to the
/// status reason phrase.
pub fn extract_detail(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Detail::Message(message),
        }) if !message.trim().is_empty() => message,
        Ok(ErrorBody {
            detail: Detail::Validation(issues),
        }) if !issues.is_empty() => issues
            .into_iter()
            .map(|issue| issue.msg)
            .collect::<Vec<_>>()
            .join("; "),
        _ => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_is_used_verbatim() {
        let detail = extract_detail(
            StatusCode::NOT_FOUND,
            r#"{"detail": "No shop found. Please create a shop first."}"#,
        );
        assert_eq!(detail, "No shop found. Please create a shop first.");
    }

    #[test]
    fn validation_messages_are_joined() {
        let detail = extract_detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [
                {"loc": ["body", "name"], "msg": "field required", "type": "missing"},
                {"loc": ["body", "phone"], "msg": "String should have at least 10 characters"}
            ]}"#,
        );
        assert_eq!(
            detail,
            "field required; String should have at least 10 characters"
        );
    }

    #[test]
    fn non_json_body_uses_reason_phrase() {
        let detail = extract_detail(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert_eq!(detail, "Bad Gateway");
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(ApiError::from_status(StatusCode::NOT_FOUND, "").is_not_found());
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, r#"{"detail": "Shop exists"}"#),
            ApiError::Status { status: StatusCode::CONFLICT, .. }
        ));
    }

    #[test]
    fn server_errors_mention_status_in_banner() {
        let err = ApiError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "Failed to create checkout session"}"#,
        );
        assert_eq!(
            err.user_message(),
            "The receptionist service had a problem (500). Failed to create checkout session"
        );
    }
}
