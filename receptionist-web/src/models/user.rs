use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::utils::htmx;

pub const SESSION_ACCESS_TOKEN: &str = "access_token";
pub const SESSION_USER_ID: &str = "user_id";
pub const SESSION_EMAIL: &str = "email";
pub const SESSION_EXPIRES_AT: &str = "expires_at";

pub const SIGN_IN_PATH: &str = "/sign-in";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserProfile {
    pub email: String,
}

impl UserProfile {
    pub fn name(&self) -> String {
        self.email.split('@').next().unwrap_or("User").to_string()
    }

    pub fn initials(&self) -> String {
        let initials: String = self
            .name()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .take(2)
            .collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials.to_uppercase()
        }
    }
}

/// Signed-in dashboard user, read from the session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub expires_at: i64,
}

impl AuthUser {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        let access_token: Option<String> =
            session.get(SESSION_ACCESS_TOKEN).await.unwrap_or(None);
        let user_id: Option<String> = session.get(SESSION_USER_ID).await.unwrap_or(None);
        let expires_at: Option<i64> = session.get(SESSION_EXPIRES_AT).await.unwrap_or(None);

        match (access_token, user_id, expires_at) {
            (Some(token), Some(uid), Some(expires_at)) => {
                let email: String = session
                    .get(SESSION_EMAIL)
                    .await
                    .unwrap_or(None)
                    .unwrap_or_default();

                let user = AuthUser {
                    user_id: uid,
                    email,
                    access_token: token,
                    expires_at,
                };

                if user.is_expired(chrono::Utc::now().timestamp()) {
                    tracing::info!(user_id = %user.user_id, "Session token expired");
                    session.clear().await;
                    return Err(htmx::redirect(&parts.headers, SIGN_IN_PATH));
                }

                Ok(user)
            }
            _ => Err(htmx::redirect(&parts.headers, SIGN_IN_PATH)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_skip_punctuation() {
        let profile = UserProfile {
            email: "j.doe@example.com".to_string(),
        };
        assert_eq!(profile.name(), "j.doe");
        assert_eq!(profile.initials(), "JD");
    }

    #[test]
    fn empty_email_falls_back() {
        let profile = UserProfile {
            email: String::new(),
        };
        assert_eq!(profile.initials(), "U");
    }

    #[test]
    fn expiry_is_inclusive() {
        let user = AuthUser {
            user_id: "user_1".to_string(),
            email: "owner@shop.test".to_string(),
            access_token: "t".to_string(),
            expires_at: 100,
        };
        assert!(user.is_expired(100));
        assert!(!user.is_expired(99));
    }
}
