//! Session glue for the hosted identity provider.
//!
//! The provider owns sign-up, passwords and MFA. It sends the browser back to
//! `/auth/callback?token=...`; the token is kept in the server-side session
//! and forwarded to the receptionist API as a bearer token.

use crate::models::user::{
    SESSION_ACCESS_TOKEN, SESSION_EMAIL, SESSION_EXPIRES_AT, SESSION_USER_ID,
};
use crate::utils::jwt::{decode_jwt_claims, JwtClaims};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use reqwest::Url;
use serde::Deserialize;
use tower_sessions::Session;

pub const CALLBACK_PATH: &str = "/auth/callback";
pub const AFTER_SIGN_IN_PATH: &str = "/dashboard";

#[derive(Template)]
#[template(path = "auth/sign_in_error.html")]
pub struct SignInErrorTemplate {
    pub message: String,
}

#[derive(Deserialize)]
pub struct CallbackParams {
    pub token: Option<String>,
}

fn sign_in_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        SignInErrorTemplate {
            message: message.to_string(),
        },
    )
        .into_response()
}

async fn has_live_session(session: &Session) -> bool {
    let token: Option<String> = session.get(SESSION_ACCESS_TOKEN).await.unwrap_or(None);
    let expires_at: Option<i64> = session.get(SESSION_EXPIRES_AT).await.unwrap_or(None);
    match (token, expires_at) {
        (Some(_), Some(expires_at)) => expires_at > chrono::Utc::now().timestamp(),
        _ => false,
    }
}

/// Hand the browser to the identity provider.
pub async fn sign_in(State(state): State<AppState>, session: Session) -> Response {
    if has_live_session(&session).await {
        return Redirect::to(AFTER_SIGN_IN_PATH).into_response();
    }

    let callback = state.public_url(CALLBACK_PATH);
    match Url::parse_with_params(
        &state.settings.identity.sign_in_url,
        &[("redirect_url", callback.as_str())],
    ) {
        Ok(url) => Redirect::to(url.as_str()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Identity provider sign-in URL is invalid");
            sign_in_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Sign-in is unavailable right now. Please try again later.",
            )
        }
    }
}

async fn store_session(
    session: &Session,
    token: &str,
    claims: &JwtClaims,
) -> Result<(), tower_sessions::session::Error> {
    // New id on privilege change.
    session.cycle_id().await?;
    session.insert(SESSION_ACCESS_TOKEN, token).await?;
    session.insert(SESSION_USER_ID, &claims.sub).await?;
    session
        .insert(SESSION_EMAIL, claims.email.clone().unwrap_or_default())
        .await?;
    session.insert(SESSION_EXPIRES_AT, claims.exp).await?;
    Ok(())
}

pub async fn auth_callback(session: Session, Query(params): Query<CallbackParams>) -> Response {
    let Some(token) = params.token.filter(|t| !t.trim().is_empty()) else {
        return sign_in_error(
            StatusCode::BAD_REQUEST,
            "The sign-in link is missing its token. Please sign in again.",
        );
    };

    let claims = match decode_jwt_claims(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected sign-in token");
            return sign_in_error(
                StatusCode::BAD_REQUEST,
                "We couldn't read your sign-in token. Please sign in again.",
            );
        }
    };

    if claims.exp <= chrono::Utc::now().timestamp() {
        tracing::info!(user_id = %claims.sub, "Sign-in token already expired");
        return sign_in_error(
            StatusCode::BAD_REQUEST,
            "Your sign-in link has expired. Please sign in again.",
        );
    }

    if let Err(e) = store_session(&session, &token, &claims).await {
        tracing::error!(error = %e, "Failed to store session");
        return sign_in_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "We couldn't start your session. Please try again.",
        );
    }

    tracing::info!(user_id = %claims.sub, "User signed in");
    Redirect::to(AFTER_SIGN_IN_PATH).into_response()
}

pub async fn sign_out(session: Session) -> impl IntoResponse {
    let user_id: Option<String> = session.get(SESSION_USER_ID).await.unwrap_or(None);
    session.clear().await;
    if let Some(user_id) = user_id {
        tracing::info!(user_id = %user_id, "User signed out");
    }
    Redirect::to("/")
}
