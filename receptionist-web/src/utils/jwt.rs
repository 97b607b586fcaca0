use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Decode JWT claims without validation.
///
/// The token is issued by the identity provider and verified by the
/// receptionist API on every call; the dashboard only needs the subject and
/// expiry to manage its own session.
pub fn decode_jwt_claims(token: &str) -> Result<JwtClaims> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(anyhow::anyhow!("Invalid JWT format"));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| anyhow::anyhow!("Failed to decode JWT payload: {}", e))?;

    let claims: JwtClaims = serde_json::from_slice(&payload)
        .map_err(|e| anyhow::anyhow!("Failed to parse JWT claims: {}", e))?;

    if claims.sub.is_empty() {
        return Err(anyhow::anyhow!("JWT has an empty subject"));
    }

    Ok(claims)
}
