use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

/// Claims carried by a subject token. `sub` is the identity provider's
/// opaque account id; the email is never trusted from the token itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    pub fn new(config: &AuthConfig, sub: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: sub.into(),
            exp,
            iat: now.timestamp(),
            iss: config.jwt_issuer.clone(),
            aud: config.jwt_audience.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Subject token secret is not configured")]
    NotConfigured,
    #[error("Invalid subject token: {0}")]
    InvalidToken(String),
    #[error("Subject token has no subject")]
    MissingSubject,
    #[error("Token generation error: {0}")]
    TokenGeneration(String),
}

/// Sign a subject token with the configured HS256 secret.
pub fn generate_token(config: &AuthConfig, claims: &Claims) -> Result<String, AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::NotConfigured);
    }

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Validate a subject token and return its claims.
pub fn validate_token(config: &AuthConfig, token: &str) -> Result<Claims, AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::NotConfigured);
    }

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    if let Some(issuer) = &config.jwt_issuer {
        validation.set_issuer(&[issuer]);
    }
    match &config.jwt_audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    let claims = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?
        .claims;

    if claims.sub.trim().is_empty() {
        return Err(AuthError::MissingSubject);
    }

    Ok(claims)
}
