use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, Claims};
use crate::config::AuthConfig;
use crate::error::ApiError;

/// Authenticated caller extracted from the subject token
#[derive(Clone, Debug)]
pub struct AuthSubject {
    /// Opaque identity-provider account id
    pub subject: String,
}

impl From<Claims> for AuthSubject {
    fn from(claims: Claims) -> Self {
        Self { subject: claims.sub }
    }
}

/// Subject-token middleware that validates the bearer token and injects `AuthSubject`
pub async fn subject_auth_middleware(
    State(config): State<Arc<AuthConfig>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = auth::validate_token(&config, &token).map_err(|e| {
        tracing::debug!("Rejected subject token: {}", e);
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(AuthSubject::from(claims));

    Ok(next.run(request).await)
}

/// Extract bearer token from Authorization header
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty subject token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
