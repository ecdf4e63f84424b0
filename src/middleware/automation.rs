use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use constant_time_eq::constant_time_eq;

use crate::config::AdminConfig;
use crate::error::ApiError;

pub const AUTOMATION_TOKEN_HEADER: &str = "x-automation-token";

/// Deployment-level switch and optional credential for the admin bootstrap route.
///
/// The registry itself performs no caller check on that path; whatever protection
/// exists is applied here or by the network in front of the service.
#[derive(Clone, Debug)]
pub struct BootstrapGate {
    pub enabled: bool,
    pub token: Option<String>,
}

impl From<&AdminConfig> for BootstrapGate {
    fn from(config: &AdminConfig) -> Self {
        Self {
            enabled: config.bootstrap_enabled,
            token: config.bootstrap_token.clone(),
        }
    }
}

impl BootstrapGate {
    fn check(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        if !self.enabled {
            return Err(ApiError::not_found("Admin bootstrap is disabled on this deployment"));
        }

        let Some(expected) = &self.token else {
            return Ok(());
        };

        let presented = headers
            .get(AUTOMATION_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing automation token"))?;

        if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(ApiError::unauthorized("Invalid automation token"))
        }
    }
}

pub async fn bootstrap_gate_middleware(
    State(gate): State<Arc<BootstrapGate>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    gate.check(&headers).map_err(|e| {
        tracing::warn!("Admin bootstrap call refused: {}", e);
        e
    })?;

    Ok(next.run(request).await)
}
