// handlers/public/admin_bootstrap.rs - Out-of-band admin provisioning

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::protected::admin_auth::AdminChangeResponse;
use crate::handlers::soft_failure_message;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterFirebaseAdminRequest {
    pub email: String,
}

/// POST /admin-auth/register-firebase-admin - Promote an existing account to admin
///
/// Intended for account-provisioning automation. The email must belong to an
/// existing identity; otherwise `success` is false with a not-found message.
///
/// Expected Input:
/// ```json
/// { "email": "owner@example.com" }
/// ```
pub async fn register_firebase_admin(
    State(state): State<AppState>,
    payload: Result<Json<RegisterFirebaseAdminRequest>, JsonRejection>,
) -> Result<Json<AdminChangeResponse>, ApiError> {
    let Json(request) = payload?;
    if request.email.trim().is_empty() {
        return Err(ApiError::field_error("email", "must not be blank"));
    }

    let response = match state.registry.register_external_admin(&request.email).await {
        Ok(change) => AdminChangeResponse::ok(change.to_string()),
        Err(e) => AdminChangeResponse::failed(soft_failure_message("register_firebase_admin", &e)),
    };

    Ok(Json(response))
}
