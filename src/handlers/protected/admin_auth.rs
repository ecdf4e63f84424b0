// handlers/protected/admin_auth.rs - Admin allow-list endpoints for signed-in users

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::soft_failure_message;
use crate::middleware::AuthSubject;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminCheckResponse {
    pub is_admin: bool,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SetAdminRequest {
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminChangeResponse {
    pub success: bool,
    pub message: String,
}

impl AdminChangeResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// GET /admin-auth/check-admin - Is the caller an administrator?
///
/// Never fails once the subject token is accepted: any identity or storage
/// problem is answered with `{ "is_admin": false, "email": "" }`.
///
/// Expected Output:
/// ```json
/// { "is_admin": true, "email": "admin@couturefusion.com" }
/// ```
pub async fn check_admin(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthSubject>,
) -> Json<AdminCheckResponse> {
    match state.registry.check_admin(&caller.subject).await {
        Ok(status) => Json(AdminCheckResponse {
            is_admin: status.is_admin,
            email: status.email,
        }),
        Err(e) => {
            tracing::warn!("Error checking admin status: {}", e);
            Json(AdminCheckResponse {
                is_admin: false,
                email: String::new(),
            })
        }
    }
}

/// POST /admin-auth/set-admin - Grant or revoke admin status by email
///
/// Only current admins may call this. Refusals and failures are reported in
/// the body with `success: false`; the HTTP status stays 200.
///
/// Expected Input:
/// ```json
/// { "email": "tailor@example.com", "is_admin": true }
/// ```
///
/// Expected Output:
/// ```json
/// { "success": true, "message": "Admin privileges granted to tailor@example.com" }
/// ```
pub async fn set_admin(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthSubject>,
    payload: Result<Json<SetAdminRequest>, JsonRejection>,
) -> Result<Json<AdminChangeResponse>, ApiError> {
    let Json(request) = payload?;
    if request.email.trim().is_empty() {
        return Err(ApiError::field_error("email", "must not be blank"));
    }

    let response = match state
        .registry
        .set_admin(&caller.subject, &request.email, request.is_admin)
        .await
    {
        Ok(change) => AdminChangeResponse::ok(change.to_string()),
        Err(e) => AdminChangeResponse::failed(soft_failure_message("set_admin", &e)),
    };

    Ok(Json(response))
}
