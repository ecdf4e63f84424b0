// handlers/public/cloudinary.rs - Signed upload credentials

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::AppState;
use crate::services::UploadSignatureGrant;

#[derive(Debug, Deserialize)]
pub struct GenerateSignatureRequest {
    /// Target folder, e.g. `designs` or `profiles`
    pub folder: String,
    #[serde(default)]
    pub public_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CloudinaryStatusResponse {
    pub status: String,
    pub message: String,
}

/// GET /cloudinary/status - Check the configured upload provider credentials
///
/// Always 200; a failed probe is reported as `status: "error"`.
pub async fn cloudinary_status(State(state): State<AppState>) -> Json<CloudinaryStatusResponse> {
    match state.upload_provider.ping().await {
        Ok(()) => Json(CloudinaryStatusResponse {
            status: "success".to_string(),
            message: "Connected to Cloudinary".to_string(),
        }),
        Err(e) => {
            tracing::warn!("Cloudinary status check failed: {}", e);
            Json(CloudinaryStatusResponse {
                status: "error".to_string(),
                message: format!("Cloudinary connection error: {}", e),
            })
        }
    }
}

/// POST /cloudinary/generate-signature - Sign a direct client upload
///
/// Expected Input:
/// ```json
/// { "folder": "designs", "public_id": "optional-id" }
/// ```
///
/// Expected Output:
/// ```json
/// {
///   "signature": "97b7e412...",
///   "timestamp": 1700000000,
///   "cloud_name": "couture",
///   "api_key": "123456789",
///   "folder": "designs",
///   "public_id": null
/// }
/// ```
pub async fn generate_signature(
    State(state): State<AppState>,
    payload: Result<Json<GenerateSignatureRequest>, JsonRejection>,
) -> Result<Json<UploadSignatureGrant>, ApiError> {
    let Json(request) = payload?;
    if request.folder.trim().is_empty() {
        return Err(ApiError::field_error("folder", "must not be blank"));
    }

    let grant = state
        .signer
        .issue_signature(&request.folder, request.public_id.as_deref())
        .map_err(|e| {
            tracing::error!("Upload signature failed: {}", e);
            ApiError::internal_server_error("Unable to sign upload")
        })?;

    Ok(Json(grant))
}
