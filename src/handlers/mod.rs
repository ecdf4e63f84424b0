// handlers/mod.rs - Tiered handler layout
//
// Public (no subject token) → Protected (subject token required)
//
pub mod public;    // Tier 1: /cloudinary/*, /admin-auth/register-firebase-admin
pub mod protected; // Tier 2: /admin-auth/check-admin, /admin-auth/set-admin

use crate::services::RegistryError;

/// Client-facing message for a registry failure.
///
/// Authorization and not-found outcomes are reported as-is. Provider and storage
/// failures are logged here and replaced by a generic message so callers cannot
/// tell an outage apart from an ordinary refusal.
pub(crate) fn soft_failure_message(operation: &str, err: &RegistryError) -> String {
    match err {
        RegistryError::AuthorizationDenied | RegistryError::NotFound(_) => err.to_string(),
        _ if err.is_conflict() => {
            tracing::warn!("{} lost a concurrent update: {}", operation, err);
            "The admin list was modified concurrently, please retry".to_string()
        }
        _ => {
            tracing::error!("{} failed: {}", operation, err);
            "Unable to update admin privileges at this time".to_string()
        }
    }
}
