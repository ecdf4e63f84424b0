// handlers/protected/mod.rs - Protected handlers (subject token required)
//
// Every route here runs behind `subject_auth_middleware`, which rejects
// requests without a valid bearer token (401) and injects `AuthSubject`.

pub mod admin_auth; // GET /admin-auth/check-admin, POST /admin-auth/set-admin

pub use admin_auth::{check_admin, set_admin};
