// handlers/public/mod.rs - Public handlers (no subject token)
//
// The upload routes hand out nothing secret. The admin bootstrap route is
// unauthenticated in-process and relies on `bootstrap_gate_middleware` and
// the network in front of the service.

pub mod admin_bootstrap; // POST /admin-auth/register-firebase-admin
pub mod cloudinary;      // GET /cloudinary/status, POST /cloudinary/generate-signature

pub use admin_bootstrap::register_firebase_admin;
pub use cloudinary::{cloudinary_status, generate_signature};
