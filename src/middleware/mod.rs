pub mod auth;
pub mod automation;

pub use auth::{subject_auth_middleware, AuthSubject};
pub use automation::{bootstrap_gate_middleware, BootstrapGate, AUTOMATION_TOKEN_HEADER};
