//! Identity provider seam.
//!
//! The provider owns accounts; this service only asks it two questions:
//! which email belongs to an authenticated subject, and whether an email
//! belongs to any account at all.

use async_trait::async_trait;
use thiserror::Error;

pub mod toolkit;

pub use toolkit::IdentityToolkitClient;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity not found: {0}")]
    NotFound(String),
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
    #[error("Identity provider misconfigured: {0}")]
    Misconfigured(String),
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve an authenticated subject to its verified email address.
    ///
    /// Fails with `NotFound` when the subject has no account or the account
    /// carries no email.
    async fn resolve_email_by_subject(&self, subject: &str) -> Result<String, IdentityError>;

    /// Whether an account with exactly this email exists.
    async fn email_exists(&self, email: &str) -> Result<bool, IdentityError>;
}
