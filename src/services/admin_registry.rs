use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::database::{DatabaseError, DocumentStore};
use crate::identity::{IdentityError, IdentityResolver};

/// Document key of the persisted allow-list
pub const ADMIN_EMAILS_KEY: &str = "admin_emails";

/// The set of administrator emails. Matching is exact and case-sensitive;
/// order is kept as inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAllowList {
    pub emails: Vec<String>,
}

impl AdminAllowList {
    pub fn seeded(email: &str) -> Self {
        Self {
            emails: vec![email.to_string()],
        }
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.iter().any(|e| e == email)
    }

    /// Returns false when the email was already present.
    pub fn grant(&mut self, email: &str) -> bool {
        if self.contains(email) {
            return false;
        }
        self.emails.push(email.to_string());
        true
    }

    /// Returns false when the email was not present.
    pub fn revoke(&mut self, email: &str) -> bool {
        let before = self.emails.len();
        self.emails.retain(|e| e != email);
        self.emails.len() != before
    }

    /// Drop repeated entries, keeping the first occurrence.
    fn dedup(mut self) -> Self {
        let mut seen = std::collections::HashSet::new();
        self.emails.retain(|e| seen.insert(e.clone()));
        self
    }
}

/// An allow-list together with the store revision it was read at
#[derive(Debug, Clone)]
pub struct AllowListSnapshot {
    pub list: AdminAllowList,
    pub revision: i64,
}

/// Persistence seam for the allow-list
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// `Ok(None)` when no allow-list has ever been written.
    async fn load(&self) -> Result<Option<AllowListSnapshot>, DatabaseError>;

    /// Write the full list. `None` creates it; `Some(r)` replaces revision `r`.
    async fn save(&self, list: &AdminAllowList, expected_revision: Option<i64>) -> Result<i64, DatabaseError>;
}

/// `AdminStore` over a single record of a `DocumentStore`
pub struct DocumentAdminStore {
    documents: Arc<dyn DocumentStore>,
    key: String,
}

impl DocumentAdminStore {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            documents,
            key: ADMIN_EMAILS_KEY.to_string(),
        }
    }
}

#[async_trait]
impl AdminStore for DocumentAdminStore {
    async fn load(&self) -> Result<Option<AllowListSnapshot>, DatabaseError> {
        let Some(document) = self.documents.get_json(&self.key).await? else {
            return Ok(None);
        };

        let list: AdminAllowList = serde_json::from_value(document.value).map_err(|e| DatabaseError::Malformed {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;

        Ok(Some(AllowListSnapshot {
            list: list.dedup(),
            revision: document.revision,
        }))
    }

    async fn save(&self, list: &AdminAllowList, expected_revision: Option<i64>) -> Result<i64, DatabaseError> {
        let value = serde_json::to_value(list).map_err(|e| DatabaseError::Malformed {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;
        self.documents.put_json(&self.key, &value, expected_revision).await
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Permission denied: only admins can set admin privileges")]
    AuthorizationDenied,

    #[error("User with email {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

impl RegistryError {
    /// A conditional write lost a race with another writer
    pub fn is_conflict(&self) -> bool {
        matches!(self, RegistryError::Storage(DatabaseError::Conflict(_)))
    }
}

/// Admin membership of a resolved caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminStatus {
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    Granted,
    Revoked,
    /// Membership already matched the request
    Unchanged { is_admin: bool },
    /// Bootstrap registration of an email that is already an admin
    AlreadyRegistered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminChange {
    pub email: String,
    pub outcome: ChangeOutcome,
}

impl fmt::Display for AdminChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            ChangeOutcome::Granted => write!(f, "Admin privileges granted to {}", self.email),
            ChangeOutcome::Revoked => write!(f, "Admin privileges revoked from {}", self.email),
            ChangeOutcome::Unchanged { is_admin } => {
                let status = if is_admin { "admin" } else { "non-admin" };
                write!(f, "User {} already has {} status", self.email, status)
            }
            ChangeOutcome::AlreadyRegistered => write!(f, "User {} is already an admin", self.email),
        }
    }
}

/// Owner of the administrator allow-list.
///
/// Every mutation is a read-modify-write of the whole list, conditioned on the
/// revision that was read. A concurrent writer makes the later write fail with
/// a conflict instead of silently dropping the earlier update.
pub struct AdminRegistry {
    identity: Arc<dyn IdentityResolver>,
    store: Arc<dyn AdminStore>,
    bootstrap_email: String,
}

impl AdminRegistry {
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        store: Arc<dyn AdminStore>,
        bootstrap_email: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            store,
            bootstrap_email: bootstrap_email.into(),
        }
    }

    /// Resolve `subject` and report whether its email is on the allow-list.
    pub async fn check_admin(&self, subject: &str) -> Result<AdminStatus, RegistryError> {
        let (status, _) = self.check_with_snapshot(subject).await?;
        Ok(status)
    }

    /// Grant or revoke admin status for `target_email`. Only a current admin
    /// may call this, including for their own email.
    pub async fn set_admin(
        &self,
        requestor: &str,
        target_email: &str,
        desired_is_admin: bool,
    ) -> Result<AdminChange, RegistryError> {
        let (requestor_status, mut snapshot) = match self.check_with_snapshot(requestor).await {
            Ok(checked) => checked,
            Err(RegistryError::Identity(IdentityError::NotFound(_))) => {
                warn!("set_admin refused: requestor subject could not be resolved");
                return Err(RegistryError::AuthorizationDenied);
            }
            Err(e) => return Err(e),
        };

        if !requestor_status.is_admin {
            warn!(
                requestor = %requestor_status.email,
                target = %target_email,
                "set_admin refused: requestor is not an admin"
            );
            return Err(RegistryError::AuthorizationDenied);
        }

        let changed = if desired_is_admin {
            snapshot.list.grant(target_email)
        } else {
            snapshot.list.revoke(target_email)
        };

        if !changed {
            return Ok(AdminChange {
                email: target_email.to_string(),
                outcome: ChangeOutcome::Unchanged {
                    is_admin: desired_is_admin,
                },
            });
        }

        self.store.save(&snapshot.list, Some(snapshot.revision)).await?;

        let outcome = if desired_is_admin {
            ChangeOutcome::Granted
        } else {
            ChangeOutcome::Revoked
        };
        info!(
            requestor = %requestor_status.email,
            target = %target_email,
            ?outcome,
            "admin allow-list updated"
        );

        Ok(AdminChange {
            email: target_email.to_string(),
            outcome,
        })
    }

    /// Grant admin status to an existing identity without any caller check.
    /// Callers must be restricted outside this type.
    pub async fn register_external_admin(&self, target_email: &str) -> Result<AdminChange, RegistryError> {
        if !self.identity.email_exists(target_email).await? {
            return Err(RegistryError::NotFound(target_email.to_string()));
        }

        let mut snapshot = self.load_or_bootstrap().await?;
        if !snapshot.list.grant(target_email) {
            return Ok(AdminChange {
                email: target_email.to_string(),
                outcome: ChangeOutcome::AlreadyRegistered,
            });
        }

        self.store.save(&snapshot.list, Some(snapshot.revision)).await?;
        info!(target = %target_email, "admin registered through bootstrap path");

        Ok(AdminChange {
            email: target_email.to_string(),
            outcome: ChangeOutcome::Granted,
        })
    }

    /// Current allow-list, bootstrapping it when absent.
    pub async fn list_admins(&self) -> Result<AdminAllowList, RegistryError> {
        Ok(self.load_or_bootstrap().await?.list)
    }

    async fn check_with_snapshot(&self, subject: &str) -> Result<(AdminStatus, AllowListSnapshot), RegistryError> {
        let email = self.identity.resolve_email_by_subject(subject).await?;
        let snapshot = self.load_or_bootstrap().await?;
        let is_admin = snapshot.list.contains(&email);
        Ok((AdminStatus { email, is_admin }, snapshot))
    }

    async fn load_or_bootstrap(&self) -> Result<AllowListSnapshot, RegistryError> {
        if let Some(snapshot) = self.store.load().await? {
            return Ok(snapshot);
        }

        let list = AdminAllowList::seeded(&self.bootstrap_email);
        match self.store.save(&list, None).await {
            Ok(revision) => {
                info!(bootstrap = %self.bootstrap_email, "created admin allow-list");
                Ok(AllowListSnapshot { list, revision })
            }
            // Another request created it first; use theirs.
            Err(DatabaseError::Conflict(key)) => self
                .store
                .load()
                .await?
                .ok_or(RegistryError::Storage(DatabaseError::Conflict(key))),
            Err(e) => Err(e.into()),
        }
    }
}
