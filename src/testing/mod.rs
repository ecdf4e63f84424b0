//! Test doubles for the provider and store seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::database::DatabaseError;
use crate::identity::{IdentityError, IdentityResolver};
use crate::services::admin_registry::{AdminAllowList, AdminStore, AllowListSnapshot};

/// In-memory identity provider keyed by subject
#[derive(Debug, Clone, Default)]
pub struct FakeIdentity {
    accounts: HashMap<String, String>,
    unavailable: bool,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, subject: &str, email: &str) -> Self {
        self.accounts.insert(subject.to_string(), email.to_string());
        self
    }

    /// Every call fails as if the provider were unreachable
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

#[async_trait]
impl IdentityResolver for FakeIdentity {
    async fn resolve_email_by_subject(&self, subject: &str) -> Result<String, IdentityError> {
        if self.unavailable {
            return Err(IdentityError::Unavailable("connection refused".to_string()));
        }
        self.accounts
            .get(subject)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(subject.to_string()))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, IdentityError> {
        if self.unavailable {
            return Err(IdentityError::Unavailable("connection refused".to_string()));
        }
        Ok(self.accounts.values().any(|e| e == email))
    }
}

/// Store whose backend is always down
pub struct UnavailableAdminStore;

#[async_trait]
impl AdminStore for UnavailableAdminStore {
    async fn load(&self) -> Result<Option<AllowListSnapshot>, DatabaseError> {
        Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn save(&self, _list: &AdminAllowList, _expected_revision: Option<i64>) -> Result<i64, DatabaseError> {
        Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
    }
}

/// Store that lets a competing writer sneak in just before every update
pub struct RacingAdminStore {
    inner: Arc<dyn AdminStore>,
    intruder: String,
}

impl RacingAdminStore {
    pub fn new(inner: Arc<dyn AdminStore>, intruder: &str) -> Self {
        Self {
            inner,
            intruder: intruder.to_string(),
        }
    }
}

#[async_trait]
impl AdminStore for RacingAdminStore {
    async fn load(&self) -> Result<Option<AllowListSnapshot>, DatabaseError> {
        self.inner.load().await
    }

    async fn save(&self, list: &AdminAllowList, expected_revision: Option<i64>) -> Result<i64, DatabaseError> {
        if expected_revision.is_some() {
            if let Some(mut current) = self.inner.load().await? {
                current.list.grant(&self.intruder);
                self.inner.save(&current.list, Some(current.revision)).await?;
            }
        }
        self.inner.save(list, expected_revision).await
    }
}

/// Store that reports no allow-list on the first read, then lets another
/// writer create one before the caller's own create lands
pub struct LateCreatorAdminStore {
    inner: Arc<dyn AdminStore>,
    winner: AdminAllowList,
    raced: AtomicBool,
}

impl LateCreatorAdminStore {
    pub fn new(inner: Arc<dyn AdminStore>, winner: AdminAllowList) -> Self {
        Self {
            inner,
            winner,
            raced: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl AdminStore for LateCreatorAdminStore {
    async fn load(&self) -> Result<Option<AllowListSnapshot>, DatabaseError> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner.save(&self.winner, None).await?;
            return Ok(None);
        }
        self.inner.load().await
    }

    async fn save(&self, list: &AdminAllowList, expected_revision: Option<i64>) -> Result<i64, DatabaseError> {
        self.inner.save(list, expected_revision).await
    }
}
