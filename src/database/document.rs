use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from a document store backend
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    /// The conditional write lost against another writer; nothing was stored
    #[error("Document '{0}' was modified concurrently")]
    Conflict(String),

    #[error("Stored document '{key}' is malformed: {reason}")]
    Malformed { key: String, reason: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A JSON document together with the revision it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub value: Value,
    pub revision: i64,
}

/// Flat key-value store of JSON documents.
///
/// Writes are conditional: `expected_revision = None` creates a document that
/// must not exist yet, `Some(r)` replaces one currently at revision `r`. Any
/// mismatch returns `DatabaseError::Conflict` without writing.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_json(&self, key: &str) -> Result<Option<StoredDocument>, DatabaseError>;

    /// Returns the new revision on success.
    async fn put_json(
        &self,
        key: &str,
        value: &Value,
        expected_revision: Option<i64>,
    ) -> Result<i64, DatabaseError>;

    /// Cheap reachability probe used by `/health`.
    async fn health_check(&self) -> Result<(), DatabaseError>;
}
