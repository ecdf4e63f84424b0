use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::document::{DatabaseError, DocumentStore, StoredDocument};

/// Process-local document store used when no `DATABASE_URL` is configured.
/// Contents are lost on restart.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_json(&self, key: &str) -> Result<Option<StoredDocument>, DatabaseError> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn put_json(
        &self,
        key: &str,
        value: &Value,
        expected_revision: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        let mut documents = self.documents.write().await;
        let current = documents.get(key).map(|doc| doc.revision);

        if current != expected_revision {
            return Err(DatabaseError::Conflict(key.to_string()));
        }

        let revision = current.unwrap_or(0) + 1;
        documents.insert(
            key.to_string(),
            StoredDocument {
                value: value.clone(),
                revision,
            },
        );
        Ok(revision)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
