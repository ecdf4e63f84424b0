pub mod document;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

pub use document::{DatabaseError, DocumentStore, StoredDocument};
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

use crate::config::StorageConfig;

/// Open the configured store: Postgres when `DATABASE_URL` is set, otherwise in-memory.
pub async fn open_document_store(config: &StorageConfig) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
    match config.database_url {
        Some(_) => Ok(Arc::new(PgDocumentStore::connect(config).await?)),
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory document store (admin list will not survive restarts)");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
    }
}
