use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Row};
use tracing::info;

use super::document::{DatabaseError, DocumentStore, StoredDocument};
use crate::config::StorageConfig;

const CREATE_DOCUMENTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        key        TEXT PRIMARY KEY,
        value      JSONB NOT NULL,
        revision   BIGINT NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

/// Postgres-backed document store: one row per key in `documents`.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connect using `config.database_url` and make sure the table exists.
    pub async fn connect(config: &StorageConfig) -> Result<Self, DatabaseError> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        info!("Connected document store (max_connections={})", config.max_connections);
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_DOCUMENTS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get_json(&self, key: &str) -> Result<Option<StoredDocument>, DatabaseError> {
        let row = sqlx::query("SELECT value, revision FROM documents WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<StoredDocument, DatabaseError> {
            let Json(value): Json<Value> = row.try_get("value")?;
            let revision: i64 = row.try_get("revision")?;
            Ok(StoredDocument { value, revision })
        })
        .transpose()
    }

    async fn put_json(
        &self,
        key: &str,
        value: &Value,
        expected_revision: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        let written = match expected_revision {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO documents (key, value, revision)
                    VALUES ($1, $2, 1)
                    ON CONFLICT (key) DO NOTHING
                    RETURNING revision
                    "#,
                )
                .bind(key)
                .bind(Json(value))
                .fetch_optional(&self.pool)
                .await?
            }
            Some(expected) => {
                sqlx::query(
                    r#"
                    UPDATE documents
                    SET value = $2, revision = revision + 1, updated_at = now()
                    WHERE key = $1 AND revision = $3
                    RETURNING revision
                    "#,
                )
                .bind(key)
                .bind(Json(value))
                .bind(expected)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        match written {
            Some(row) => Ok(row.try_get("revision")?),
            None => Err(DatabaseError::Conflict(key.to_string())),
        }
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
