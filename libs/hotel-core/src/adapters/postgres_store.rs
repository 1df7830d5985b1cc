use crate::{CoreError, Document, DocumentStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

// Row shape of the `documents` table
#[derive(sqlx::FromRow, Debug)]
struct DocumentRow {
    id: String,
    data: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            fields: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn infrastructure(err: sqlx::Error) -> CoreError {
    CoreError::Infrastructure(Box::new(err))
}

/// PostgreSQL implementation of the DocumentStore port using sqlx.
/// Every collection lives in one JSONB `documents` table.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), CoreError> {
        info!("Applying document store migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CoreError::Infrastructure(Box::new(e)))?;
        info!("Document store migrations applied.");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, CoreError> {
        let row: Option<DocumentRow> = sqlx::query_as(
            "SELECT id, data, created_at, updated_at FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(row.map(Document::from))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, CoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT id, data, created_at, updated_at FROM documents WHERE collection = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn list_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, CoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            r#"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND data @> $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(collection)
        // Containment so the GIN index on data applies
        .bind(Json(json!({ field: value })))
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn create(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<String, CoreError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO documents (collection, id, data, created_at, updated_at) VALUES ($1, $2, $3, NOW(), NOW())",
        )
        .bind(collection)
        .bind(&id)
        .bind(Json(&fields))
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), CoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&fields))
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<(), CoreError> {
        // jsonb || jsonb is a shallow merge, matching the in-memory adapter
        let result = sqlx::query(
            "UPDATE documents SET data = data || $3, updated_at = NOW() WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&patch))
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("{collection}/{id}")));
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), CoreError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }
}
