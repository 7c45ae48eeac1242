use chrono::Utc;
use serde_json::Value;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{document_identity, StorageError, UserDocumentRepository};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait::async_trait]
impl UserDocumentRepository for SqliteRepository {
    async fn read(&self, user_id: &str) -> Result<Option<Value>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT document FROM user_documents WHERE user_id = ?1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        match row {
            Some(row) => {
                let raw: String = row.try_get("document").map_err(conn)?;
                Ok(Some(serde_json::from_str(&raw).map_err(ser)?))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, document: &Value) -> Result<(), StorageError> {
        let user_id = document_identity(document)?;
        let raw = serde_json::to_string(document).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO user_documents (user_id, document, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(raw)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Value>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT document FROM user_documents ORDER BY user_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.try_get("document").map_err(conn)?;
            documents.push(serde_json::from_str(&raw).map_err(ser)?);
        }
        Ok(documents)
    }
}
