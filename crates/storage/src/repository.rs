use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for per-user progress documents.
///
/// Documents are stored in their raw JSON form so that fields written by
/// other clients round-trip unchanged. Concurrent writers to the same
/// user are last-writer-wins at the document level.
#[async_trait]
pub trait UserDocumentRepository: Send + Sync {
    /// Point-read a document by user id.
    ///
    /// Returns `Ok(None)` when no document is stored for the id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn read(&self, user_id: &str) -> Result<Option<Value>, StorageError>;

    /// Insert or fully replace a document. The storage key is taken from
    /// the document's `userId` field, falling back to `id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when the document carries
    /// neither identity field, or other storage errors on write failure.
    async fn upsert(&self, document: &Value) -> Result<(), StorageError>;

    /// Full scan of every stored document, ordered by user id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the scan fails.
    async fn list_all(&self) -> Result<Vec<Value>, StorageError>;
}

/// Resolve the identity a document is stored under.
pub(crate) fn document_identity(document: &Value) -> Result<String, StorageError> {
    let field = |key: &str| {
        document
            .get(key)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    };
    field("userId")
        .or_else(|| field("id"))
        .map(str::to_owned)
        .ok_or_else(|| StorageError::Serialization("document has no userId or id".into()))
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    documents: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDocumentRepository for InMemoryRepository {
    async fn read(&self, user_id: &str) -> Result<Option<Value>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user_id).cloned())
    }

    async fn upsert(&self, document: &Value) -> Result<(), StorageError> {
        let user_id = document_identity(document)?;
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user_id, document.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Value>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.values().cloned().collect())
    }
}

/// Aggregates the document repository behind a trait object for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserDocumentRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let users: Arc<dyn UserDocumentRepository> = Arc::new(InMemoryRepository::new());
        Self { users }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn round_trips_a_document() {
        let repo = InMemoryRepository::new();
        let document = json!({"id": "u1", "userId": "u1", "pagesProgress": {}});
        repo.upsert(&document).await.unwrap();

        let fetched = repo.read("u1").await.unwrap();
        assert_eq!(fetched, Some(document));
        assert_eq!(repo.read("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn upsert_replaces_the_whole_document() {
        let repo = InMemoryRepository::new();
        repo.upsert(&json!({"userId": "u1", "email": "old@example.com"}))
            .await
            .unwrap();
        repo.upsert(&json!({"userId": "u1", "pagesProgress": {"intro": {}}}))
            .await
            .unwrap();

        let fetched = repo.read("u1").await.unwrap().unwrap();
        assert_eq!(fetched.get("email"), None);
        assert!(fetched.get("pagesProgress").is_some());
    }

    #[tokio::test]
    async fn upsert_without_identity_is_rejected() {
        let repo = InMemoryRepository::new();
        let err = repo.upsert(&json!({"email": "x@example.com"})).await;
        assert!(matches!(err, Err(StorageError::Serialization(_))));
    }

    #[tokio::test]
    async fn list_all_is_ordered_by_user_id() {
        let repo = InMemoryRepository::new();
        repo.upsert(&json!({"userId": "b"})).await.unwrap();
        repo.upsert(&json!({"userId": "a"})).await.unwrap();
        repo.upsert(&json!({"id": "c"})).await.unwrap();

        let all = repo.list_all().await.unwrap();
        let ids: Vec<&str> = all
            .iter()
            .map(|doc| {
                doc.get("userId")
                    .or_else(|| doc.get("id"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
            })
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
