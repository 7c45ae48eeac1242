use std::sync::Arc;

use progress_core::model::{NormalizedUser, UserDocument};
use progress_core::patch::apply_patch;
use serde_json::{Map, Value};
use storage::repository::UserDocumentRepository;

use crate::error::ProgressServiceError;

/// Orchestrates per-user progress reads and patches.
#[derive(Clone)]
pub struct ProgressService {
    users: Arc<dyn UserDocumentRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(users: Arc<dyn UserDocumentRepository>) -> Self {
        Self { users }
    }

    /// Fetch a user's document in its normalized view.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::NotFound` when no document is stored
    /// for the id, or `Storage` if the read fails.
    pub async fn fetch_user(&self, user_id: &str) -> Result<NormalizedUser, ProgressServiceError> {
        let raw = self
            .users
            .read(user_id)
            .await?
            .ok_or(ProgressServiceError::NotFound)?;
        let document = UserDocument::from_value(raw);
        Ok(document.normalized(user_id))
    }

    /// Apply a path-addressed update set to a user's document, creating it
    /// with identity defaults on first patch.
    ///
    /// Defaults are enforced both before and after the merge, so the
    /// persisted document always carries `id`, `userId`, and an object
    /// `pagesProgress` even when an update tried to clobber them.
    ///
    /// # Errors
    ///
    /// Returns `EmptyUpdateSet` when the update set has no entries, or
    /// `Storage` if the read or upsert fails.
    pub async fn patch_user(
        &self,
        user_id: &str,
        updates: &Map<String, Value>,
    ) -> Result<(), ProgressServiceError> {
        if updates.is_empty() {
            return Err(ProgressServiceError::EmptyUpdateSet);
        }

        let stored = self.users.read(user_id).await?.unwrap_or(Value::Null);
        let mut current = UserDocument::from_value(stored);
        current.ensure_defaults(user_id);

        let merged = apply_patch(&current.into_value(), updates);
        let mut next = UserDocument::from_value(merged);
        next.ensure_defaults(user_id);

        self.users.upsert(&next.into_value()).await?;
        Ok(())
    }
}
