use std::sync::Arc;

use progress_core::model::{NormalizedUser, PageCatalog, UserDocument};
use progress_core::summary::{aggregate, ProgressSummary};
use storage::repository::UserDocumentRepository;

use crate::error::ProgressServiceError;

/// Serves the admin views: the full user listing and per-user rollups.
#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserDocumentRepository>,
}

impl AdminService {
    #[must_use]
    pub fn new(users: Arc<dyn UserDocumentRepository>) -> Self {
        Self { users }
    }

    /// Every stored document in its normalized view, ordered by user id.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the scan fails.
    pub async fn list_users(&self) -> Result<Vec<NormalizedUser>, ProgressServiceError> {
        let documents = self.users.list_all().await?;
        Ok(documents
            .into_iter()
            .map(|raw| {
                let document = UserDocument::from_value(raw);
                let identity = document.identity().to_owned();
                document.normalized(&identity)
            })
            .collect())
    }

    /// The dashboard rollup for one already-normalized user.
    #[must_use]
    pub fn summarize(catalog: &PageCatalog, user: &NormalizedUser) -> ProgressSummary {
        aggregate(catalog, &user.pages_progress)
    }
}
