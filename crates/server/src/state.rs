use std::sync::Arc;

use progress_core::model::PageCatalog;
use services::{AdminService, ProgressService};

use crate::config::CorsConfig;

/// Shared per-request state: the services, the loaded catalog, and the
/// CORS configuration.
#[derive(Clone)]
pub struct AppState {
    pub progress: ProgressService,
    pub admin: AdminService,
    pub catalog: Arc<PageCatalog>,
    pub cors: Arc<CorsConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(
        storage: &storage::repository::Storage,
        catalog: PageCatalog,
        cors: CorsConfig,
    ) -> Self {
        Self {
            progress: ProgressService::new(Arc::clone(&storage.users)),
            admin: AdminService::new(Arc::clone(&storage.users)),
            catalog: Arc::new(catalog),
            cors: Arc::new(cors),
        }
    }
}
