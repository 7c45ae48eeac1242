#![forbid(unsafe_code)]

mod config;
mod cors;
mod dashboard;
mod error;
mod handlers;
mod state;

use std::path::Path;

use progress_core::model::PageCatalog;
use storage::repository::Storage;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let storage = Storage::sqlite(&config.database_url).await?;

    let catalog = match &config.catalog_path {
        Some(path) => {
            let catalog = services::load_catalog(Path::new(path))?;
            info!(pages = catalog.len(), "loaded page catalog from {path}");
            catalog
        }
        None => {
            warn!("PROGRESS_CATALOG_PATH is not set; serving an empty page catalog");
            PageCatalog::default()
        }
    };

    let state = AppState::new(&storage, catalog, config.cors.clone());
    let router = handlers::build_router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}
