#![forbid(unsafe_code)]

pub mod admin_service;
pub mod catalog;
pub mod error;
pub mod progress_service;

pub use admin_service::AdminService;
pub use catalog::{load_catalog, parse_catalog};
pub use error::{CatalogError, ProgressServiceError};
pub use progress_service::ProgressService;
