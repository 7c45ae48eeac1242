#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryRepository, Storage, StorageError, UserDocumentRepository};
pub use sqlite::{SqliteInitError, SqliteRepository};
