#![forbid(unsafe_code)]

pub mod repository;
pub mod snapshot;
pub mod sqlite;

pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
pub use snapshot::{BRANDING_KEY, CATALOG_KEY, CatalogStore};
