//! Best-effort persistence of the catalog and branding entries.
//!
//! The snapshot is a convenience cache, not a system of record: read failures
//! look exactly like an empty store and write failures are dropped after
//! logging.

use std::sync::Arc;

use lms_core::model::{BrandingImage, Catalog};

use crate::repository::{KeyValueStore, StorageError};

/// Key holding the serialized module array.
pub const CATALOG_KEY: &str = "rrc_lms_modules_v2";

/// Key holding the branding image reference.
pub const BRANDING_KEY: &str = "rrc_logo_data_url";

/// Encode a catalog to its stored JSON form.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_catalog(catalog: &Catalog) -> Result<String, StorageError> {
    serde_json::to_string(catalog).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decode a stored catalog and repair any viewed/completion drift.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed input.
pub fn decode_catalog(raw: &str) -> Result<Catalog, StorageError> {
    let catalog: Catalog =
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let (catalog, repaired) = catalog.sanitized();
    if repaired {
        tracing::warn!(key = CATALOG_KEY, "repaired inconsistent catalog snapshot");
    }
    Ok(catalog)
}

#[derive(Clone)]
pub struct CatalogStore {
    entries: Arc<dyn KeyValueStore>,
}

impl CatalogStore {
    #[must_use]
    pub fn new(entries: Arc<dyn KeyValueStore>) -> Self {
        Self { entries }
    }

    /// The persisted catalog, or `None` if it is missing, unreadable or malformed.
    pub async fn load(&self) -> Option<Catalog> {
        let raw = match self.entries.get(CATALOG_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key = CATALOG_KEY, error = %err, "catalog read failed");
                return None;
            }
        };
        match decode_catalog(&raw) {
            Ok(catalog) => Some(catalog),
            Err(err) => {
                tracing::warn!(key = CATALOG_KEY, error = %err, "ignoring malformed catalog snapshot");
                None
            }
        }
    }

    /// Write the full catalog. Failures are logged and otherwise ignored.
    pub async fn save(&self, catalog: &Catalog) {
        let raw = match encode_catalog(catalog) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key = CATALOG_KEY, error = %err, "catalog encode failed");
                return;
            }
        };
        if let Err(err) = self.entries.set(CATALOG_KEY, &raw).await {
            tracing::warn!(key = CATALOG_KEY, error = %err, "catalog write failed");
            return;
        }
        tracing::debug!(modules = catalog.len(), "catalog snapshot saved");
    }

    pub async fn load_branding(&self) -> Option<BrandingImage> {
        match self.entries.get(BRANDING_KEY).await {
            Ok(raw) => raw.and_then(BrandingImage::new),
            Err(err) => {
                tracing::warn!(key = BRANDING_KEY, error = %err, "branding read failed");
                None
            }
        }
    }

    pub async fn save_branding(&self, image: &BrandingImage) {
        if let Err(err) = self.entries.set(BRANDING_KEY, image.as_str()).await {
            tracing::warn!(key = BRANDING_KEY, error = %err, "branding write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use async_trait::async_trait;
    use lms_core::model::{ContentDraft, ContentId, ContentKind, ModuleId, ResourceHandle};

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("disk on fire".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("quota exceeded".into()))
        }
    }

    fn store() -> (CatalogStore, InMemoryStore) {
        let raw = InMemoryStore::new();
        (CatalogStore::new(Arc::new(raw.clone())), raw)
    }

    #[tokio::test]
    async fn load_is_none_when_nothing_saved() {
        let (store, _) = store();
        assert!(store.load().await.is_none());
        assert!(store.load_branding().await.is_none());
    }

    #[tokio::test]
    async fn catalog_round_trips_structurally() {
        let (store, _) = store();
        let catalog = Catalog::seeded()
            .attach_quiz(ModuleId::new(1), "Etiquette quiz", Some(4))
            .unwrap()
            .catalog
            .mark_viewed(ModuleId::new(1), ContentId::new(11))
            .unwrap()
            .catalog
            .mark_viewed(ModuleId::new(4), ContentId::new(41))
            .unwrap()
            .catalog;

        store.save(&catalog).await;
        assert_eq!(store.load().await, Some(catalog));
    }

    #[tokio::test]
    async fn malformed_snapshot_reads_as_absent() {
        let (store, raw) = store();
        raw.set(CATALOG_KEY, "{ not json").await.unwrap();
        assert!(store.load().await.is_none());

        raw.set(CATALOG_KEY, r#"[{"id": "one"}]"#).await.unwrap();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn loads_snapshot_written_by_the_web_portal() {
        let (store, raw) = store();
        let legacy = r#"[
            {"id":1,"title":"Call Flow","info":"notes","contents":[
                {"id":31,"type":"pdf","name":"Call Script L1.pdf","dataUrl":"blob:https://x/1"},
                {"id":32,"type":"video","name":"Example.mp4","duration":8}
            ],"viewed":[31,31,99],"quiz":{"id":5,"title":"Q1","questions":3},"done":false},
            {"id":2,"title":"Empty","info":"","contents":[],"viewed":[],"done":true}
        ]"#;
        raw.set(CATALOG_KEY, legacy).await.unwrap();

        let catalog = store.load().await.unwrap();
        let first = catalog.module(ModuleId::new(1)).unwrap();
        assert_eq!(first.viewed(), &[ContentId::new(31)]);
        assert_eq!(first.quiz().unwrap().question_count(), 3);
        assert!(first.contents()[0].handle().is_none());
        assert!(!catalog.module(ModuleId::new(2)).unwrap().is_completed());
    }

    #[tokio::test]
    async fn handles_do_not_survive_a_reload() {
        let (store, _) = store();
        let catalog = Catalog::seeded()
            .add_content(
                ModuleId::new(1),
                ContentDraft::new(ContentKind::Video, "Upload.mp4")
                    .with_handle(ResourceHandle::new("blob:local/9")),
            )
            .unwrap()
            .catalog;
        store.save(&catalog).await;

        let restored = store.load().await.unwrap();
        let item = restored.module(ModuleId::new(1)).unwrap().contents().last().unwrap();
        assert_eq!(item.name(), "Upload.mp4");
        assert!(item.handle().is_none());
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let store = CatalogStore::new(Arc::new(BrokenStore));
        store.save(&Catalog::seeded()).await;
        assert!(store.load().await.is_none());
        store.save_branding(&BrandingImage::new("logo.png").unwrap()).await;
        assert!(store.load_branding().await.is_none());
    }

    #[tokio::test]
    async fn branding_round_trips() {
        let (store, _) = store();
        let image = BrandingImage::new("data:image/png;base64,AAAA").unwrap();
        store.save_branding(&image).await;
        assert_eq!(store.load_branding().await, Some(image));
    }
}
