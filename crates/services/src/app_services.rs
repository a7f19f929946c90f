use std::path::Path;
use std::sync::Arc;

use lms_core::model::{BrandingImage, Catalog};
use storage::repository::{KeyValueStore, Storage};
use storage::snapshot::CatalogStore;

use crate::Clock;
use crate::config::PortalConfig;
use crate::error::AppServicesError;
use crate::portal_service::PortalService;

/// Assembles the portal service from configuration and persisted state.
pub struct AppServices {
    portal: PortalService,
    seeded_on_launch: bool,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database file or connection cannot be set up.
    pub async fn bootstrap(config: &PortalConfig, clock: Clock) -> Result<Self, AppServicesError> {
        if let Some(path) = config.database_path() {
            prepare_sqlite_file(&path)?;
        }
        let storage = Storage::sqlite(config.database_url()).await?;
        Ok(Self::assemble(storage.entries, config.branding_override().cloned(), clock).await)
    }

    /// Build services over a throwaway in-memory store.
    pub async fn in_memory(clock: Clock) -> Self {
        Self::assemble(Storage::in_memory().entries, None, clock).await
    }

    /// Wire services over an existing store.
    pub async fn assemble(
        entries: Arc<dyn KeyValueStore>,
        branding_override: Option<BrandingImage>,
        clock: Clock,
    ) -> Self {
        let store = CatalogStore::new(entries);
        let (catalog, seeded_on_launch) = match store.load().await {
            Some(catalog) => (catalog, false),
            None => {
                let catalog = Catalog::seeded();
                store.save(&catalog).await;
                (catalog, true)
            }
        };

        let branding = match branding_override {
            Some(image) => Some(image),
            None => store.load_branding().await,
        };
        tracing::info!(
            modules = catalog.len(),
            seeded = seeded_on_launch,
            branded = branding.is_some(),
            "portal ready"
        );

        Self {
            portal: PortalService::new(clock, store, catalog, branding),
            seeded_on_launch,
        }
    }

    /// True when no snapshot existed and the default modules were written.
    #[must_use]
    pub fn seeded_on_launch(&self) -> bool {
        self.seeded_on_launch
    }

    #[must_use]
    pub fn portal(&self) -> &PortalService {
        &self.portal
    }

    #[must_use]
    pub fn into_portal(self) -> PortalService {
        self.portal
    }
}

fn prepare_sqlite_file(path: &Path) -> Result<(), AppServicesError> {
    let to_err = |source| AppServicesError::DatabaseFile {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(to_err)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(to_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::time::fixed_clock;
    use storage::InMemoryStore;

    #[tokio::test]
    async fn first_launch_seeds_and_persists() {
        let raw = InMemoryStore::new();
        let services = AppServices::assemble(Arc::new(raw.clone()), None, fixed_clock()).await;
        assert!(services.seeded_on_launch());
        assert_eq!(services.portal().catalog().len(), 6);

        let again = AppServices::assemble(Arc::new(raw), None, fixed_clock()).await;
        assert!(!again.seeded_on_launch());
        assert_eq!(again.portal().catalog(), services.portal().catalog());
    }

    #[tokio::test]
    async fn branding_override_beats_persisted_value() {
        let raw = InMemoryStore::new();
        let store = CatalogStore::new(Arc::new(raw.clone()));
        store
            .save_branding(&BrandingImage::new("stored.png").unwrap())
            .await;

        let persisted = AppServices::assemble(Arc::new(raw.clone()), None, fixed_clock()).await;
        assert_eq!(persisted.portal().branding().unwrap().as_str(), "stored.png");

        let overridden = AppServices::assemble(
            Arc::new(raw),
            BrandingImage::new("https://cdn/global.png"),
            fixed_clock(),
        )
        .await;
        assert_eq!(
            overridden.portal().branding().unwrap().as_str(),
            "https://cdn/global.png"
        );
    }

    #[test]
    fn prepare_sqlite_file_creates_parents() {
        let dir = std::env::temp_dir().join(format!("lms-prepare-{}", std::process::id()));
        let path = dir.join("nested").join("lms.sqlite3");
        prepare_sqlite_file(&path).unwrap();
        assert!(path.exists());
        prepare_sqlite_file(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
