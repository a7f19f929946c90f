use std::path::{Path, PathBuf};

use lms_core::model::BrandingImage;

/// Global branding override read at startup.
pub const BRANDING_OVERRIDE_ENV: &str = "RAJARANI_LOGO_URL";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://lms.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    database_url: String,
    branding_override: Option<BrandingImage>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            branding_override: None,
        }
    }
}

impl PortalConfig {
    /// Defaults plus the branding override from the environment, if set.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_branding_override(
            std::env::var(BRANDING_OVERRIDE_ENV)
                .ok()
                .and_then(BrandingImage::new),
        )
    }

    #[must_use]
    pub fn with_database_url(mut self, raw: impl Into<String>) -> Self {
        self.database_url = normalize_sqlite_url(raw.into());
        self
    }

    #[must_use]
    pub fn with_branding_override(mut self, image: Option<BrandingImage>) -> Self {
        self.branding_override = image;
        self
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub fn branding_override(&self) -> Option<&BrandingImage> {
        self.branding_override.as_ref()
    }

    /// Filesystem path of the database, for file-backed URLs.
    #[must_use]
    pub fn database_path(&self) -> Option<PathBuf> {
        let rest = self.database_url.strip_prefix("sqlite://")?;
        if rest.is_empty() || rest.contains("mode=memory") {
            return None;
        }
        let path = rest.split('?').next().unwrap_or(rest);
        Some(PathBuf::from(path))
    }
}

/// Turn `--db`-style input into a URL sqlx accepts.
///
/// In-memory and `sqlite://` URLs pass through; bare or `sqlite:` paths are
/// resolved against the working directory.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:"
        || trimmed.starts_with("sqlite://")
        || trimmed.starts_with("sqlite:file:")
    {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}
