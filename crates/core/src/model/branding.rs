use std::fmt;

/// Reference to the portal logo: a URL or an inline data URL.
#[derive(Clone, PartialEq, Eq)]
pub struct BrandingImage(String);

impl BrandingImage {
    /// Returns `None` for blank references.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BrandingImage {
    // data URLs can be huge
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 48;
        match self.0.char_indices().nth(PREVIEW) {
            Some((cut, _)) => write!(f, "BrandingImage({}…)", &self.0[..cut]),
            None => write!(f, "BrandingImage({})", self.0),
        }
    }
}
