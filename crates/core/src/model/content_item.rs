use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::ContentId;

/// Playback length assumed for uploaded videos until the media reports its own.
pub const DEFAULT_VIDEO_DURATION_SECS: u32 = 8;

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    #[serde(rename = "pdf")]
    Document,
    #[serde(rename = "video")]
    Video,
}

impl ContentKind {
    /// Display name used when the picked file carries none.
    #[must_use]
    pub fn fallback_name(self) -> &'static str {
        match self {
            ContentKind::Document => "Document.pdf",
            ContentKind::Video => "Video.mp4",
        }
    }
}

//
// ─── RESOURCE HANDLE ───────────────────────────────────────────────────────────
//

/// Opaque reference to the bytes of a file picked during this session.
///
/// Handles are only valid for the lifetime of the process that created them.
/// They are never written to the persisted snapshot, so content restored from
/// storage always comes back without one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle(String);

impl ResourceHandle {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceHandle({})", self.0)
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for a new content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDraft {
    pub kind: ContentKind,
    pub name: String,
    pub handle: Option<ResourceHandle>,
    pub duration_secs: Option<u32>,
}

impl ContentDraft {
    #[must_use]
    pub fn new(kind: ContentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            handle: None,
            duration_secs: None,
        }
    }

    #[must_use]
    pub fn with_handle(mut self, handle: ResourceHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    #[must_use]
    pub fn with_duration_secs(mut self, secs: u32) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    /// Finalize the draft under the given id.
    ///
    /// Blank names fall back to the kind's default file name. Videos without a
    /// known duration get [`DEFAULT_VIDEO_DURATION_SECS`]; documents never carry one.
    #[must_use]
    pub fn into_item(self, id: ContentId) -> ContentItem {
        let name = match self.name.trim() {
            "" => self.kind.fallback_name().to_owned(),
            trimmed => trimmed.to_owned(),
        };
        let duration_secs = match self.kind {
            ContentKind::Video => Some(self.duration_secs.unwrap_or(DEFAULT_VIDEO_DURATION_SECS)),
            ContentKind::Document => None,
        };
        ContentItem {
            id,
            kind: self.kind,
            name,
            duration_secs,
            handle: self.handle,
        }
    }
}

//
// ─── ITEM ──────────────────────────────────────────────────────────────────────
//

/// A single document or video inside a module. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    id: ContentId,
    #[serde(rename = "type")]
    kind: ContentKind,
    name: String,
    #[serde(rename = "duration", default, skip_serializing_if = "Option::is_none")]
    duration_secs: Option<u32>,
    #[serde(skip)]
    handle: Option<ResourceHandle>,
}

impl ContentItem {
    #[must_use]
    pub fn id(&self) -> ContentId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn duration_secs(&self) -> Option<u32> {
        self.duration_secs
    }

    /// Session-scoped file handle, if the bytes are still reachable.
    ///
    /// `None` means the renderer should show a placeholder.
    #[must_use]
    pub fn handle(&self) -> Option<&ResourceHandle> {
        self.handle.as_ref()
    }

    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind == ContentKind::Video
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_falls_back_per_kind() {
        let doc = ContentDraft::new(ContentKind::Document, "  ").into_item(ContentId::new(1));
        assert_eq!(doc.name(), "Document.pdf");
        let video = ContentDraft::new(ContentKind::Video, "").into_item(ContentId::new(2));
        assert_eq!(video.name(), "Video.mp4");
    }

    #[test]
    fn videos_get_default_duration_documents_none() {
        let video = ContentDraft::new(ContentKind::Video, "Demo.mp4").into_item(ContentId::new(1));
        assert_eq!(video.duration_secs(), Some(DEFAULT_VIDEO_DURATION_SECS));

        let doc = ContentDraft::new(ContentKind::Document, "Policy.pdf")
            .with_duration_secs(30)
            .into_item(ContentId::new(2));
        assert_eq!(doc.duration_secs(), None);
    }

    #[test]
    fn wire_shape_uses_type_and_duration_keys() {
        let item = ContentDraft::new(ContentKind::Video, "Demo.mp4")
            .with_duration_secs(12)
            .with_handle(ResourceHandle::new("blob:local/1"))
            .into_item(ContentId::new(12));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 12, "type": "video", "name": "Demo.mp4", "duration": 12 })
        );
    }

    #[test]
    fn handle_is_not_restored_from_snapshot() {
        let item = ContentDraft::new(ContentKind::Document, "Policy.pdf")
            .with_handle(ResourceHandle::new("blob:local/2"))
            .into_item(ContentId::new(3));
        let json = serde_json::to_string(&item).unwrap();
        let back: ContentItem = serde_json::from_str(&json).unwrap();
        assert!(back.handle().is_none());
        assert_eq!(back.name(), "Policy.pdf");
    }
}
