use serde::{Deserialize, Serialize};

use crate::model::catalog::CatalogError;
use crate::model::content_item::ContentItem;
use crate::model::ids::{ContentId, ModuleId};
use crate::model::quiz::Quiz;

/// A unit of training content: ordered items plus an optional quiz.
///
/// Invariants kept by every mutation:
/// - `viewed` only holds ids of items in `contents`, each at most once
/// - `done` is never set on a module without content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    id: ModuleId,
    title: String,
    #[serde(rename = "info", default)]
    description: String,
    #[serde(default)]
    contents: Vec<ContentItem>,
    #[serde(default)]
    viewed: Vec<ContentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quiz: Option<Quiz>,
    #[serde(rename = "done", default)]
    completed: bool,
}

impl Module {
    /// Creates an empty module.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyTitle` if the title is blank after trimming.
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let title = title.into();
        let title = title.trim();
        if title.is_empty() {
            return Err(CatalogError::EmptyTitle);
        }

        Ok(Self {
            id,
            title: title.to_owned(),
            description: description.into().trim().to_owned(),
            contents: Vec::new(),
            viewed: Vec::new(),
            quiz: None,
            completed: false,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Content in display (insertion) order.
    #[must_use]
    pub fn contents(&self) -> &[ContentItem] {
        &self.contents
    }

    #[must_use]
    pub fn content(&self, id: ContentId) -> Option<&ContentItem> {
        self.contents.iter().find(|c| c.id() == id)
    }

    /// Viewed content ids, in the order they were first viewed.
    #[must_use]
    pub fn viewed(&self) -> &[ContentId] {
        &self.viewed
    }

    #[must_use]
    pub fn has_viewed(&self, id: ContentId) -> bool {
        self.viewed.contains(&id)
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// True when there is content and all of it has been viewed.
    #[must_use]
    pub fn all_viewed(&self) -> bool {
        !self.contents.is_empty() && self.viewed.len() == self.contents.len()
    }

    pub(crate) fn push_content(&mut self, item: ContentItem) {
        self.contents.push(item);
    }

    /// Drops the item and its viewed mark. Completion has to be earned again.
    pub(crate) fn remove_content(&mut self, id: ContentId) -> Result<(), CatalogError> {
        let before = self.contents.len();
        self.contents.retain(|c| c.id() != id);
        if self.contents.len() == before {
            return Err(CatalogError::ContentNotFound {
                module: self.id,
                content: id,
            });
        }
        self.viewed.retain(|v| *v != id);
        self.completed = false;
        Ok(())
    }

    /// Returns `true` if the id was not viewed before.
    pub(crate) fn record_view(&mut self, id: ContentId) -> Result<bool, CatalogError> {
        if self.content(id).is_none() {
            return Err(CatalogError::ContentNotFound {
                module: self.id,
                content: id,
            });
        }
        if self.has_viewed(id) {
            return Ok(false);
        }
        self.viewed.push(id);
        Ok(true)
    }

    pub(crate) fn replace_quiz(&mut self, quiz: Quiz) {
        self.quiz = Some(quiz);
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// Repairs a module restored from an untrusted snapshot.
    ///
    /// Returns `true` if anything had to change.
    pub(crate) fn sanitize(&mut self) -> bool {
        let mut seen = Vec::with_capacity(self.viewed.len());
        for id in &self.viewed {
            if self.contents.iter().any(|c| c.id() == *id) && !seen.contains(id) {
                seen.push(*id);
            }
        }
        let mut changed = seen.len() != self.viewed.len();
        self.viewed = seen;

        if self.completed && self.contents.is_empty() {
            self.completed = false;
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content_item::{ContentDraft, ContentKind};

    fn module_with_items(ids: &[u64]) -> Module {
        let mut module = Module::new(ModuleId::new(1), "Call Flow", "notes").unwrap();
        for id in ids {
            module.push_content(
                ContentDraft::new(ContentKind::Document, format!("Doc {id}.pdf"))
                    .into_item(ContentId::new(*id)),
            );
        }
        module
    }

    #[test]
    fn new_rejects_blank_title() {
        let err = Module::new(ModuleId::new(1), "   ", "desc").unwrap_err();
        assert_eq!(err, CatalogError::EmptyTitle);
    }

    #[test]
    fn new_trims_title_and_description() {
        let module = Module::new(ModuleId::new(1), "  Escalation  ", "  SLA  ").unwrap();
        assert_eq!(module.title(), "Escalation");
        assert_eq!(module.description(), "SLA");
        assert!(module.contents().is_empty());
        assert!(!module.is_completed());
    }

    #[test]
    fn record_view_is_idempotent() {
        let mut module = module_with_items(&[1, 2]);
        assert!(module.record_view(ContentId::new(1)).unwrap());
        assert!(!module.record_view(ContentId::new(1)).unwrap());
        assert_eq!(module.viewed(), &[ContentId::new(1)]);
    }

    #[test]
    fn record_view_rejects_unknown_content() {
        let mut module = module_with_items(&[1]);
        let err = module.record_view(ContentId::new(9)).unwrap_err();
        assert!(matches!(err, CatalogError::ContentNotFound { .. }));
        assert!(module.viewed().is_empty());
    }

    #[test]
    fn remove_content_clears_view_and_completion() {
        let mut module = module_with_items(&[1, 2]);
        module.record_view(ContentId::new(1)).unwrap();
        module.record_view(ContentId::new(2)).unwrap();
        module.mark_completed();

        module.remove_content(ContentId::new(1)).unwrap();
        assert_eq!(module.viewed(), &[ContentId::new(2)]);
        assert!(!module.is_completed());
    }

    #[test]
    fn sanitize_drops_unknown_and_duplicate_views() {
        let mut module = module_with_items(&[1, 2]);
        module.viewed = vec![ContentId::new(1), ContentId::new(7), ContentId::new(1)];
        assert!(module.sanitize());
        assert_eq!(module.viewed(), &[ContentId::new(1)]);
        assert!(!module.sanitize());
    }

    #[test]
    fn sanitize_clears_completion_without_content() {
        let mut module = module_with_items(&[]);
        module.completed = true;
        assert!(module.sanitize());
        assert!(!module.is_completed());
    }
}
