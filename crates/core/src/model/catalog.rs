use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::content_item::{ContentDraft, ContentItem, ContentKind};
use crate::model::ids::{ContentId, ModuleId, QuizId};
use crate::model::module::Module;
use crate::model::quiz::{DEFAULT_QUESTION_COUNT, Quiz};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("module {0} not found")]
    ModuleNotFound(ModuleId),

    #[error("content {content} not found in module {module}")]
    ContentNotFound { module: ModuleId, content: ContentId },

    #[error("quiz must have at least one question")]
    InvalidQuestionCount,
}

//
// ─── TRANSITION ────────────────────────────────────────────────────────────────
//

/// The snapshot produced by a catalog operation, plus whatever it reports.
///
/// Operations never touch the catalog they are called on; callers commit
/// `catalog` when they are ready to make the change visible.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Transition<T = ()> {
    pub catalog: Catalog,
    pub output: T,
}

impl<T> Transition<T> {
    pub(crate) fn new(catalog: Catalog, output: T) -> Self {
        Self { catalog, output }
    }

    #[must_use]
    pub fn into_parts(self) -> (Catalog, T) {
        (self.catalog, self.output)
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// The ordered collection of all modules; the unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    modules: Vec<Module>,
}

impl Catalog {
    #[must_use]
    pub fn new(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    /// The default training set used when nothing has been persisted yet.
    #[must_use]
    pub fn seeded() -> Self {
        let doc = |id: u64, name: &str| {
            ContentDraft::new(ContentKind::Document, name).into_item(ContentId::new(id))
        };
        let video = |id: u64, name: &str| {
            ContentDraft::new(ContentKind::Video, name).into_item(ContentId::new(id))
        };

        let seeds: Vec<(u64, &str, &str, Vec<ContentItem>)> = vec![
            (
                1,
                "Social Media Etiquette",
                "Instagram/YouTube/Facebook DMs & comments policy.",
                vec![
                    doc(11, "DM Policy – Starter.pdf"),
                    video(12, "Polite Replies Demo.mp4"),
                ],
            ),
            (
                2,
                "WhatsApp Communication",
                "Templates, etiquettes, leads & follow‑ups.",
                vec![
                    doc(21, "WA Templates Pack.pdf"),
                    video(22, "Lead Conversion Tips.mp4"),
                ],
            ),
            (
                3,
                "Call Flow",
                "Inbound/Outbound flow, notes discipline.",
                vec![
                    doc(31, "Call Script L1.pdf"),
                    video(32, "Call Handling Example.mp4"),
                ],
            ),
            (
                4,
                "Sales vs Support",
                "Right bucketing, conversion & resolution.",
                vec![doc(41, "Qualification Checklist.pdf")],
            ),
            (
                5,
                "Escalation Process",
                "3‑level escalation matrix with SLA.",
                vec![doc(51, "Escalation Matrix.pdf")],
            ),
            (
                6,
                "Daily Report Submission",
                "Shift summary, leads, closures, pending items.",
                vec![video(61, "How to fill DSR.mp4")],
            ),
        ];

        let modules = seeds
            .into_iter()
            .filter_map(|(id, title, info, items)| {
                let mut module = Module::new(ModuleId::new(id), title, info).ok()?;
                for item in items {
                    module.push_content(item);
                }
                Some(module)
            })
            .collect();
        Self { modules }
    }

    /// Repairs a snapshot restored from storage.
    ///
    /// Returns the repaired catalog and whether any module had to change.
    #[must_use]
    pub fn sanitized(mut self) -> (Self, bool) {
        let mut changed = false;
        for module in &mut self.modules {
            changed |= module.sanitize();
        }
        (self, changed)
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.iter().find(|m| m.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub(crate) fn module_mut(&mut self, id: ModuleId) -> Result<&mut Module, CatalogError> {
        self.modules
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or(CatalogError::ModuleNotFound(id))
    }

    fn next_module_id(&self) -> ModuleId {
        self.modules
            .iter()
            .map(Module::id)
            .max()
            .map_or_else(|| ModuleId::new(1), |id| id.next())
    }

    fn next_content_id(&self) -> ContentId {
        self.modules
            .iter()
            .flat_map(|m| m.contents().iter().map(ContentItem::id))
            .max()
            .map_or_else(|| ContentId::new(1), |id| id.next())
    }

    fn next_quiz_id(&self) -> QuizId {
        self.modules
            .iter()
            .filter_map(|m| m.quiz().map(Quiz::id))
            .max()
            .map_or_else(|| QuizId::new(1), |id| id.next())
    }

    /// Append a new, empty module.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyTitle` if the title is blank.
    pub fn create_module(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Transition<ModuleId>, CatalogError> {
        let id = self.next_module_id();
        let module = Module::new(id, title, description)?;
        let mut next = self.clone();
        next.modules.push(module);
        Ok(Transition::new(next, id))
    }

    /// Append a content item to a module. Viewed marks and completion are left alone.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ModuleNotFound` for unknown modules.
    pub fn add_content(
        &self,
        module_id: ModuleId,
        draft: ContentDraft,
    ) -> Result<Transition<ContentId>, CatalogError> {
        let id = self.next_content_id();
        let mut next = self.clone();
        next.module_mut(module_id)?.push_content(draft.into_item(id));
        Ok(Transition::new(next, id))
    }

    /// Remove a content item; its viewed mark goes with it and completion resets.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ModuleNotFound` or `CatalogError::ContentNotFound`.
    pub fn remove_content(
        &self,
        module_id: ModuleId,
        content_id: ContentId,
    ) -> Result<Transition, CatalogError> {
        let mut next = self.clone();
        next.module_mut(module_id)?.remove_content(content_id)?;
        Ok(Transition::new(next, ()))
    }

    /// Attach a quiz, replacing any existing one.
    ///
    /// `question_count` defaults to [`DEFAULT_QUESTION_COUNT`].
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyTitle`, `CatalogError::InvalidQuestionCount`
    /// or `CatalogError::ModuleNotFound`.
    pub fn attach_quiz(
        &self,
        module_id: ModuleId,
        title: &str,
        question_count: Option<u32>,
    ) -> Result<Transition<QuizId>, CatalogError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CatalogError::EmptyTitle);
        }
        let question_count = question_count.unwrap_or(DEFAULT_QUESTION_COUNT);
        if question_count == 0 {
            return Err(CatalogError::InvalidQuestionCount);
        }

        let id = self.next_quiz_id();
        let mut next = self.clone();
        next.module_mut(module_id)?
            .replace_quiz(Quiz::new(id, title.to_owned(), question_count));
        Ok(Transition::new(next, id))
    }

    /// Modules whose title, description or any content name contains `query`,
    /// case-insensitively. A blank query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Module> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return self.modules.iter().collect();
        }
        self.modules
            .iter()
            .filter(|m| {
                m.title().to_lowercase().contains(&q)
                    || m.description().to_lowercase().contains(&q)
                    || m.contents().iter().any(|c| c.name().to_lowercase().contains(&q))
            })
            .collect()
    }

    /// Completed modules, in catalog order.
    #[must_use]
    pub fn certificates(&self) -> Vec<&Module> {
        self.modules.iter().filter(|m| m.is_completed()).collect()
    }
}
