//! Per-module progress, quiz gating and the completion state machine.
//!
//! ```text
//! Empty ──add──▶ InProgress ──all viewed──▶ Completed            (no quiz)
//!                            └─all viewed──▶ AwaitingQuiz ─request─▶ QuizPending
//!                                               ▲                      │
//!                                               └──────── fail ────────┤
//!                                                          pass ──────▶ Completed
//! ```
//!
//! Removing content always drops the module back out of `Completed`.

use serde::{Deserialize, Serialize};

use crate::model::{Catalog, CatalogError, ContentId, Module, ModuleId, QuizError, Transition};

/// Rounded percentage of `part` over `whole`; 0 when `whole` is 0.
///
/// Halves round up.
#[must_use]
pub fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u128;
    let whole = whole as u128;
    let rounded = (200 * part + whole) / (2 * whole);
    u8::try_from(rounded).unwrap_or(100)
}

//
// ─── DERIVED VALUES ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleProgress {
    pub total: usize,
    pub viewed: usize,
    pub percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// No content yet.
    Empty,
    /// Some content still unviewed, or completion lost after content changed.
    InProgress,
    /// Everything viewed; the attached quiz has not been passed.
    AwaitingQuiz,
    /// The learner opened the quiz and has not submitted it.
    QuizPending,
    Completed,
}

/// A quiz the learner may take now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingQuiz {
    pub module_id: ModuleId,
    pub title: String,
    pub question_count: u32,
}

/// Signal raised by [`Catalog::mark_viewed`] when a module crosses the all-viewed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    QuizReady(PendingQuiz),
    ModuleCompleted(ModuleId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub module_id: ModuleId,
    pub module_title: String,
}

impl Certificate {
    /// Short celebratory line shown when the certificate unlocks.
    #[must_use]
    pub fn message(&self) -> String {
        format!("{} – Certificate unlocked!", self.module_title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizOutcome {
    Passed(Certificate),
    /// Nothing is recorded; the quiz can be requested again straight away.
    Failed,
}

impl Module {
    #[must_use]
    pub fn progress(&self) -> ModuleProgress {
        let total = self.contents().len();
        let viewed = self.viewed().len();
        ModuleProgress {
            total,
            viewed,
            percent: percent(viewed, total),
        }
    }

    /// Current state, given whether the session holds a pending quiz for this module.
    #[must_use]
    pub fn state(&self, quiz_pending: bool) -> ModuleState {
        if self.contents().is_empty() {
            ModuleState::Empty
        } else if self.is_completed() {
            ModuleState::Completed
        } else if !self.all_viewed() || self.quiz().is_none() {
            ModuleState::InProgress
        } else if quiz_pending {
            ModuleState::QuizPending
        } else {
            ModuleState::AwaitingQuiz
        }
    }

    fn pending_quiz(&self) -> Option<PendingQuiz> {
        self.quiz().map(|quiz| PendingQuiz {
            module_id: self.id(),
            title: quiz.title().to_owned(),
            question_count: quiz.question_count(),
        })
    }
}

//
// ─── TRANSITIONS ───────────────────────────────────────────────────────────────
//

impl Catalog {
    /// Record that a content item was viewed. Calling it again is harmless.
    ///
    /// When this leaves every item viewed, modules without a quiz complete on
    /// the spot; modules with one report `QuizReady` and stay incomplete.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ModuleNotFound` or `CatalogError::ContentNotFound`.
    pub fn mark_viewed(
        &self,
        module_id: ModuleId,
        content_id: ContentId,
    ) -> Result<Transition<Option<ProgressEvent>>, CatalogError> {
        let mut next = self.clone();
        let module = next.module_mut(module_id)?;
        module.record_view(content_id)?;

        let event = if module.is_completed() || !module.all_viewed() {
            None
        } else if let Some(pending) = module.pending_quiz() {
            Some(ProgressEvent::QuizReady(pending))
        } else {
            module.mark_completed();
            Some(ProgressEvent::ModuleCompleted(module_id))
        };
        Ok(Transition::new(next, event))
    }

    /// Hand out the module's quiz if the learner may take it now.
    ///
    /// # Errors
    ///
    /// - `QuizError::NoQuiz` when nothing is attached
    /// - `QuizError::Locked` until all content has been viewed
    /// - `QuizError::AlreadyPassed` once the module is completed
    pub fn request_quiz(&self, module_id: ModuleId) -> Result<PendingQuiz, QuizError> {
        let module = self
            .module(module_id)
            .ok_or(CatalogError::ModuleNotFound(module_id))?;
        let pending = module.pending_quiz().ok_or(QuizError::NoQuiz)?;
        if module.is_completed() {
            return Err(QuizError::AlreadyPassed);
        }
        if !module.all_viewed() {
            return Err(QuizError::Locked);
        }
        Ok(pending)
    }

    /// Settle a quiz previously handed out by [`Catalog::request_quiz`] or a
    /// `QuizReady` event. A pass completes the module; a fail changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuiz` if the quiz was detached in the meantime,
    /// `QuizError::AlreadyPassed` if the module is already completed,
    /// `QuizError::Locked` if content added since the hand-out is still unviewed.
    pub fn submit_quiz(
        &self,
        pending: &PendingQuiz,
        passed: bool,
    ) -> Result<Transition<QuizOutcome>, QuizError> {
        let mut next = self.clone();
        let module = next.module_mut(pending.module_id)?;
        if module.quiz().is_none() {
            return Err(QuizError::NoQuiz);
        }
        if module.is_completed() {
            return Err(QuizError::AlreadyPassed);
        }
        if !module.all_viewed() {
            return Err(QuizError::Locked);
        }
        if !passed {
            return Ok(Transition::new(next, QuizOutcome::Failed));
        }

        module.mark_completed();
        let certificate = Certificate {
            module_id: module.id(),
            module_title: module.title().to_owned(),
        };
        Ok(Transition::new(next, QuizOutcome::Passed(certificate)))
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.modules().iter().filter(|m| m.is_completed()).count()
    }

    /// Share of completed modules; 0 for an empty catalog.
    #[must_use]
    pub fn overall_percent(&self) -> u8 {
        percent(self.completed_count(), self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentDraft, ContentKind};

    fn module_with(items: usize, quiz: Option<(&str, u32)>) -> (Catalog, ModuleId, Vec<ContentId>) {
        let (mut catalog, id) = Catalog::default()
            .create_module("Module", "")
            .unwrap()
            .into_parts();
        let mut ids = Vec::new();
        for n in 0..items {
            let (next, cid) = catalog
                .add_content(id, ContentDraft::new(ContentKind::Document, format!("{n}.pdf")))
                .unwrap()
                .into_parts();
            catalog = next;
            ids.push(cid);
        }
        if let Some((title, count)) = quiz {
            catalog = catalog.attach_quiz(id, title, Some(count)).unwrap().catalog;
        }
        (catalog, id, ids)
    }

    #[test]
    fn percent_rounds_half_up_and_handles_zero() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn empty_module_has_zero_percent_and_never_completes() {
        let (catalog, id, _) = module_with(0, None);
        let module = catalog.module(id).unwrap();
        assert_eq!(module.progress().percent, 0);
        assert_eq!(module.state(false), ModuleState::Empty);
        assert!(!module.is_completed());
    }

    #[test]
    fn two_items_without_quiz_complete_on_second_view() {
        let (catalog, id, items) = module_with(2, None);

        let t = catalog.mark_viewed(id, items[0]).unwrap();
        assert_eq!(t.output, None);
        let module = t.catalog.module(id).unwrap();
        assert_eq!(module.progress().percent, 50);
        assert!(!module.is_completed());
        assert_eq!(module.state(false), ModuleState::InProgress);

        let t = t.catalog.mark_viewed(id, items[1]).unwrap();
        assert_eq!(t.output, Some(ProgressEvent::ModuleCompleted(id)));
        let module = t.catalog.module(id).unwrap();
        assert_eq!(module.progress().percent, 100);
        assert!(module.is_completed());
        assert_eq!(module.state(false), ModuleState::Completed);
    }

    #[test]
    fn mark_viewed_is_idempotent() {
        let (catalog, id, items) = module_with(2, None);
        let once = catalog.mark_viewed(id, items[0]).unwrap().catalog;
        let twice = once.mark_viewed(id, items[0]).unwrap().catalog;
        assert_eq!(once, twice);
    }

    #[test]
    fn mark_viewed_unknown_content_keeps_viewed_subset() {
        let (catalog, id, _) = module_with(1, None);
        let err = catalog.mark_viewed(id, ContentId::new(999)).unwrap_err();
        assert!(matches!(err, CatalogError::ContentNotFound { .. }));
    }

    #[test]
    fn quiz_module_is_gated_until_pass() {
        let (catalog, id, items) = module_with(1, Some(("Q1", 3)));

        let t = catalog.mark_viewed(id, items[0]).unwrap();
        let expected = PendingQuiz {
            module_id: id,
            title: "Q1".into(),
            question_count: 3,
        };
        assert_eq!(t.output, Some(ProgressEvent::QuizReady(expected.clone())));
        let catalog = t.catalog;
        let module = catalog.module(id).unwrap();
        assert_eq!(module.progress().percent, 100);
        assert!(!module.is_completed());
        assert_eq!(module.state(false), ModuleState::AwaitingQuiz);
        assert_eq!(module.state(true), ModuleState::QuizPending);

        let pending = catalog.request_quiz(id).unwrap();
        assert_eq!(pending, expected);

        let failed = catalog.submit_quiz(&pending, false).unwrap();
        assert_eq!(failed.output, QuizOutcome::Failed);
        assert!(!failed.catalog.module(id).unwrap().is_completed());
        assert_eq!(failed.catalog, catalog, "a failed attempt leaves no trace");

        for _ in 0..5 {
            let again = failed.catalog.request_quiz(id).unwrap();
            assert_eq!(failed.catalog.submit_quiz(&again, false).unwrap().output, QuizOutcome::Failed);
        }

        let passed = failed.catalog.submit_quiz(&pending, true).unwrap();
        let QuizOutcome::Passed(certificate) = passed.output else {
            panic!("expected a pass");
        };
        assert_eq!(certificate.module_title, "Module");
        assert!(certificate.message().contains("Module"));
        assert!(passed.catalog.module(id).unwrap().is_completed());
        assert_eq!(passed.catalog.request_quiz(id).unwrap_err(), QuizError::AlreadyPassed);
    }

    #[test]
    fn request_quiz_guards() {
        let (catalog, id, items) = module_with(2, Some(("Q", 2)));
        assert_eq!(catalog.request_quiz(id).unwrap_err(), QuizError::Locked);

        let (plain, plain_id, _) = module_with(1, None);
        assert_eq!(plain.request_quiz(plain_id).unwrap_err(), QuizError::NoQuiz);

        let err = catalog.request_quiz(ModuleId::new(77)).unwrap_err();
        assert_eq!(err, QuizError::Catalog(CatalogError::ModuleNotFound(ModuleId::new(77))));

        let viewed = catalog.mark_viewed(id, items[0]).unwrap().catalog;
        let viewed = viewed.mark_viewed(id, items[1]).unwrap().catalog;
        assert!(viewed.request_quiz(id).is_ok());
    }

    #[test]
    fn quiz_handed_out_before_new_content_stays_locked() {
        let (catalog, id, items) = module_with(1, Some(("Q", 2)));
        let t = catalog.mark_viewed(id, items[0]).unwrap();
        let Some(ProgressEvent::QuizReady(pending)) = t.output else {
            panic!("expected the quiz to open");
        };

        let (grown, extra) = t
            .catalog
            .add_content(id, ContentDraft::new(ContentKind::Document, "extra.pdf"))
            .unwrap()
            .into_parts();
        assert_eq!(grown.module(id).unwrap().state(true), ModuleState::InProgress);
        assert_eq!(grown.submit_quiz(&pending, true).unwrap_err(), QuizError::Locked);
        assert!(!grown.module(id).unwrap().is_completed());

        let caught_up = grown.mark_viewed(id, extra).unwrap().catalog;
        let outcome = caught_up.submit_quiz(&pending, true).unwrap().output;
        assert!(matches!(outcome, QuizOutcome::Passed(_)));
    }

    #[test]
    fn certificate_message_names_the_module() {
        let certificate = Certificate {
            module_id: ModuleId::new(3),
            module_title: "Call Flow".into(),
        };
        assert_eq!(certificate.message(), "Call Flow – Certificate unlocked!");
    }

    #[test]
    fn reopening_viewed_content_does_not_regress_completion() {
        let (catalog, id, items) = module_with(1, None);
        let done = catalog.mark_viewed(id, items[0]).unwrap().catalog;
        let t = done.mark_viewed(id, items[0]).unwrap();
        assert_eq!(t.output, None);
        assert!(t.catalog.module(id).unwrap().is_completed());
    }

    #[test]
    fn removing_content_resets_completion() {
        let (catalog, id, items) = module_with(2, None);
        let done = catalog.mark_viewed(id, items[0]).unwrap().catalog;
        let done = done.mark_viewed(id, items[1]).unwrap().catalog;
        assert!(done.module(id).unwrap().is_completed());

        let removed = done.remove_content(id, items[0]).unwrap().catalog;
        let module = removed.module(id).unwrap();
        assert!(!module.is_completed());
        assert_eq!(module.viewed(), &[items[1]]);
        assert_eq!(module.state(false), ModuleState::InProgress);

        // re-earned by viewing again
        let t = removed.mark_viewed(id, items[1]).unwrap();
        assert_eq!(t.output, Some(ProgressEvent::ModuleCompleted(id)));
    }

    #[test]
    fn overall_percent_counts_completed_modules() {
        assert_eq!(Catalog::default().overall_percent(), 0);

        let catalog = Catalog::seeded();
        assert_eq!(catalog.overall_percent(), 0);
        let catalog = catalog
            .mark_viewed(ModuleId::new(5), ContentId::new(51))
            .unwrap()
            .catalog;
        assert_eq!(catalog.completed_count(), 1);
        assert_eq!(catalog.overall_percent(), 17);
    }
}
