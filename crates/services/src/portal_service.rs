use lms_core::model::{
    BrandingImage, Catalog, CatalogError, ContentDraft, ContentId, ContentKind, Module, ModuleId,
    QuizError, QuizId, ResourceHandle,
};
use lms_core::progress::{ModuleProgress, ModuleState, PendingQuiz, ProgressEvent, QuizOutcome};
use lms_core::session::{
    NavSection, Panel, PlayerState, Role, SessionState, Toast, playback_percent,
};
use storage::snapshot::CatalogStore;

use crate::Clock;
use crate::error::PortalError;

/// A file the user picked, as handed over by the platform file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub name: String,
    pub handle: ResourceHandle,
    pub duration_secs: Option<u32>,
}

impl FileSelection {
    #[must_use]
    pub fn new(name: impl Into<String>, handle: ResourceHandle) -> Self {
        Self {
            name: name.into(),
            handle,
            duration_secs: None,
        }
    }
}

fn ignored<T>(intent: &'static str, result: Result<T, PortalError>) -> Result<T, PortalError> {
    result.inspect_err(|err| tracing::debug!(intent, error = %err, "intent ignored"))
}

/// Dispatches user intents against the catalog and session.
///
/// Every successful catalog change is written through the store before the
/// intent returns. Rejected intents leave both catalog and session untouched.
pub struct PortalService {
    clock: Clock,
    store: CatalogStore,
    catalog: Catalog,
    session: SessionState,
    branding: Option<BrandingImage>,
}

impl PortalService {
    #[must_use]
    pub fn new(
        clock: Clock,
        store: CatalogStore,
        catalog: Catalog,
        branding: Option<BrandingImage>,
    ) -> Self {
        Self {
            clock,
            store,
            catalog,
            session: SessionState::new(),
            branding,
        }
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    async fn commit(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        self.store.save(&self.catalog).await;
    }

    /// A pending quiz handed out before the module changed no longer applies.
    fn drop_stale_quiz(&mut self, module_id: ModuleId) {
        if self.session.is_quiz_pending_for(module_id) {
            self.session.close_quiz();
            tracing::debug!(module = %module_id, "pending quiz dropped after module change");
        }
    }

    fn require_trainer(&self) -> Result<(), PortalError> {
        if self.session.role().can_author() {
            Ok(())
        } else {
            Err(PortalError::TrainerOnly)
        }
    }

    // ─── read models ───────────────────────────────────────────────────────

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub fn module_progress(&self, module_id: ModuleId) -> Option<ModuleProgress> {
        self.catalog.module(module_id).map(Module::progress)
    }

    #[must_use]
    pub fn module_state(&self, module_id: ModuleId) -> Option<ModuleState> {
        let pending = self.session.is_quiz_pending_for(module_id);
        self.catalog.module(module_id).map(|m| m.state(pending))
    }

    #[must_use]
    pub fn overall_percent(&self) -> u8 {
        self.catalog.overall_percent()
    }

    /// Modules matching the current search text.
    #[must_use]
    pub fn visible_modules(&self) -> Vec<&Module> {
        self.catalog.search(self.session.search())
    }

    #[must_use]
    pub fn certificates(&self) -> Vec<&Module> {
        self.catalog.certificates()
    }

    #[must_use]
    pub fn branding(&self) -> Option<&BrandingImage> {
        self.branding.as_ref()
    }

    #[must_use]
    pub fn toast(&self) -> Option<&Toast> {
        self.session.toast(self.clock.now())
    }

    // ─── trainer intents ───────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `PortalError` if the role may not author or the title is blank.
    pub async fn create_module(
        &mut self,
        title: &str,
        description: &str,
    ) -> Result<ModuleId, PortalError> {
        let result = self.require_trainer().and_then(|()| {
            self.catalog
                .create_module(title, description)
                .map_err(PortalError::from)
        });
        let (catalog, id) = ignored("create_module", result)?.into_parts();
        self.commit(catalog).await;
        tracing::info!(module = %id, "module created");
        Ok(id)
    }

    /// Add a picked file to a module. A cancelled pick (`None`) changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `PortalError` if the role may not author or the module is unknown.
    pub async fn upload_content(
        &mut self,
        module_id: ModuleId,
        kind: ContentKind,
        selection: Option<FileSelection>,
    ) -> Result<Option<ContentId>, PortalError> {
        ignored("upload_content", self.require_trainer())?;
        let Some(selection) = selection else {
            tracing::debug!(module = %module_id, "file pick cancelled");
            return Ok(None);
        };

        let mut draft = ContentDraft::new(kind, selection.name).with_handle(selection.handle);
        if let Some(secs) = selection.duration_secs {
            draft = draft.with_duration_secs(secs);
        }
        let result = self
            .catalog
            .add_content(module_id, draft)
            .map_err(PortalError::from);
        let (catalog, id) = ignored("upload_content", result)?.into_parts();
        self.drop_stale_quiz(module_id);
        self.commit(catalog).await;
        tracing::info!(module = %module_id, content = %id, ?kind, "content uploaded");
        Ok(Some(id))
    }

    /// # Errors
    ///
    /// Returns `PortalError` if the role may not author or the item is unknown.
    pub async fn remove_content(
        &mut self,
        module_id: ModuleId,
        content_id: ContentId,
    ) -> Result<(), PortalError> {
        let result = self.require_trainer().and_then(|()| {
            self.catalog
                .remove_content(module_id, content_id)
                .map_err(PortalError::from)
        });
        let catalog = ignored("remove_content", result)?.catalog;
        if self.session.player().is_some_and(|p| p.content_id == content_id) {
            self.session.close_player();
        }
        self.drop_stale_quiz(module_id);
        self.commit(catalog).await;
        tracing::info!(module = %module_id, content = %content_id, "content removed");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `PortalError` if the role may not author, the module is unknown,
    /// or the title/question count is invalid.
    pub async fn attach_quiz(
        &mut self,
        module_id: ModuleId,
        title: &str,
        question_count: Option<u32>,
    ) -> Result<QuizId, PortalError> {
        let result = self.require_trainer().and_then(|()| {
            self.catalog
                .attach_quiz(module_id, title, question_count)
                .map_err(PortalError::from)
        });
        let (catalog, id) = ignored("attach_quiz", result)?.into_parts();
        self.drop_stale_quiz(module_id);
        self.commit(catalog).await;
        tracing::info!(module = %module_id, quiz = %id, "quiz attached");
        Ok(id)
    }

    /// Open an item in the player without recording a view.
    ///
    /// # Errors
    ///
    /// Returns `PortalError` if the role may not author or the item is unknown.
    pub fn preview_content(
        &mut self,
        module_id: ModuleId,
        content_id: ContentId,
    ) -> Result<(), PortalError> {
        let result = self.require_trainer().and_then(|()| self.player_for(module_id, content_id));
        let player = ignored("preview_content", result)?;
        self.session.open_player(player);
        Ok(())
    }

    // ─── learner intents ───────────────────────────────────────────────────

    fn player_for(
        &self,
        module_id: ModuleId,
        content_id: ContentId,
    ) -> Result<PlayerState, PortalError> {
        let module = self
            .catalog
            .module(module_id)
            .ok_or(CatalogError::ModuleNotFound(module_id))?;
        let item = module
            .content(content_id)
            .ok_or(CatalogError::ContentNotFound {
                module: module_id,
                content: content_id,
            })?;
        Ok(PlayerState::open(module_id, item))
    }

    /// Open an item. Documents count as viewed immediately; videos count once
    /// playback ends.
    ///
    /// # Errors
    ///
    /// Returns `PortalError` if the item is unknown.
    pub async fn open_content(
        &mut self,
        module_id: ModuleId,
        content_id: ContentId,
    ) -> Result<Option<ProgressEvent>, PortalError> {
        let player = ignored("open_content", self.player_for(module_id, content_id))?;
        self.session.open_player(player);
        if player.playing {
            return Ok(None);
        }
        self.mark_viewed(module_id, content_id).await
    }

    /// Record a view and react to the module reaching all-viewed.
    ///
    /// # Errors
    ///
    /// Returns `PortalError` if the item is unknown.
    pub async fn mark_viewed(
        &mut self,
        module_id: ModuleId,
        content_id: ContentId,
    ) -> Result<Option<ProgressEvent>, PortalError> {
        let result = self
            .catalog
            .mark_viewed(module_id, content_id)
            .map_err(PortalError::from);
        let (catalog, event) = ignored("mark_viewed", result)?.into_parts();
        self.commit(catalog).await;

        match &event {
            Some(ProgressEvent::QuizReady(pending)) => {
                tracing::info!(module = %module_id, quiz = %pending.title, "quiz ready");
                self.session.set_pending_quiz(pending.clone());
            }
            Some(ProgressEvent::ModuleCompleted(_)) => {
                tracing::info!(module = %module_id, "module completed");
            }
            None => {}
        }
        Ok(event)
    }

    /// Media timing callback. Returns `false` if `content_id` is not playing.
    pub fn playback_tick(
        &mut self,
        content_id: ContentId,
        position_secs: f64,
        media_duration_secs: Option<f64>,
    ) -> bool {
        let Some(player) = self.session.player().copied() else {
            return false;
        };
        if player.content_id != content_id {
            return false;
        }
        let item_duration = self
            .catalog
            .module(player.module_id)
            .and_then(|m| m.content(content_id))
            .and_then(|c| c.duration_secs());
        let pct = playback_percent(position_secs, media_duration_secs, item_duration);
        self.session.update_playback(content_id, pct)
    }

    /// End-of-media callback: the player shows 100% and the item counts as viewed.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::NotInPlayer` if another item (or none) is open.
    pub async fn playback_ended(
        &mut self,
        content_id: ContentId,
    ) -> Result<Option<ProgressEvent>, PortalError> {
        let player = self
            .session
            .finish_playback(content_id)
            .ok_or(PortalError::NotInPlayer(content_id));
        let player = ignored("playback_ended", player)?;
        self.mark_viewed(player.module_id, content_id).await
    }

    /// Views already recorded stay recorded.
    pub fn close_player(&mut self) {
        self.session.close_player();
    }

    /// # Errors
    ///
    /// Returns `PortalError` if the module has no quiz, content is still
    /// unviewed, or the quiz was already passed.
    pub fn request_quiz(&mut self, module_id: ModuleId) -> Result<PendingQuiz, PortalError> {
        let pending = self
            .catalog
            .request_quiz(module_id)
            .map_err(PortalError::from);
        let pending = ignored("request_quiz", pending)?;
        self.session.set_pending_quiz(pending.clone());
        Ok(pending)
    }

    /// Settle the pending quiz for `module_id`. The quiz panel closes either way.
    ///
    /// # Errors
    ///
    /// Returns `PortalError` if no quiz is pending for the module.
    pub async fn submit_quiz(
        &mut self,
        module_id: ModuleId,
        passed: bool,
    ) -> Result<QuizOutcome, PortalError> {
        let pending = match self.session.pending_quiz() {
            Some(p) if p.module_id == module_id => Ok(p.clone()),
            _ => Err(PortalError::from(QuizError::NotPending)),
        };
        let pending = ignored("submit_quiz", pending)?;
        let result = self
            .catalog
            .submit_quiz(&pending, passed)
            .map_err(PortalError::from);
        let (catalog, outcome) = ignored("submit_quiz", result)?.into_parts();
        self.session.close_quiz();

        match &outcome {
            QuizOutcome::Passed(certificate) => {
                self.commit(catalog).await;
                self.session
                    .show_toast(Toast::new(certificate.message(), self.clock.now()));
                tracing::info!(module = %module_id, "quiz passed");
            }
            QuizOutcome::Failed => {
                tracing::info!(module = %module_id, "quiz failed");
            }
        }
        Ok(outcome)
    }

    pub fn close_quiz(&mut self) {
        self.session.close_quiz();
    }

    // ─── session intents ───────────────────────────────────────────────────

    pub fn set_role(&mut self, role: Role) {
        self.session.set_role(role);
    }

    pub fn navigate(&mut self, section: NavSection) -> bool {
        let moved = self.session.navigate(section);
        if !moved {
            tracing::debug!(section = section.label(), "navigation ignored for role");
        }
        moved
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.session.set_search(query);
    }

    pub fn show_intro(&mut self) {
        self.session.show_intro();
    }

    pub fn close_intro(&mut self) {
        self.session.close_intro();
    }

    /// Escape gesture: closes the player, else the quiz, else the intro.
    pub fn dismiss_topmost(&mut self) -> Option<Panel> {
        self.session.dismiss_topmost()
    }

    /// Drop the toast if it has outlived its display time.
    pub fn expire_toast(&mut self) -> bool {
        self.session.clear_expired_toast(self.clock.now())
    }

    pub async fn set_branding(&mut self, image: BrandingImage) {
        self.store.save_branding(&image).await;
        self.branding = Some(image);
    }
}
