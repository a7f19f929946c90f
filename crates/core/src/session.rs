//! Transient, per-session UI state. Nothing here is persisted.

use chrono::{DateTime, Duration, Utc};

use crate::model::{ContentId, ContentItem, ModuleId};
use crate::progress::{PendingQuiz, percent};

/// How long a certificate toast stays visible, in milliseconds.
pub const TOAST_TTL_MS: i64 = 2_500;

#[must_use]
pub fn toast_ttl() -> Duration {
    Duration::milliseconds(TOAST_TTL_MS)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    NewJoiner,
    Trainer,
}

impl Role {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Role::NewJoiner => "New Joiner",
            Role::Trainer => "Trainer",
        }
    }

    /// Trainers author content; new joiners consume it.
    #[must_use]
    pub fn can_author(self) -> bool {
        self == Role::Trainer
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NavSection {
    #[default]
    Dashboard,
    Modules,
    Templates,
    Faqs,
    QualitySla,
    Reports,
    Certificates,
    Settings,
}

impl NavSection {
    pub const ALL: [NavSection; 8] = [
        NavSection::Dashboard,
        NavSection::Modules,
        NavSection::Templates,
        NavSection::Faqs,
        NavSection::QualitySla,
        NavSection::Reports,
        NavSection::Certificates,
        NavSection::Settings,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            NavSection::Dashboard => "Dashboard",
            NavSection::Modules => "Modules",
            NavSection::Templates => "Templates",
            NavSection::Faqs => "FAQs",
            NavSection::QualitySla => "Quality & SLA",
            NavSection::Reports => "Reports",
            NavSection::Certificates => "Certificates",
            NavSection::Settings => "Settings",
        }
    }

    #[must_use]
    pub fn visible_to(self, role: Role) -> bool {
        match self {
            NavSection::Reports => role == Role::Trainer,
            _ => true,
        }
    }

    /// Sections shown in the navigation for `role`, in display order.
    #[must_use]
    pub fn menu(role: Role) -> Vec<NavSection> {
        Self::ALL.into_iter().filter(|s| s.visible_to(role)).collect()
    }
}

//
// ─── PLAYER ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerState {
    pub module_id: ModuleId,
    pub content_id: ContentId,
    pub progress: u8,
    pub playing: bool,
}

impl PlayerState {
    /// Documents open fully read; videos start playing from zero.
    #[must_use]
    pub fn open(module_id: ModuleId, item: &ContentItem) -> Self {
        let (progress, playing) = if item.is_video() { (0, true) } else { (100, false) };
        Self {
            module_id,
            content_id: item.id(),
            progress,
            playing,
        }
    }
}

/// Playback position as a watched percentage, capped at 100.
///
/// The media's own duration wins over the item's recorded one; with neither,
/// a one-second duration is assumed.
#[must_use]
pub fn playback_percent(
    position_secs: f64,
    media_duration_secs: Option<f64>,
    item_duration_secs: Option<u32>,
) -> u8 {
    let duration = media_duration_secs
        .filter(|d| d.is_finite() && *d > 0.0)
        .or_else(|| item_duration_secs.filter(|d| *d > 0).map(f64::from))
        .unwrap_or(1.0);
    if !position_secs.is_finite() || position_secs <= 0.0 {
        return 0;
    }
    // millisecond resolution keeps the integer rounding in `percent` exact enough
    let to_millis = |secs: f64| (secs * 1_000.0).round() as usize;
    percent(to_millis(position_secs.min(duration)), to_millis(duration).max(1))
}

//
// ─── TOAST ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    #[must_use]
    pub fn new(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            expires_at: now + toast_ttl(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Which overlay a dismissal closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Player,
    Quiz,
    Intro,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    role: Role,
    nav: NavSection,
    player: Option<PlayerState>,
    pending_quiz: Option<PendingQuiz>,
    search: String,
    intro_visible: bool,
    toast: Option<Toast>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Accessors
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn nav(&self) -> NavSection {
        self.nav
    }

    #[must_use]
    pub fn player(&self) -> Option<&PlayerState> {
        self.player.as_ref()
    }

    #[must_use]
    pub fn pending_quiz(&self) -> Option<&PendingQuiz> {
        self.pending_quiz.as_ref()
    }

    #[must_use]
    pub fn is_quiz_pending_for(&self, module_id: ModuleId) -> bool {
        self.pending_quiz
            .as_ref()
            .is_some_and(|q| q.module_id == module_id)
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub fn intro_visible(&self) -> bool {
        self.intro_visible
    }

    /// The toast, unless it has expired by `now`.
    #[must_use]
    pub fn toast(&self, now: DateTime<Utc>) -> Option<&Toast> {
        self.toast.as_ref().filter(|t| !t.is_expired(now))
    }

    /// Switching role always lands on the dashboard.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.nav = NavSection::Dashboard;
    }

    /// Returns `false` (and stays put) if the section is hidden for the current role.
    pub fn navigate(&mut self, section: NavSection) -> bool {
        if !section.visible_to(self.role) {
            return false;
        }
        self.nav = section;
        true
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn show_intro(&mut self) {
        self.intro_visible = true;
    }

    pub fn close_intro(&mut self) {
        self.intro_visible = false;
    }

    pub fn open_player(&mut self, player: PlayerState) {
        self.player = Some(player);
    }

    pub fn close_player(&mut self) -> Option<PlayerState> {
        self.player.take()
    }

    /// Update the watched percentage of the open player if it shows `content_id`.
    pub fn update_playback(&mut self, content_id: ContentId, progress: u8) -> bool {
        match self.player.as_mut() {
            Some(p) if p.content_id == content_id => {
                p.progress = progress.min(100);
                true
            }
            _ => false,
        }
    }

    /// Mark the open player as finished. Returns the player if it showed `content_id`.
    pub fn finish_playback(&mut self, content_id: ContentId) -> Option<PlayerState> {
        let player = self.player.as_mut().filter(|p| p.content_id == content_id)?;
        player.progress = 100;
        player.playing = false;
        Some(*player)
    }

    pub fn set_pending_quiz(&mut self, quiz: PendingQuiz) {
        self.pending_quiz = Some(quiz);
    }

    pub fn close_quiz(&mut self) -> Option<PendingQuiz> {
        self.pending_quiz.take()
    }

    pub fn show_toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
    }

    /// Drops the toast once it has expired; returns whether one was dropped.
    pub fn clear_expired_toast(&mut self, now: DateTime<Utc>) -> bool {
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
            return true;
        }
        false
    }

    /// Close the topmost overlay: player first, then quiz, then intro.
    pub fn dismiss_topmost(&mut self) -> Option<Panel> {
        if self.player.take().is_some() {
            Some(Panel::Player)
        } else if self.pending_quiz.take().is_some() {
            Some(Panel::Quiz)
        } else if self.intro_visible {
            self.intro_visible = false;
            Some(Panel::Intro)
        } else {
            None
        }
    }
}
