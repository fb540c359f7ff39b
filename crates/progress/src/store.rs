use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::catalog::{AchievementId, ScreenId, SkillId, PLAY_TIME_THRESHOLD_SECONDS};
use crate::events::{AchievementPopup, EventQueue, ProgressEvent, SoundCue};
use crate::record::{
    decode_legacy_skills, decode_persisted, encode_record, migrate, parse_ids, MigrationReport,
    SaveRecord, LEGACY_SKILLS_KEY, SAVE_KEY,
};
use crate::storage::{SaveStorage, StorageError};

/// Source of the currently shown screen, used when a save names no screen.
pub trait ActiveScreen {
    fn active_screen(&self) -> Option<ScreenId>;
}

impl ActiveScreen for ScreenId {
    fn active_screen(&self) -> Option<ScreenId> {
        Some(*self)
    }
}

impl ActiveScreen for Option<ScreenId> {
    fn active_screen(&self) -> Option<ScreenId> {
        *self
    }
}

/// For callers with no screen router, e.g. tools operating on a save offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoActiveScreen;

impl ActiveScreen for NoActiveScreen {
    fn active_screen(&self) -> Option<ScreenId> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was stored.
    Fresh,
    Restored(MigrationReport),
    /// Stored data was unreadable; defaults are in use.
    Recovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRejection {
    TitleScreen,
}

#[derive(Debug)]
pub enum SaveOutcome {
    Saved { screen: Option<ScreenId> },
    Rejected(SaveRejection),
    /// The write failed. The in-memory record keeps the mutation.
    Failed(StorageError),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueTarget {
    Resume(ScreenId),
    NewGame(ScreenId),
}

impl ContinueTarget {
    pub fn screen(self) -> ScreenId {
        match self {
            ContinueTarget::Resume(screen) | ContinueTarget::NewGame(screen) => screen,
        }
    }
}

/// Owns the save record, its storage and the unlock rules.
///
/// Every mutation runs to completion before returning; collaborators learn
/// about side effects by draining [`ProgressEvent`]s afterwards.
#[derive(Debug)]
pub struct ProgressStore<S> {
    storage: S,
    record: SaveRecord,
    events: EventQueue,
    /// Set by mutations that do not write on their own (play time).
    dirty: bool,
}

impl<S: SaveStorage> ProgressStore<S> {
    /// Creates a store with a default record. Call [`Self::load`] to restore.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            record: SaveRecord::fresh(Utc::now()),
            events: EventQueue::default(),
            dirty: false,
        }
    }

    pub fn open(storage: S) -> (Self, LoadOutcome) {
        let mut store = Self::new(storage);
        let outcome = store.load();
        (store, outcome)
    }

    /// Reads the stored record the way [`Self::load`] does, without touching
    /// storage or queueing events.
    pub fn inspect(storage: &S) -> (SaveRecord, LoadOutcome) {
        let (mut record, outcome) = read_record(storage, Utc::now());
        merge_legacy_skills(storage, &mut record);
        (record, outcome)
    }

    pub fn load(&mut self) -> LoadOutcome {
        let (record, outcome) = read_record(&self.storage, Utc::now());
        self.record = record;
        self.dirty = false;

        let merged = merge_legacy_skills(&self.storage, &mut self.record);
        info!(
            outcome = ?outcome,
            has_save = self.record.has_save(),
            last_screen = ?self.record.last_screen(),
            discovered_skills = self.record.discovered_skills().len(),
            achievements = self.record.unlocked_achievements().len(),
            play_time_seconds = self.record.play_time_seconds(),
            legacy_skills_merged = merged,
            "save_loaded"
        );
        let unlocked = self.check_skill_explorer_completion();
        if merged > 0 && !unlocked {
            self.persist_logged("legacy_skills_merged");
        }
        outcome
    }

    /// Records `screen`, or the active screen when `screen` is `None`.
    ///
    /// The title screen is never recorded so that returning to the menu
    /// cannot overwrite an in-progress save.
    pub fn save_progress(
        &mut self,
        screen: Option<ScreenId>,
        active: &dyn ActiveScreen,
    ) -> SaveOutcome {
        let resolved = screen.or_else(|| active.active_screen());
        if resolved.is_some_and(ScreenId::is_title) {
            debug!(last_screen = ?self.record.last_screen(), "save_rejected_title_screen");
            return SaveOutcome::Rejected(SaveRejection::TitleScreen);
        }

        if let Some(screen) = resolved {
            self.record.last_screen = Some(screen);
            self.record.note_visit(screen);
        }
        self.record.last_save = Some(Utc::now());

        match self.persist() {
            Ok(()) => {
                info!(
                    last_screen = ?self.record.last_screen(),
                    discovered_skills = self.record.discovered_skills().len(),
                    "save_written"
                );
                SaveOutcome::Saved { screen: resolved }
            }
            Err(error) => {
                warn!(error = %error, "save_failed");
                SaveOutcome::Failed(error)
            }
        }
    }

    /// Returns `true` the first time `skill` is discovered.
    pub fn track_skill_discovery(&mut self, skill: SkillId) -> bool {
        if !self.record.discovered_skills.insert(skill) {
            debug!(skill = %skill, "skill_already_discovered");
            return false;
        }

        let (discovered, total) = self.skill_progress();
        info!(skill = %skill, discovered, total, "skill_discovered");
        self.record.last_save = Some(Utc::now());
        self.persist_logged("skill_discovered");
        self.check_skill_explorer_completion();
        true
    }

    /// Returns `true` only for the call that actually unlocks.
    pub fn unlock_achievement(&mut self, achievement: AchievementId) -> bool {
        if self.record.is_unlocked(achievement) {
            return false;
        }

        self.record.unlocked_achievements.push(achievement);
        self.events.push(ProgressEvent::ShowAchievementPopup(
            AchievementPopup::for_achievement(achievement),
        ));
        self.events.push(ProgressEvent::PlaySound(SoundCue::Confirm));
        info!(achievement = %achievement, name = achievement.def().name, "achievement_unlocked");
        self.persist_logged("achievement_unlocked");
        true
    }

    pub fn check_skill_explorer_completion(&mut self) -> bool {
        // The catalog is closed, so a size comparison covers it.
        if self.record.discovered_skills.len() >= SkillId::ALL.len() {
            self.unlock_achievement(AchievementId::SkillExplorer)
        } else {
            false
        }
    }

    pub fn continue_or_start_new_game(&mut self) -> ContinueTarget {
        match self.record.last_screen() {
            Some(screen) if self.record.has_save() => {
                info!(screen = %screen, "continue_game");
                self.events.push(ProgressEvent::NavigateTo(screen));
                self.unlock_achievement(AchievementId::FirstSteps);
                ContinueTarget::Resume(screen)
            }
            _ => ContinueTarget::NewGame(self.start_new_game()),
        }
    }

    pub fn start_new_game(&mut self) -> ScreenId {
        let screen = ScreenId::FIRST_GAMEPLAY;
        info!(screen = %screen, "new_game_started");
        self.events.push(ProgressEvent::NavigateTo(screen));
        screen
    }

    /// Adds play time and returns the new total.
    pub fn advance_clock(&mut self, delta_seconds: u64) -> u64 {
        self.record.play_time_seconds = self
            .record
            .play_time_seconds
            .saturating_add(delta_seconds);
        if delta_seconds > 0 {
            self.dirty = true;
        }
        if self.record.play_time_seconds >= PLAY_TIME_THRESHOLD_SECONDS {
            self.unlock_achievement(AchievementId::CuriousMind);
        }
        self.record.play_time_seconds
    }

    /// Resets to defaults and deletes every stored copy. Irreversible.
    pub fn clear_save(&mut self) -> Result<(), StorageError> {
        self.record = SaveRecord::fresh(Utc::now());
        self.dirty = false;
        let primary = self.storage.remove(SAVE_KEY);
        let legacy = self.storage.remove(LEGACY_SKILLS_KEY);
        for (key, result) in [(SAVE_KEY, &primary), (LEGACY_SKILLS_KEY, &legacy)] {
            if let Err(error) = result {
                warn!(key, error = %error, "save_clear_failed");
            }
        }
        info!("save_cleared");
        primary.and(legacy)
    }

    /// Writes the record if play time changed since the last write.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if !self.dirty {
            return Ok(());
        }
        self.persist()?;
        debug!(play_time_seconds = self.record.play_time_seconds(), "save_flushed");
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<ProgressEvent> {
        self.events.drain()
    }

    pub fn record(&self) -> &SaveRecord {
        &self.record
    }

    pub fn has_save(&self) -> bool {
        self.record.has_save()
    }

    /// Whether a continue entry point should be offered at all.
    pub fn continue_available(&self) -> bool {
        self.record.has_save()
    }

    pub fn continue_label(&self, now: DateTime<Utc>) -> String {
        format!("Continue • {}", save_age_label(self.record.last_save(), now))
    }

    /// `(discovered, total)` over the skill catalog.
    pub fn skill_progress(&self) -> (usize, usize) {
        (self.record.discovered_skills.len(), SkillId::ALL.len())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let result = encode_record(&self.record)
            .map_err(StorageError::Encode)
            .and_then(|encoded| self.storage.set(SAVE_KEY, &encoded));
        // A failed write leaves the record for the next flush.
        self.dirty = result.is_err();
        result
    }

    fn persist_logged(&mut self, reason: &'static str) {
        if let Err(error) = self.persist() {
            warn!(reason, error = %error, "save_failed");
        }
    }
}

/// Never fails: unreadable or corrupt data degrades to a fresh record.
fn read_record<S: SaveStorage + ?Sized>(
    storage: &S,
    now: DateTime<Utc>,
) -> (SaveRecord, LoadOutcome) {
    match storage.get(SAVE_KEY) {
        Ok(None) => (SaveRecord::fresh(now), LoadOutcome::Fresh),
        Ok(Some(raw)) => match decode_persisted(&raw) {
            Ok(persisted) => {
                let (record, report) = migrate(persisted, now);
                (record, LoadOutcome::Restored(report))
            }
            Err(error) => {
                warn!(key = SAVE_KEY, error = %error, "save_load_recovered");
                (SaveRecord::fresh(now), LoadOutcome::Recovered)
            }
        },
        Err(error) => {
            warn!(key = SAVE_KEY, error = %error, "save_load_recovered");
            (SaveRecord::fresh(now), LoadOutcome::Recovered)
        }
    }
}

/// Returns how many skills the legacy key added.
fn merge_legacy_skills<S: SaveStorage + ?Sized>(storage: &S, record: &mut SaveRecord) -> usize {
    let raw = match storage.get(LEGACY_SKILLS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return 0,
        Err(error) => {
            warn!(key = LEGACY_SKILLS_KEY, error = %error, "legacy_skills_unreadable");
            return 0;
        }
    };
    let values = match decode_legacy_skills(&raw) {
        Ok(values) => values,
        Err(error) => {
            warn!(key = LEGACY_SKILLS_KEY, error = %error, "legacy_skills_unreadable");
            return 0;
        }
    };

    let mut report = MigrationReport::default();
    parse_ids::<SkillId>(LEGACY_SKILLS_KEY, Some(values), &mut report)
        .into_iter()
        .filter(|skill| record.discovered_skills.insert(*skill))
        .count()
}

/// Relative age of the last save, as shown on the continue button.
pub fn save_age_label(last_save: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(last_save) = last_save else {
        return "Recently".to_string();
    };
    let minutes = now.signed_duration_since(last_save).num_minutes();
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else {
        "Earlier".to_string()
    }
}
