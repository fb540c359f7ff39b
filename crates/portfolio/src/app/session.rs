use std::time::Duration;

use chrono::Utc;
use progress::{
    AchievementId, ContinueTarget, PlayClock, ProgressEvent, ProgressStore, SaveOutcome,
    SaveStorage, ScreenId, SkillId, SoundCue,
};
use tracing::{info, warn};

use super::audio::AudioPlayer;
use super::notifier::Notifier;
use super::router::ScreenRouter;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SessionCommand {
    Enter(ScreenId),
    Location(ScreenId),
    BackToMenu,
    BackToMap,
    Skill(SkillId),
    Continue,
    NewGame,
    Save,
    Tick(u64),
    Pause,
    Resume,
    Mute(bool),
    Status,
    Skills,
    Achievements,
    ClearSave,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionControl {
    Continue,
    Quit,
}

/// Wires the progress store to its collaborators.
///
/// The store is the single owner of progress state; the router, audio player
/// and notifier only react to the events it emits.
pub(crate) struct Session<S> {
    store: ProgressStore<S>,
    router: ScreenRouter,
    audio: AudioPlayer,
    notifier: Notifier,
    clock: PlayClock,
}

impl<S: SaveStorage> Session<S> {
    pub(crate) fn new(store: ProgressStore<S>, clock: PlayClock) -> Self {
        let mut session = Self {
            store,
            router: ScreenRouter::new(),
            audio: AudioPlayer::default(),
            notifier: Notifier::default(),
            clock,
        };
        session.router.show(ScreenId::Title, &mut session.audio);
        if session.store.continue_available() {
            let label = session.store.continue_label(Utc::now());
            session.notifier.message(label);
        }
        session.dispatch_events();
        session
    }

    pub(crate) fn apply(&mut self, command: SessionCommand) -> SessionControl {
        match command {
            SessionCommand::Enter(screen) => self.enter(screen),
            SessionCommand::Location(screen) => {
                self.audio.play_sound(SoundCue::Select);
                self.enter(screen);
            }
            SessionCommand::BackToMenu => self.enter(ScreenId::Title),
            SessionCommand::BackToMap => self.enter(ScreenId::WorldMap),
            SessionCommand::Skill(skill) => self.open_skill(skill),
            SessionCommand::Continue => {
                let target = self.store.continue_or_start_new_game();
                self.dispatch_events();
                if let ContinueTarget::NewGame(_) = target {
                    self.notifier.message("No saved journey found, starting a new one.");
                }
                self.save_active();
            }
            SessionCommand::NewGame => {
                self.store.start_new_game();
                self.dispatch_events();
                self.save_active();
            }
            SessionCommand::Save => self.save_active(),
            SessionCommand::Tick(seconds) => {
                let total = self.store.advance_clock(seconds);
                self.notifier.message(format!("Play time: {total}s"));
            }
            SessionCommand::Pause => {
                self.clock.set_active(false);
                self.notifier.message("Play time paused.");
            }
            SessionCommand::Resume => {
                self.clock.set_active(true);
                self.notifier.message("Play time resumed.");
            }
            SessionCommand::Mute(muted) => self.audio.set_muted(muted),
            SessionCommand::Status => self.report_status(),
            SessionCommand::Skills => self.report_skills(),
            SessionCommand::Achievements => self.report_achievements(),
            SessionCommand::ClearSave => {
                match self.store.clear_save() {
                    Ok(()) => self.notifier.message("Save data cleared."),
                    Err(error) => self
                        .notifier
                        .message(format!("Save data cleared in memory only: {error}")),
                }
            }
            SessionCommand::Quit => {
                info!(
                    play_time_seconds = self.store.record().play_time_seconds(),
                    sound_cues = self.audio.cues_played(),
                    "session_quit"
                );
                self.shutdown();
                self.dispatch_events();
                return SessionControl::Quit;
            }
        }
        self.dispatch_events();
        SessionControl::Continue
    }

    /// Feeds wall time to the play clock and converts whole seconds into ticks.
    pub(crate) fn advance_wall_time(&mut self, elapsed: Duration) {
        let seconds = self.clock.advance(elapsed);
        if seconds > 0 {
            self.store.advance_clock(seconds);
            self.dispatch_events();
        }
    }

    /// Writes progress that has not reached storage yet, such as play time.
    pub(crate) fn shutdown(&mut self) {
        if let Err(error) = self.store.flush() {
            warn!(error = %error, "session_flush_failed");
        }
    }

    pub(crate) fn drain_output(&mut self) -> Vec<String> {
        self.notifier.drain_lines()
    }

    pub(crate) fn active_screen(&self) -> ScreenId {
        self.router.active()
    }

    pub(crate) fn store(&self) -> &ProgressStore<S> {
        &self.store
    }

    fn enter(&mut self, screen: ScreenId) {
        self.router.show(screen, &mut self.audio);
        self.record_save(Some(screen));
    }

    fn save_active(&mut self) {
        self.record_save(None);
    }

    fn record_save(&mut self, screen: Option<ScreenId>) {
        match self.store.save_progress(screen, &self.router) {
            SaveOutcome::Saved { .. } | SaveOutcome::Rejected(_) => {}
            SaveOutcome::Failed(error) => {
                warn!(error = %error, "session_save_failed");
                self.notifier
                    .message("Progress could not be saved; continuing without saving.");
            }
        }
    }

    fn open_skill(&mut self, skill: SkillId) {
        self.notifier.skill_details(skill.def());
        if self.store.track_skill_discovery(skill) {
            let (discovered, total) = self.store.skill_progress();
            self.notifier
                .message(format!("Skills discovered: {discovered}/{total}"));
        }
    }

    fn dispatch_events(&mut self) {
        for event in self.store.drain_events() {
            match event {
                ProgressEvent::PlaySound(cue) => self.audio.play_sound(cue),
                ProgressEvent::ShowAchievementPopup(popup) => {
                    self.notifier.achievement_popup(&popup)
                }
                ProgressEvent::NavigateTo(screen) => self.router.show(screen, &mut self.audio),
            }
        }
    }

    fn report_status(&mut self) {
        let record = self.store.record();
        let (discovered, total_skills) = self.store.skill_progress();
        let last_screen = record
            .last_screen()
            .map(ScreenId::as_str)
            .unwrap_or("none");
        let continue_text = if self.store.continue_available() {
            self.store.continue_label(Utc::now())
        } else {
            "Continue unavailable".to_string()
        };
        let line = format!(
            "screen={} last_screen={} has_save={} play_time={}s skills={}/{} achievements={}/{} music={} muted={} clock={} | {}",
            self.active_screen(),
            last_screen,
            record.has_save(),
            record.play_time_seconds(),
            discovered,
            total_skills,
            record.unlocked_achievements().len(),
            AchievementId::ALL.len(),
            self.audio.current_track().unwrap_or("none"),
            self.audio.is_muted(),
            if self.clock.is_active() { "running" } else { "paused" },
            continue_text,
        );
        self.notifier.message(line);
    }

    fn report_skills(&mut self) {
        let discovered = self.store.record().discovered_skills();
        let lines = SkillId::ALL
            .iter()
            .map(|skill| {
                let mark = if discovered.contains(skill) { "x" } else { " " };
                format!("[{mark}] {} {}", skill, skill.def().title)
            })
            .collect::<Vec<_>>();
        for line in lines {
            self.notifier.message(line);
        }
    }

    fn report_achievements(&mut self) {
        let lines = AchievementId::ALL
            .iter()
            .map(|achievement| {
                let def = achievement.def();
                let mark = if self.store.record().is_unlocked(*achievement) {
                    "x"
                } else {
                    " "
                };
                format!("[{mark}] {} {} - {}", def.icon, def.name, def.description)
            })
            .collect::<Vec<_>>();
        for line in lines {
            self.notifier.message(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress::{MemoryStorage, SAVE_KEY};

    fn session() -> Session<MemoryStorage> {
        Session::new(ProgressStore::new(MemoryStorage::new()), PlayClock::default())
    }

    fn achievement_lines(lines: &[String]) -> Vec<&String> {
        lines
            .iter()
            .filter(|line| line.starts_with("Achievement Unlocked!"))
            .collect()
    }

    #[test]
    fn entering_a_location_records_it() {
        let mut session = session();

        session.apply(SessionCommand::Location(ScreenId::Forest));

        assert_eq!(session.active_screen(), ScreenId::Forest);
        assert_eq!(session.store().record().last_screen(), Some(ScreenId::Forest));
        assert!(session.store().storage().contains_key(SAVE_KEY));
    }

    #[test]
    fn back_to_menu_keeps_last_gameplay_screen() {
        let mut session = session();
        session.apply(SessionCommand::Enter(ScreenId::Dungeon));

        session.apply(SessionCommand::BackToMenu);

        assert_eq!(session.active_screen(), ScreenId::Title);
        assert_eq!(session.store().record().last_screen(), Some(ScreenId::Dungeon));
    }

    #[test]
    fn continue_resumes_saved_screen_and_shows_first_steps_once() {
        let mut session = session();
        session.apply(SessionCommand::Enter(ScreenId::Tower));
        session.apply(SessionCommand::BackToMenu);
        session.drain_output();

        session.apply(SessionCommand::Continue);
        let first = session.drain_output();
        session.apply(SessionCommand::BackToMenu);
        session.apply(SessionCommand::Continue);
        let second = session.drain_output();

        assert_eq!(session.active_screen(), ScreenId::Tower);
        assert_eq!(
            achievement_lines(&first),
            vec!["Achievement Unlocked! 👣 First Steps - Start your journey"]
        );
        assert!(achievement_lines(&second).is_empty());
    }

    #[test]
    fn continue_without_save_starts_on_world_map() {
        let mut session = session();

        session.apply(SessionCommand::Continue);

        assert_eq!(session.active_screen(), ScreenId::WorldMap);
        assert_eq!(
            session.store().record().last_screen(),
            Some(ScreenId::WorldMap)
        );
        assert!(!session
            .store()
            .record()
            .is_unlocked(AchievementId::FirstSteps));
    }

    #[test]
    fn discovering_every_skill_shows_skill_explorer() {
        let mut session = session();
        session.apply(SessionCommand::Enter(ScreenId::Forest));
        for skill in SkillId::ALL {
            session.apply(SessionCommand::Skill(skill));
        }
        session.apply(SessionCommand::Skill(SkillId::Ux));

        let output = session.drain_output();
        assert_eq!(
            achievement_lines(&output),
            vec!["Achievement Unlocked! 🔍 Skill Explorer - Discover all skills in the Skills Forest"]
        );
        assert!(output.iter().any(|line| line == "Skills discovered: 5/5"));
    }

    #[test]
    fn wall_time_accrues_only_while_running() {
        let mut session = session();

        session.advance_wall_time(Duration::from_millis(2500));
        session.apply(SessionCommand::Pause);
        session.advance_wall_time(Duration::from_secs(4));
        session.apply(SessionCommand::Resume);
        session.advance_wall_time(Duration::from_millis(600));

        // The half second carried before the pause is discarded.
        assert_eq!(session.store().record().play_time_seconds(), 2);
    }

    #[test]
    fn tick_past_threshold_shows_curious_mind() {
        let mut session = session();

        session.apply(SessionCommand::Tick(299));
        assert!(achievement_lines(&session.drain_output()).is_empty());
        session.apply(SessionCommand::Tick(1));
        session.apply(SessionCommand::Tick(1));

        let output = session.drain_output();
        assert_eq!(
            achievement_lines(&output),
            vec!["Achievement Unlocked! 📚 Curious Mind - Spend 5 minutes exploring"]
        );
    }

    #[test]
    fn failed_write_is_reported_and_session_continues() {
        let mut session = session();
        session.store.storage_mut().set_fail_writes(true);

        let control = session.apply(SessionCommand::Enter(ScreenId::Village));

        assert_eq!(control, SessionControl::Continue);
        assert_eq!(session.store().record().last_screen(), Some(ScreenId::Village));
        assert!(session
            .drain_output()
            .iter()
            .any(|line| line.starts_with("Progress could not be saved")));
    }

    #[test]
    fn clear_save_returns_to_fresh_state() {
        let mut session = session();
        session.apply(SessionCommand::Enter(ScreenId::Village));
        session.apply(SessionCommand::Skill(SkillId::Backend));

        session.apply(SessionCommand::ClearSave);

        assert!(!session.store().has_save());
        assert!(session.store().record().discovered_skills().is_empty());
        assert!(!session.store().storage().contains_key(SAVE_KEY));
    }

    #[test]
    fn status_summarises_progress() {
        let mut session = session();
        session.apply(SessionCommand::Enter(ScreenId::Village));
        session.drain_output();

        session.apply(SessionCommand::Status);

        let output = session.drain_output();
        assert_eq!(output.len(), 1);
        assert!(output[0].starts_with(
            "screen=village last_screen=village has_save=true play_time=0s skills=0/5 achievements=0/3 music=village muted=false clock=running | Continue • "
        ));
    }

    #[test]
    fn quit_writes_play_time_earned_on_the_title_screen() {
        let mut session = session();
        session.apply(SessionCommand::Enter(ScreenId::Forest));
        session.apply(SessionCommand::Tick(250));
        session.apply(SessionCommand::BackToMenu);

        session.apply(SessionCommand::Quit);

        let (reloaded, _) = ProgressStore::open(session.store.into_storage());
        assert_eq!(reloaded.record().play_time_seconds(), 250);
        assert_eq!(reloaded.record().last_screen(), Some(ScreenId::Forest));
    }

    #[test]
    fn quit_stops_the_session() {
        let mut session = session();
        assert_eq!(session.apply(SessionCommand::Quit), SessionControl::Quit);
    }
}
