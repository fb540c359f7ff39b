use progress::SoundCue;
use tracing::{debug, info};

/// Fire-and-forget audio sink. Nothing here feeds back into progress.
#[derive(Debug, Default)]
pub(crate) struct AudioPlayer {
    muted: bool,
    current_track: Option<&'static str>,
    cues_played: u32,
}

impl AudioPlayer {
    pub(crate) fn play_sound(&mut self, cue: SoundCue) {
        if self.muted {
            debug!(cue = cue.as_str(), "sound_skipped_muted");
            return;
        }
        self.cues_played = self.cues_played.saturating_add(1);
        info!(cue = cue.as_str(), "sound_played");
    }

    /// Restarting the track that is already playing is a no-op.
    pub(crate) fn play_music(&mut self, track: &'static str) {
        if self.current_track == Some(track) {
            return;
        }
        self.current_track = Some(track);
        info!(track, muted = self.muted, "music_changed");
    }

    pub(crate) fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        info!(muted, "audio_mute_changed");
    }

    pub(crate) fn is_muted(&self) -> bool {
        self.muted
    }

    pub(crate) fn current_track(&self) -> Option<&'static str> {
        self.current_track
    }

    pub(crate) fn cues_played(&self) -> u32 {
        self.cues_played
    }
}
