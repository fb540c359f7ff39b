use progress::{ActiveScreen, ScreenId};
use tracing::info;

use super::audio::AudioPlayer;

/// Tracks which screen is shown. Exactly one screen is active at a time.
#[derive(Debug)]
pub(crate) struct ScreenRouter {
    active: ScreenId,
}

impl ScreenRouter {
    pub(crate) fn new() -> Self {
        Self {
            active: ScreenId::Title,
        }
    }

    pub(crate) fn active(&self) -> ScreenId {
        self.active
    }

    pub(crate) fn show(&mut self, screen: ScreenId, audio: &mut AudioPlayer) {
        let previous = std::mem::replace(&mut self.active, screen);
        info!(from = %previous, to = %screen, "screen_shown");
        audio.play_music(screen.music_track());
    }
}

impl ActiveScreen for ScreenRouter {
    fn active_screen(&self) -> Option<ScreenId> {
        Some(self.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_starts_on_title_and_switches_music() {
        let mut router = ScreenRouter::new();
        let mut audio = AudioPlayer::default();
        assert_eq!(router.active_screen(), Some(ScreenId::Title));

        router.show(ScreenId::Settings, &mut audio);

        assert_eq!(router.active(), ScreenId::Settings);
        assert_eq!(audio.current_track(), Some("title-theme"));
    }
}
