use std::collections::VecDeque;

use tracing::warn;

use crate::catalog::{AchievementId, ScreenId};

const MAX_PENDING_EVENTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Select,
    Confirm,
}

impl SoundCue {
    pub fn as_str(self) -> &'static str {
        match self {
            SoundCue::Select => "select",
            SoundCue::Confirm => "confirm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementPopup {
    pub achievement: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

impl AchievementPopup {
    pub fn for_achievement(achievement: AchievementId) -> Self {
        let def = achievement.def();
        Self {
            achievement,
            name: def.name,
            description: def.description,
            icon: def.icon,
        }
    }
}

/// One-way notifications from the store to its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    PlaySound(SoundCue),
    ShowAchievementPopup(AchievementPopup),
    NavigateTo(ScreenId),
}

#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    pending: VecDeque<ProgressEvent>,
}

impl EventQueue {
    pub(crate) fn push(&mut self, event: ProgressEvent) {
        if self.pending.len() == MAX_PENDING_EVENTS {
            if let Some(dropped) = self.pending.pop_front() {
                warn!(event = ?dropped, "progress_event_dropped");
            }
        }
        self.pending.push_back(event);
    }

    pub(crate) fn drain(&mut self) -> Vec<ProgressEvent> {
        self.pending.drain(..).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}
