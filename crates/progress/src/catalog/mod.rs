mod achievement;
mod screen;
mod skill;

use thiserror::Error;

pub use achievement::{AchievementDef, AchievementId, UnlockTrigger, PLAY_TIME_THRESHOLD_SECONDS};
pub use screen::ScreenId;
pub use skill::{SkillDef, SkillId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} id '{value}' (expected one of: {expected})")]
pub struct UnknownIdError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl UnknownIdError {
    pub(crate) fn new<'a>(
        kind: &'static str,
        value: &str,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: known.into_iter().collect::<Vec<_>>().join("|"),
        }
    }
}
