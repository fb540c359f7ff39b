use std::fmt;
use std::str::FromStr;

use super::UnknownIdError;

/// Cumulative play time that unlocks [`AchievementId::CuriousMind`].
pub const PLAY_TIME_THRESHOLD_SECONDS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AchievementId {
    FirstSteps,
    SkillExplorer,
    CuriousMind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockTrigger {
    /// Unlocked by an explicit user action.
    Manual,
    /// Every skill in the catalog has been discovered.
    AllSkillsDiscovered,
    /// Play time reached the given number of seconds.
    PlayTime { seconds: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub trigger: UnlockTrigger,
}

const ACHIEVEMENT_DEFS: [AchievementDef; 3] = [
    AchievementDef {
        id: AchievementId::FirstSteps,
        name: "First Steps",
        description: "Start your journey",
        icon: "👣",
        trigger: UnlockTrigger::Manual,
    },
    AchievementDef {
        id: AchievementId::SkillExplorer,
        name: "Skill Explorer",
        description: "Discover all skills in the Skills Forest",
        icon: "🔍",
        trigger: UnlockTrigger::AllSkillsDiscovered,
    },
    AchievementDef {
        id: AchievementId::CuriousMind,
        name: "Curious Mind",
        description: "Spend 5 minutes exploring",
        icon: "📚",
        trigger: UnlockTrigger::PlayTime {
            seconds: PLAY_TIME_THRESHOLD_SECONDS,
        },
    },
];

impl AchievementId {
    pub const ALL: [AchievementId; 3] = [
        AchievementId::FirstSteps,
        AchievementId::SkillExplorer,
        AchievementId::CuriousMind,
    ];

    /// Persisted identifier. Curious Mind keeps its historical `portfolioReader` key.
    pub fn as_str(self) -> &'static str {
        match self {
            AchievementId::FirstSteps => "firstSteps",
            AchievementId::SkillExplorer => "skillExplorer",
            AchievementId::CuriousMind => "portfolioReader",
        }
    }

    pub fn def(self) -> &'static AchievementDef {
        &ACHIEVEMENT_DEFS[self as usize]
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementId {
    type Err = UnknownIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AchievementId::ALL
            .into_iter()
            .find(|achievement| achievement.as_str() == value)
            .ok_or_else(|| {
                UnknownIdError::new(
                    "achievement",
                    value,
                    AchievementId::ALL.map(AchievementId::as_str),
                )
            })
    }
}
