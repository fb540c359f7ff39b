use std::fmt;
use std::str::FromStr;

use super::UnknownIdError;

/// Mutually exclusive portfolio panels. Only one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScreenId {
    Title,
    WorldMap,
    Village,
    Forest,
    Dungeon,
    Tower,
    Settings,
}

impl ScreenId {
    pub const ALL: [ScreenId; 7] = [
        ScreenId::Title,
        ScreenId::WorldMap,
        ScreenId::Village,
        ScreenId::Forest,
        ScreenId::Dungeon,
        ScreenId::Tower,
        ScreenId::Settings,
    ];

    /// Where a fresh game lands.
    pub const FIRST_GAMEPLAY: ScreenId = ScreenId::WorldMap;

    pub fn as_str(self) -> &'static str {
        match self {
            ScreenId::Title => "title-screen",
            ScreenId::WorldMap => "world-map",
            ScreenId::Village => "village",
            ScreenId::Forest => "forest",
            ScreenId::Dungeon => "dungeon",
            ScreenId::Tower => "tower",
            ScreenId::Settings => "settings",
        }
    }

    pub fn is_title(self) -> bool {
        self == ScreenId::Title
    }

    pub fn music_track(self) -> &'static str {
        match self {
            ScreenId::Title | ScreenId::Settings => "title-theme",
            ScreenId::WorldMap => "world-map",
            ScreenId::Village => "village",
            ScreenId::Forest => "forest",
            ScreenId::Dungeon => "dungeon",
            ScreenId::Tower => "tower",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreenId {
    type Err = UnknownIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ScreenId::ALL
            .into_iter()
            .find(|screen| screen.as_str() == value)
            .ok_or_else(|| {
                UnknownIdError::new("screen", value, ScreenId::ALL.map(ScreenId::as_str))
            })
    }
}
