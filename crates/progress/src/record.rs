use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::catalog::{AchievementId, ScreenId, SkillId};

/// Storage key of the save record.
pub const SAVE_KEY: &str = "rpgPortfolioSave";
/// Storage key an earlier revision used to track discovered skills on its own.
pub const LEGACY_SKILLS_KEY: &str = "skillsDiscovered";
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Progress of one profile. `last_screen` is never the title screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRecord {
    pub(crate) last_screen: Option<ScreenId>,
    pub(crate) visited_locations: Vec<ScreenId>,
    pub(crate) unlocked_achievements: Vec<AchievementId>,
    pub(crate) discovered_skills: BTreeSet<SkillId>,
    pub(crate) play_time_seconds: u64,
    pub(crate) first_visit: DateTime<Utc>,
    pub(crate) last_save: Option<DateTime<Utc>>,
}

impl SaveRecord {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            last_screen: None,
            visited_locations: Vec::new(),
            unlocked_achievements: Vec::new(),
            discovered_skills: BTreeSet::new(),
            play_time_seconds: 0,
            first_visit: now,
            last_save: None,
        }
    }

    pub fn last_screen(&self) -> Option<ScreenId> {
        self.last_screen
    }

    pub fn has_save(&self) -> bool {
        self.last_screen.is_some_and(|screen| !screen.is_title())
    }

    pub fn visited_locations(&self) -> &[ScreenId] {
        &self.visited_locations
    }

    /// Unlocked achievements in unlock order.
    pub fn unlocked_achievements(&self) -> &[AchievementId] {
        &self.unlocked_achievements
    }

    pub fn is_unlocked(&self, achievement: AchievementId) -> bool {
        self.unlocked_achievements.contains(&achievement)
    }

    pub fn discovered_skills(&self) -> &BTreeSet<SkillId> {
        &self.discovered_skills
    }

    pub fn play_time_seconds(&self) -> u64 {
        self.play_time_seconds
    }

    pub fn first_visit(&self) -> DateTime<Utc> {
        self.first_visit
    }

    pub fn last_save(&self) -> Option<DateTime<Utc>> {
        self.last_save
    }

    pub(crate) fn note_visit(&mut self, screen: ScreenId) {
        if !screen.is_title() && !self.visited_locations.contains(&screen) {
            self.visited_locations.push(screen);
        }
    }
}

/// Wire form. Every field is optional so older or partial payloads still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct PersistedSave {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_screen: Option<String>,
    visited_locations: Option<Vec<String>>,
    achievements: Option<Vec<String>>,
    discovered_skills: Option<Vec<String>>,
    play_time: Option<u64>,
    first_visit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_save: Option<String>,
    /// Written for older readers; recomputed from `lastScreen` on load.
    has_save: Option<bool>,
}

#[derive(Debug, Error)]
pub enum RecordDecodeError {
    #[error("parse save json: {source}")]
    Syntax {
        #[source]
        source: serde_json::Error,
    },
    #[error("parse save json at {path}: {source}")]
    Field {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Counts of persisted entries the migration could not keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub source_version: Option<u32>,
    pub dropped_entries: usize,
    pub defaulted_fields: usize,
}

pub(crate) fn encode_record(record: &SaveRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(&to_persisted(record))
}

pub fn encode_record_pretty(record: &SaveRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_persisted(record))
}

fn to_persisted(record: &SaveRecord) -> PersistedSave {
    PersistedSave {
        version: Some(SAVE_FORMAT_VERSION),
        last_screen: record.last_screen.map(|screen| screen.as_str().to_string()),
        visited_locations: Some(
            record
                .visited_locations
                .iter()
                .map(|screen| screen.as_str().to_string())
                .collect(),
        ),
        achievements: Some(
            record
                .unlocked_achievements
                .iter()
                .map(|achievement| achievement.as_str().to_string())
                .collect(),
        ),
        discovered_skills: Some(
            record
                .discovered_skills
                .iter()
                .map(|skill| skill.as_str().to_string())
                .collect(),
        ),
        play_time: Some(record.play_time_seconds),
        first_visit: Some(format_timestamp(record.first_visit)),
        last_save: record.last_save.map(format_timestamp),
        has_save: Some(record.has_save()),
    }
}

pub(crate) fn decode_persisted(raw: &str) -> Result<PersistedSave, RecordDecodeError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, PersistedSave>(&mut deserializer) {
        Ok(save) => Ok(save),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(RecordDecodeError::Syntax { source })
            } else {
                Err(RecordDecodeError::Field { path, source })
            }
        }
    }
}

pub(crate) fn decode_legacy_skills(raw: &str) -> Result<Vec<String>, RecordDecodeError> {
    serde_json::from_str::<Vec<String>>(raw).map_err(|source| RecordDecodeError::Syntax { source })
}

/// Builds the canonical record from a partial one, falling back field by field.
pub(crate) fn migrate(save: PersistedSave, now: DateTime<Utc>) -> (SaveRecord, MigrationReport) {
    let mut report = MigrationReport {
        source_version: save.version,
        ..MigrationReport::default()
    };
    if let Some(version) = save.version {
        if version > SAVE_FORMAT_VERSION {
            warn!(
                version,
                supported = SAVE_FORMAT_VERSION,
                "save_version_newer_than_supported"
            );
        }
    }

    let mut record = SaveRecord::fresh(now);

    record.last_screen = match save.last_screen.as_deref() {
        None => None,
        Some(raw) => match ScreenId::from_str(raw) {
            Ok(screen) if !screen.is_title() => Some(screen),
            Ok(_) => None,
            Err(error) => {
                warn!(field = "lastScreen", error = %error, "save_entry_dropped");
                report.dropped_entries += 1;
                None
            }
        },
    };

    for screen in parse_ids::<ScreenId>("visitedLocations", save.visited_locations, &mut report) {
        record.note_visit(screen);
    }

    for achievement in parse_ids::<AchievementId>("achievements", save.achievements, &mut report)
    {
        if !record.unlocked_achievements.contains(&achievement) {
            record.unlocked_achievements.push(achievement);
        }
    }

    record.discovered_skills =
        parse_ids::<SkillId>("discoveredSkills", save.discovered_skills, &mut report)
            .into_iter()
            .collect();

    match save.play_time {
        Some(seconds) => record.play_time_seconds = seconds,
        None => report.defaulted_fields += 1,
    }

    match save.first_visit.as_deref().map(parse_timestamp) {
        Some(Some(first_visit)) => record.first_visit = first_visit,
        Some(None) => {
            warn!(field = "firstVisit", "save_timestamp_invalid");
            report.defaulted_fields += 1;
        }
        None => report.defaulted_fields += 1,
    }

    record.last_save = match save.last_save.as_deref().map(parse_timestamp) {
        Some(Some(last_save)) => Some(last_save),
        Some(None) => {
            warn!(field = "lastSave", "save_timestamp_invalid");
            report.defaulted_fields += 1;
            None
        }
        None => None,
    };

    (record, report)
}

pub(crate) fn parse_ids<T>(
    field: &'static str,
    raw: Option<Vec<String>>,
    report: &mut MigrationReport,
) -> Vec<T>
where
    T: FromStr<Err = crate::catalog::UnknownIdError>,
{
    let Some(raw) = raw else {
        report.defaulted_fields += 1;
        return Vec::new();
    };
    let mut parsed = Vec::with_capacity(raw.len());
    for value in raw {
        match value.parse::<T>() {
            Ok(id) => parsed.push(id),
            Err(error) => {
                warn!(field, error = %error, "save_entry_dropped");
                report.dropped_entries += 1;
            }
        }
    }
    parsed
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}
