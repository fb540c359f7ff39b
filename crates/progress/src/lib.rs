use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod catalog;
mod clock;
pub mod events;
mod record;
pub mod storage;
mod store;

pub use catalog::{
    AchievementDef, AchievementId, ScreenId, SkillDef, SkillId, UnknownIdError, UnlockTrigger,
    PLAY_TIME_THRESHOLD_SECONDS,
};
pub use clock::PlayClock;
pub use events::{AchievementPopup, ProgressEvent, SoundCue};
pub use record::{
    encode_record_pretty, MigrationReport, RecordDecodeError, SaveRecord, LEGACY_SKILLS_KEY,
    SAVE_FORMAT_VERSION, SAVE_KEY,
};
pub use storage::{FileStorage, MemoryStorage, SaveStorage, StorageError};
pub use store::{
    save_age_label, ActiveScreen, ContinueTarget, LoadOutcome, NoActiveScreen, ProgressStore,
    SaveOutcome, SaveRejection,
};

pub const SAVE_DIR_ENV_VAR: &str = "QUESTFOLIO_SAVE_DIR";
const DEFAULT_SAVE_DIR_NAME: &str = "saves";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("save path exists but is not a directory: {path}")]
    NotADirectory { path: PathBuf },
    #[error("failed to create save directory at {path}: {source}")]
    CreateSaveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves the save directory from `QUESTFOLIO_SAVE_DIR`, falling back to
/// `./saves`, and makes sure it exists.
pub fn resolve_save_dir() -> Result<PathBuf, StartupError> {
    ensure_save_dir(&save_dir_from_env()?)
}

/// Same lookup as [`resolve_save_dir`], without touching the filesystem.
pub fn save_dir_from_env() -> Result<PathBuf, StartupError> {
    match env::var(SAVE_DIR_ENV_VAR) {
        Ok(value) => Ok(PathBuf::from(value)),
        Err(env::VarError::NotPresent) => Ok(env::current_dir()
            .map_err(StartupError::CurrentDir)?
            .join(DEFAULT_SAVE_DIR_NAME)),
        Err(source) => Err(StartupError::EnvVar {
            var: SAVE_DIR_ENV_VAR,
            source,
        }),
    }
}

pub fn ensure_save_dir(dir: &Path) -> Result<PathBuf, StartupError> {
    if dir.exists() && !dir.is_dir() {
        return Err(StartupError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    fs::create_dir_all(dir).map_err(|source| StartupError::CreateSaveDir {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(normalize_path(dir))
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
