use std::env;
use std::time::Duration;

use progress::{
    resolve_save_dir, FileStorage, MemoryStorage, PlayClock, ProgressStore, SaveStorage,
    StartupError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::session::Session;

const STORAGE_ENV_VAR: &str = "QUESTFOLIO_STORAGE";
const MAX_CLOCK_STEP_ENV_VAR: &str = "QUESTFOLIO_MAX_CLOCK_STEP_SECS";
const DEFAULT_MAX_CLOCK_STEP: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StorageMode {
    File,
    Memory,
}

#[derive(Debug, Clone)]
pub(crate) struct SessionConfig {
    pub(crate) storage_mode: StorageMode,
    pub(crate) max_clock_step: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::File,
            max_clock_step: DEFAULT_MAX_CLOCK_STEP,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("invalid {var} value '{value}' (expected {expected})")]
    InvalidEnv {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

pub(crate) struct AppWiring {
    pub(crate) session: Session<Box<dyn SaveStorage>>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Questfolio Startup ===");

    let config = SessionConfig {
        storage_mode: parse_storage_mode(env::var(STORAGE_ENV_VAR).ok().as_deref())?,
        max_clock_step: parse_max_clock_step(env::var(MAX_CLOCK_STEP_ENV_VAR).ok().as_deref())?,
    };
    info!(
        storage_mode = ?config.storage_mode,
        max_clock_step_secs = config.max_clock_step.as_secs(),
        "session_config"
    );

    let storage: Box<dyn SaveStorage> = match config.storage_mode {
        StorageMode::File => {
            let save_dir = resolve_save_dir()?;
            info!(save_dir = %save_dir.display(), "save_storage_ready");
            Box::new(FileStorage::new(save_dir))
        }
        StorageMode::Memory => Box::new(MemoryStorage::new()),
    };
    let (store, outcome) = ProgressStore::open(storage);
    info!(outcome = ?outcome, has_save = store.has_save(), "progress_store_opened");

    Ok(AppWiring {
        session: Session::new(store, PlayClock::new(config.max_clock_step)),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn parse_storage_mode(raw: Option<&str>) -> Result<StorageMode, BootstrapError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(SessionConfig::default().storage_mode),
        Some(value) if value.eq_ignore_ascii_case("file") => Ok(StorageMode::File),
        Some(value) if value.eq_ignore_ascii_case("memory") => Ok(StorageMode::Memory),
        Some(value) => Err(BootstrapError::InvalidEnv {
            var: STORAGE_ENV_VAR,
            value: value.to_string(),
            expected: "file|memory",
        }),
    }
}

fn parse_max_clock_step(raw: Option<&str>) -> Result<Duration, BootstrapError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(SessionConfig::default().max_clock_step),
        Some(value) => value
            .parse::<u64>()
            .ok()
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| BootstrapError::InvalidEnv {
                var: MAX_CLOCK_STEP_ENV_VAR,
                value: value.to_string(),
                expected: "positive integer seconds",
            }),
    }
}
