//! Application configuration.
//!
//! Compile-time defaults live here as constants. [`Settings::load`] layers
//! `config.toml` and the environment (including `.env`) on top, with the
//! priority config.toml > environment > default.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::srs::{SchedulerConfig, SchedulerConfigError};

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Session Configuration ====================

/// Session expiration time in hours
pub const SESSION_EXPIRY_HOURS: i64 = 1;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

/// Length of generated session ids
pub const SESSION_ID_LEN: usize = 32;

/// Live review sessions kept at once; the least recently used is evicted beyond this
pub const MAX_LIVE_SESSIONS: usize = 10_000;

// ==================== File Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database: Option<DatabaseSection>,
    server: Option<ServerSection>,
    session: Option<SessionSection>,
    scheduler: Option<SchedulerConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct SessionSection {
    expiry_hours: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("session expiry must be at least one hour, got {0}")]
    InvalidExpiry(i64),
    #[error("invalid scheduler config: {0}")]
    Scheduler(#[from] SchedulerConfigError),
}

/// Resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    pub server_addr: String,
    pub server_port: u16,
    pub session_expiry_hours: i64,
    pub scheduler: SchedulerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: paths::default_db_path(),
            server_addr: SERVER_ADDR.to_string(),
            server_port: SERVER_PORT,
            session_expiry_hours: SESSION_EXPIRY_HOURS,
            scheduler: SchedulerConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

impl Settings {
    /// Load settings from `config.toml`, `.env` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new(paths::CONFIG_FILE), |name| std::env::var(name).ok())
    }

    /// Load with an explicit config file and environment lookup.
    ///
    /// A missing config file is not an error; an unreadable or malformed one is.
    pub fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let file = match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str::<FileConfig>(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut settings = Settings::default();

        // Priority 1: config.toml, Priority 2: environment
        match file.database.and_then(|db| db.path) {
            Some(db_path) => {
                tracing::info!("Using database from {}: {}", path.display(), db_path);
                settings.database_path = PathBuf::from(db_path);
            }
            None => {
                if let Some(db_path) = env("DATABASE_PATH") {
                    tracing::info!("Using database from DATABASE_PATH env: {}", db_path);
                    settings.database_path = PathBuf::from(db_path);
                }
            }
        }

        let server = file.server.unwrap_or(ServerSection { addr: None, port: None });
        if let Some(addr) = server.addr {
            settings.server_addr = addr;
        }
        match server.port {
            Some(port) => settings.server_port = port,
            None => {
                if let Some(port) = env("PORT") {
                    settings.server_port = parse_env("PORT", port)?;
                }
            }
        }

        if let Some(hours) = file.session.and_then(|s| s.expiry_hours) {
            settings.session_expiry_hours = hours;
        }
        if settings.session_expiry_hours < 1 {
            return Err(ConfigError::InvalidExpiry(settings.session_expiry_hours));
        }

        match file.scheduler {
            Some(scheduler) => settings.scheduler = scheduler,
            None => {
                if let Some(cap) = env("MAX_INTERVAL_DAYS") {
                    settings.scheduler.max_interval_days = parse_env("MAX_INTERVAL_DAYS", cap)?;
                }
            }
        }
        settings.scheduler.validate()?;

        tracing::debug!(
            "Settings resolved: db={}, bind={}, expiry={}h, cap={}d",
            settings.database_path.display(),
            settings.bind_addr(),
            settings.session_expiry_hours,
            settings.scheduler.max_interval_days
        );
        Ok(settings)
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }
}
