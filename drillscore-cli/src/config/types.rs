use drillscore_core::{AuthConfig, DuplicateStartPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default port for the drillscore server
pub const DEFAULT_PORT: u16 = drillscore_server::DEFAULT_PORT;
/// Default host for the drillscore server
pub const DEFAULT_HOST: &str = drillscore_server::DEFAULT_HOST;
/// Default idle timeout for live sessions (seconds)
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 2 * 60 * 60;
/// Default idle sweep interval (seconds)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
/// Default SQLite file name, relative to the user data dir
pub const DEFAULT_DB_FILE: &str = "history.db";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDrillscoreConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub sessions: RawSessionsConfig,

    #[serde(default)]
    pub storage: RawStorageConfig,

    #[serde(default)]
    pub auth: RawAuthConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSessionsConfig {
    /// 0 disables the idle sweep
    pub idle_timeout_secs: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
    pub duplicate_start: Option<DuplicateStartPolicy>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStorageConfig {
    pub backend: Option<StorageBackend>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAuthConfig {
    pub enabled: Option<bool>,
    pub jwt_secret: Option<String>,
    pub principal_header: Option<String>,
    pub clock_skew_seconds: Option<u64>,
}

/// Where finalized sessions are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DrillscoreConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub sessions: SessionsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port for the drillscore server
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Seconds without activity before a live session is discarded (0 disables)
    pub idle_timeout_secs: u64,

    /// Seconds between idle sweeps
    pub sweep_interval_secs: u64,

    /// What a second start for a live session does
    pub duplicate_start: DuplicateStartPolicy,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            duplicate_start: DuplicateStartPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// SQLite database file; defaults to the user data dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}
