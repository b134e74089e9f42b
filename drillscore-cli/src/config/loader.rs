use super::types::{
    DEFAULT_DB_FILE, DEFAULT_HOST, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_PORT,
    DEFAULT_SWEEP_INTERVAL_SECS, DrillscoreConfig, RawAuthConfig, RawDrillscoreConfig,
    RawServerConfig, RawSessionsConfig, RawStorageConfig, ServerConfig, SessionsConfig,
    StorageConfig,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use drillscore_core::AuthConfig;
use std::path::{Path, PathBuf};

/// Overrides the project config directory (useful for isolated tests)
pub const PROJECT_CONFIG_DIR_ENV: &str = "DRILLSCORE_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<DrillscoreConfig> {
        let mut raw = RawDrillscoreConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path()
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        Ok(Self::finalize(raw))
    }

    fn read_raw(path: &Path) -> Result<RawDrillscoreConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "drillscore")
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".drillscore/config.toml")
        }
    }

    /// Default SQLite location when `storage.path` is unset
    pub fn default_db_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join(DEFAULT_DB_FILE))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawDrillscoreConfig, overlay: RawDrillscoreConfig) -> RawDrillscoreConfig {
        RawDrillscoreConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            sessions: RawSessionsConfig {
                idle_timeout_secs: overlay
                    .sessions
                    .idle_timeout_secs
                    .or(base.sessions.idle_timeout_secs),
                sweep_interval_secs: overlay
                    .sessions
                    .sweep_interval_secs
                    .or(base.sessions.sweep_interval_secs),
                duplicate_start: overlay
                    .sessions
                    .duplicate_start
                    .or(base.sessions.duplicate_start),
            },
            storage: RawStorageConfig {
                backend: overlay.storage.backend.or(base.storage.backend),
                path: overlay.storage.path.or(base.storage.path),
            },
            auth: RawAuthConfig {
                enabled: overlay.auth.enabled.or(base.auth.enabled),
                jwt_secret: overlay.auth.jwt_secret.or(base.auth.jwt_secret),
                principal_header: overlay.auth.principal_header.or(base.auth.principal_header),
                clock_skew_seconds: overlay
                    .auth
                    .clock_skew_seconds
                    .or(base.auth.clock_skew_seconds),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawDrillscoreConfig) -> DrillscoreConfig {
        let auth_defaults = AuthConfig::default();
        DrillscoreConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            sessions: SessionsConfig {
                idle_timeout_secs: raw
                    .sessions
                    .idle_timeout_secs
                    .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS),
                sweep_interval_secs: raw
                    .sessions
                    .sweep_interval_secs
                    .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
                duplicate_start: raw.sessions.duplicate_start.unwrap_or_default(),
            },
            storage: StorageConfig {
                backend: raw.storage.backend.unwrap_or_default(),
                path: raw.storage.path,
            },
            auth: AuthConfig {
                enabled: raw.auth.enabled.unwrap_or(auth_defaults.enabled),
                jwt_secret: raw.auth.jwt_secret.unwrap_or(auth_defaults.jwt_secret),
                principal_header: raw
                    .auth
                    .principal_header
                    .unwrap_or(auth_defaults.principal_header),
                clock_skew_seconds: raw
                    .auth
                    .clock_skew_seconds
                    .unwrap_or(auth_defaults.clock_skew_seconds),
            },
        }
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<DrillscoreConfig> {
        if path.exists() {
            Ok(Self::finalize(Self::read_raw(path)?))
        } else {
            Ok(DrillscoreConfig::default())
        }
    }
}
