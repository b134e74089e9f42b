//! Serve command for running the evaluation server
//!
//! Settings come from the merged config files; flags override them.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use drillscore_core::{MemorySummaryStore, RegistryConfig, SqliteSummaryStore, SummaryStore};
use drillscore_server::{AppState, DrillScoreServer, ServerConfig};
use tracing::info;

use crate::config::{ConfigLoader, DrillscoreConfig, StorageBackend};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Persist session history to this SQLite file
    #[arg(long, conflicts_with = "memory")]
    pub db: Option<PathBuf>,

    /// Keep session history in memory only
    #[arg(long)]
    pub memory: bool,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    apply_overrides(&mut config, &args);

    let store = open_store(&config)?;
    let state = Arc::new(AppState::new(registry_config(&config), store));
    let server_config =
        ServerConfig::new(config.server.host.clone(), config.server.port).with_auth(config.auth);

    info!(
        "Starting drillscore server on {}:{}",
        server_config.host, server_config.port
    );
    DrillScoreServer::new(server_config, state)
        .run()
        .await
        .map_err(Into::into)
}

fn apply_overrides(config: &mut DrillscoreConfig, args: &ServeArgs) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(db) = &args.db {
        config.storage.backend = StorageBackend::Sqlite;
        config.storage.path = Some(db.clone());
    }
    if args.memory {
        config.storage.backend = StorageBackend::Memory;
    }
}

fn registry_config(config: &DrillscoreConfig) -> RegistryConfig {
    let sessions = &config.sessions;
    let idle_timeout =
        (sessions.idle_timeout_secs > 0).then(|| Duration::from_secs(sessions.idle_timeout_secs));

    RegistryConfig::default()
        .with_idle_timeout(idle_timeout)
        .with_sweep_interval(Duration::from_secs(sessions.sweep_interval_secs.max(1)))
        .with_duplicate_start(sessions.duplicate_start)
}

fn open_store(config: &DrillscoreConfig) -> Result<Arc<dyn SummaryStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Session history kept in memory");
            Ok(Arc::new(MemorySummaryStore::new()))
        }
        StorageBackend::Sqlite => {
            let path = config
                .storage
                .path
                .clone()
                .or_else(ConfigLoader::default_db_path)
                .context("could not determine a database path; set storage.path")?;
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }

            info!("Session history stored in {}", path.display());
            let store = SqliteSummaryStore::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Arc::new(store))
        }
    }
}
