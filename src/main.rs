//! Stagehand - background host for the recruiting pipeline extension.
//!
//! Bridges the browser shell's messages to the background coordinator over
//! line-delimited JSON on stdin/stdout. Logs go to stderr and a rolling file.

mod host;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stagehand_background::{
    BackgroundCoordinator, ConfigCache, FileConfigStorage, HttpConfigSource, RequestRelay,
};
use stagehand_config::{Settings, SettingsLoader, SettingsValidator};

use crate::host::StdioBridge;

/// Stagehand background host.
#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "Background host for the Stagehand recruiting pipeline extension")]
#[command(version)]
struct Cli {
    /// Settings file path. Defaults to `<data dir>/stagehand.toml` when present.
    #[arg(short, long, env = "STAGEHAND_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for rolling log files.
    #[arg(long, env = "STAGEHAND_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

/// Initialize tracing with a stderr layer and a daily rolling file.
///
/// stdout carries the bridge protocol, so nothing else may write to it.
fn init_tracing(log_dir: &Path, default_level: &str) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("stagehand")
        .filename_suffix("log")
        .max_log_files(14)
        .build(log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

/// Open the on-disk configuration store, or `None` when it is disabled or
/// unusable. Without a store every lookup fetches the remote document.
async fn open_storage(settings: &Settings) -> Option<FileConfigStorage> {
    if !settings.storage.enabled {
        warn!("Configuration storage disabled, every lookup fetches the remote document");
        return None;
    }
    let dir = settings.storage_dir();
    match FileConfigStorage::new(dir.clone()).await {
        Ok(storage) => {
            info!(path = %storage.path().display(), "Configuration cache storage");
            Some(storage)
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Configuration storage unavailable, continuing without a cache");
            None
        }
    }
}

async fn build_coordinator(
    settings: &Settings,
    bridge: Arc<StdioBridge>,
) -> anyhow::Result<BackgroundCoordinator> {
    let source = HttpConfigSource::with_timeout(
        settings.remote.config_url.clone(),
        settings.remote.request_timeout(),
    )?;
    let mut cache = ConfigCache::new(Arc::new(source)).with_ttl(settings.remote.cache_ttl());
    if let Some(storage) = open_storage(settings).await {
        cache = cache.with_storage(Arc::new(storage));
    }

    let relay = RequestRelay::from_globs(settings.crm.monitored_patterns.as_slice(), bridge.clone())?;
    Ok(BackgroundCoordinator::new(Arc::new(cache), relay, bridge.clone(), bridge)
        .with_frame_rule_domain(settings.crm.frame_rule_domain.clone()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = SettingsLoader::load_or_default(cli.config.as_deref())
        .context("loading settings")?;
    let log_dir = cli.log_dir.clone().unwrap_or_else(|| settings.log_dir());
    let _guard = init_tracing(&log_dir, &settings.logging.level)?;

    let validation = SettingsValidator::validate(&settings);
    for warning in &validation.warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    if !validation.is_valid() {
        for err in &validation.errors {
            error!(path = %err.path, "{}", err.message);
        }
        anyhow::bail!("invalid settings ({} errors)", validation.errors.len());
    }

    info!(config_url = %settings.remote.config_url, "Starting Stagehand background host");

    let (bridge, outbound) = StdioBridge::new();
    let bridge = Arc::new(bridge);
    let coordinator = Arc::new(build_coordinator(&settings, bridge.clone()).await?);

    let writer = tokio::spawn(host::write_outbound(outbound, tokio::io::stdout()));
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    host::serve(stdin, coordinator, bridge).await?;

    // Every outbound sender is dropped once serve() returns.
    writer.await??;
    info!("Input closed, shutting down");
    Ok(())
}
