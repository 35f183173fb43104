use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "studyplan.log";

/// Level precedence: `--log-level`, then `log_level` from config, then
/// RUST_LOG, then INFO.
pub fn build_filter(flag: Option<&str>, config: Option<&str>) -> Result<EnvFilter> {
    match flag.or(config) {
        Some(level) => EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'")),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}

/// Log to `<dir>/studyplan.log`, never to stdout, so the menu stays clean.
pub fn setup_logging(dir: &Path, filter: EnvFilter) -> Result<()> {
    let path = dir.join(LOG_FILE);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install tracing subscriber: {e}"))?;

    info!(path = %path.display(), "logging initialized");
    Ok(())
}
