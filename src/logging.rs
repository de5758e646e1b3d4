use std::fs::{self, OpenOptions};

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::paths::log_file_path;

// The TUI owns stdout, so logs go to a file. RUST_LOG overrides this filter.
const DEFAULT_FILTER: &str = "info,ureq=warn,rustls=warn";

pub fn init() -> Result<()> {
    let path = log_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_writer(file)
        .with_env_filter(filter)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))?;

    tracing::info!(path = %path.display(), "podshelf starting");
    Ok(())
}
