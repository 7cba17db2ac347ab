//! Subscriber setup for applications embedding the retry engine.
//!
//! The library only emits `tracing` events (retry scheduled, budget exhausted,
//! cancellation) and never installs a subscriber on its own. Binaries call one
//! of these once at startup.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// File name used inside the log directory.
pub const LOG_FILE_NAME: &str = "faultline.log";

/// Retry decisions at debug, everything else at info, unless `RUST_LOG` says otherwise.
const DEFAULT_FILTER: &str = "info,faultline_core=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Create `log_dir` if needed and open its log file for appending.
fn open_log_file(log_dir: &Path) -> Result<(PathBuf, fs::File)> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log dir {}", log_dir.display()))?;
    let path = log_dir.join(LOG_FILE_NAME);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    Ok((path, file))
}

/// Log to `~/.local/state/faultline/faultline.log`.
/// Returns Err if the file can't be opened so the caller can fall back to stderr.
pub fn init_logging() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("faultline")?;
    init_logging_in(&xdg_dirs.get_state_home())
}

/// Log to `faultline.log` inside `log_dir`. Returns the log file path.
pub fn init_logging_in(log_dir: &Path) -> Result<PathBuf> {
    let (path, file) = open_log_file(log_dir)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already installed: {}", e))?;

    tracing::info!(path = %path.display(), "faultline logging initialized");
    Ok(path)
}

/// Log to stderr. A no-op when a global subscriber is already installed.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
