//! Logging setup for Lattice binaries.
//!
//! One `tracing` registry with two layers: human-readable output on stderr
//! and an ANSI-free copy in a size-rotated file under
//! `$LATTICE_HOME/logs`. `RUST_LOG` overrides the default filter for both.

mod rolling;

use anyhow::{anyhow, Context, Result};
use rolling::{RollingFile, SharedWriter};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILTER: &str = "lattice=info,lattice_registry=info,lattice_governance=info";
const VERBOSE_LOG_FILTER: &str =
    "lattice=debug,lattice_registry=debug,lattice_governance=debug,lattice_events=debug,lattice_intent=debug";

const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub struct LogConfig<'a> {
    /// Log file stem, e.g. `latticed` -> `latticed.log`.
    pub app_name: &'a str,
    /// Debug output on stderr; the file keeps the default filter.
    pub verbose: bool,
    /// Overrides `$LATTICE_HOME/logs`.
    pub log_dir: Option<PathBuf>,
}

impl<'a> LogConfig<'a> {
    pub fn new(app_name: &'a str) -> Self {
        Self {
            app_name,
            verbose: false,
            log_dir: None,
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = match config.log_dir {
        Some(dir) => dir,
        None => logs_dir()?,
    };
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create logs directory: {}", log_dir.display()))?;

    let file = RollingFile::open(&log_dir, config.app_name, MAX_LOG_FILES, MAX_LOG_FILE_SIZE)
        .with_context(|| format!("Failed to open log file in {}", log_dir.display()))?;

    let file_filter = env_filter(DEFAULT_LOG_FILTER);
    let console_filter = if config.verbose {
        env_filter(VERBOSE_LOG_FILTER)
    } else {
        env_filter(DEFAULT_LOG_FILTER)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(SharedWriter::new(file))
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Lattice home: `$LATTICE_HOME`, else `~/.lattice`.
pub fn lattice_home() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("LATTICE_HOME") {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(".lattice"))
        .ok_or_else(|| anyhow!("Could not determine home directory; set LATTICE_HOME"))
}

pub fn logs_dir() -> Result<PathBuf> {
    Ok(lattice_home()?.join("logs"))
}
