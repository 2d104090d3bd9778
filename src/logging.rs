//! Tracing subscriber setup.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::LoggingConfig;

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), &config.level)?;

    match &config.file {
        Some(path) => {
            let file = open_log_file(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("a global tracing subscriber is already installed")?;
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("a global tracing subscriber is already installed")?;
        }
    }

    info!("hostkit {} logging initialized", env!("CARGO_PKG_VERSION"));
    Ok(())
}

fn build_filter(env: Option<&str>, level: &str) -> Result<EnvFilter> {
    match env.filter(|directives| !directives.trim().is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid RUST_LOG directives: {}", directives)),
        None => EnvFilter::try_new(level).with_context(|| format!("invalid log level: {}", level)),
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
