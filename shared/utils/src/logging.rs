//! Tracing subscriber setup shared by the services.

use anyhow::{bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => bail!("Unknown log format '{}', expected json, pretty or compact", other),
        }
    }
}

/// `RUST_LOG` wins over the configured level; an unparseable level means `info`.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn open_log_file(path: &Path) -> Result<Arc<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    Ok(Arc::new(file))
}

/// Installs the global subscriber. Call once per process.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let format: LogFormat = config.format.parse()?;
    let file = config
        .file_path
        .as_deref()
        .map(|p| open_log_file(Path::new(p)))
        .transpose()?;

    let registry = tracing_subscriber::registry().with(build_filter(&config.level));

    match (format, file) {
        (LogFormat::Json, Some(file)) => registry
            .with(fmt::layer().json().with_current_span(true).with_writer(file))
            .try_init()?,
        (LogFormat::Json, None) => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?,
        (LogFormat::Pretty, Some(file)) => registry
            .with(fmt::layer().with_ansi(false).with_writer(file))
            .try_init()?,
        (LogFormat::Pretty, None) => registry.with(fmt::layer()).try_init()?,
        (LogFormat::Compact, Some(file)) => registry
            .with(fmt::layer().compact().with_ansi(false).with_writer(file))
            .try_init()?,
        (LogFormat::Compact, None) => registry.with(fmt::layer().compact()).try_init()?,
    }

    tracing::info!(level = %config.level, format = ?format, "Logging initialized");
    Ok(())
}
