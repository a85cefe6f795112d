//! Logging setup
//!
//! Installs a `tracing` subscriber: human-readable output on stderr,
//! optionally JSON, optionally mirrored to a daily rolling file.
//! `RUST_LOG` overrides the configured filter.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "permission_broker=info";

/// Logging options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of the pretty format
    pub json: bool,
    /// Also write logs to a daily rolling file in this directory
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            json: false,
            directory: None,
        }
    }
}

impl LoggingConfig {
    /// Set the fallback filter
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Enable or disable JSON output
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Mirror logs into `directory`
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.filter)
                .with_context(|| format!("invalid log filter: {}", self.filter)),
        }
    }
}

/// Initialize logging with the default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with(&LoggingConfig::default()).map(|_| ())
}

/// Initialize logging
///
/// Returns the file writer's guard when a directory is configured; keep it
/// alive for the lifetime of the program or buffered lines are lost.
pub fn init_logging_with(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)
                .with_context(|| format!("cannot create log directory {:?}", directory))?;
            let appender = tracing_appender::rolling::daily(directory, "permission-broker.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false).json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let (pretty, json) = if config.json {
        (None, Some(fmt::layer().with_writer(std::io::stderr).json()))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(pretty)
        .with(json)
        .with(file_layer)
        .try_init()
        .context("logging already initialized")?;

    Ok(guard)
}
