//! # Logging
//!
//! `tracing` subscriber setup. Console output goes to stderr so stdout only
//! carries the final import message.

use crate::config::LoggingConfig;
use crate::errors::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_LOG_FILE: &str = "mysql-import.log";

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub console: bool,
    pub file: bool,
    pub file_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            level: Level::WARN,
            console: true,
            file: false,
            file_path: None,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_file(mut self, file: bool) -> Self {
        self.file = file;
        self
    }

    pub fn with_file_path(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    /// Build from the `[logging]` section of the tuning config
    pub fn from_config(config: &LoggingConfig) -> Self {
        let level = match config.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        };
        let mut log_config = Self::new().with_level(level).with_console(config.console);
        if let Some(ref path) = config.file {
            log_config = log_config.with_file(true).with_file_path(PathBuf::from(path));
        }
        log_config
    }

    /// `RUST_LOG` wins over the configured level when set
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_lowercase()))
    }

    fn split_file_path(&self) -> (PathBuf, String) {
        let path = self
            .file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
        (dir, name)
    }
}

/// Install the global subscriber. Fails if one is already set.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let console_layer = config.console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(UtcTime::rfc_3339())
    });

    let file_layer = config.file.then(|| {
        let (dir, name) = config.split_file_path();
        fmt::layer()
            .with_writer(tracing_appender::rolling::never(dir, name))
            .with_ansi(false)
            .with_timer(UtcTime::rfc_3339())
    });

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}
