use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use crate::errors::{ConfigError, Result};

/// Environment variable naming an optional JSON or TOML tuning file
pub const CONFIG_PATH_ENV: &str = "MYSQL_IMPORT_CONFIG";

/// Tuning knobs for an import run; connection targets live in `RunOptions`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Retry, wait and progress settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection retry and wait-loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Pause between the first and the second connection attempt
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// Pause between wait-loop attempts when `--do-while` is given
    #[serde(default = "default_wait_interval_secs")]
    pub wait_interval_secs: u64,

    /// Total time the wait loop keeps trying
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// TCP connect timeout for a single attempt
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Draw the waiting indicator on stderr
    #[serde(default = "default_progress")]
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional)
    #[serde(default)]
    pub file: Option<String>,

    /// Enable console output on stderr
    #[serde(default = "default_console_output")]
    pub console: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            backoff_secs: default_backoff_secs(),
            wait_interval_secs: default_wait_interval_secs(),
            wait_timeout_secs: default_wait_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            progress: default_progress(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            console: default_console_output(),
        }
    }
}

fn default_backoff_secs() -> u64 { 10 }
fn default_wait_interval_secs() -> u64 { 5 }
fn default_wait_timeout_secs() -> u64 { 300 }
fn default_connect_timeout_secs() -> u64 { 10 }
fn default_progress() -> bool { true }
fn default_log_level() -> String { "warn".to_string() }
fn default_console_output() -> bool { true }

impl ImportConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn wait_interval(&self) -> Duration {
        Duration::from_secs(self.wait_interval_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path.extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("json");

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = match extension {
            "json" => serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?,
            "toml" => toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?,
            _ => return Err(ConfigError::UnsupportedFormat(extension.to_string())),
        };

        Ok(config)
    }

    /// Load from the file named by `MYSQL_IMPORT_CONFIG` (if any), then apply
    /// environment overrides and validate.
    pub fn from_env(env: &HashMap<String, String>) -> Result<Self> {
        let mut config = match env.get(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_environment_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    pub fn apply_environment_overrides(&mut self, env: &HashMap<String, String>) -> Result<()> {
        if let Some(level) = env.get("MYSQL_IMPORT_LOG_LEVEL") {
            self.logging.level = level.clone();
        }
        if let Some(file) = env.get("MYSQL_IMPORT_LOG_FILE") {
            self.logging.file = Some(file.clone()).filter(|f| !f.is_empty());
        }
        if let Some(secs) = env.get("MYSQL_IMPORT_BACKOFF_SECS") {
            self.import.backoff_secs = parse_secs("MYSQL_IMPORT_BACKOFF_SECS", secs)?;
        }
        if let Some(secs) = env.get("MYSQL_IMPORT_WAIT_TIMEOUT_SECS") {
            self.import.wait_timeout_secs = parse_secs("MYSQL_IMPORT_WAIT_TIMEOUT_SECS", secs)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.import.backoff_secs == 0 {
            return Err(ConfigError::Invalid("backoff must be greater than 0".to_string()));
        }
        if self.import.wait_interval_secs == 0 {
            return Err(ConfigError::Invalid("wait interval must be greater than 0".to_string()));
        }
        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::Invalid(format!("unknown log level '{}'", self.logging.level)));
        }
        Ok(())
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a number of seconds, got '{value}'")))
}

/// Configuration builder for programmatic configuration
pub struct ConfigBuilder {
    config: AppConfig,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn backoff_secs(mut self, secs: u64) -> Self {
        self.config.import.backoff_secs = secs;
        self
    }

    pub fn wait_interval_secs(mut self, secs: u64) -> Self {
        self.config.import.wait_interval_secs = secs;
        self
    }

    pub fn wait_timeout_secs(mut self, secs: u64) -> Self {
        self.config.import.wait_timeout_secs = secs;
        self
    }

    pub fn progress(mut self, progress: bool) -> Self {
        self.config.import.progress = progress;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
