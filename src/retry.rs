use std::time::{Duration, Instant};
use crate::config::ImportConfig;
use crate::errors::ConnectError;
use crate::progress::Spinner;

/// Timing for connection attempts
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts in one connect cycle, first one included
    pub max_attempts: usize,
    /// Pause between attempts of one cycle
    pub backoff: Duration,
    /// Pause between wait-loop cycles
    pub wait_interval: Duration,
    /// How long the wait loop keeps going
    pub wait_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

impl From<&ImportConfig> for RetryConfig {
    fn from(config: &ImportConfig) -> Self {
        Self {
            max_attempts: 2,
            backoff: config.backoff(),
            wait_interval: config.wait_interval(),
            wait_timeout: config.wait_timeout(),
        }
    }
}

/// Run `operation` up to `config.max_attempts` times, waiting `config.backoff`
/// between attempts. Returns the last error when every attempt fails.
pub fn retry_with_backoff<F, T>(
    config: &RetryConfig,
    spinner: &mut Spinner,
    mut operation: F,
) -> Result<T, ConnectError>
where
    F: FnMut(usize) -> Result<T, ConnectError>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation(attempt) {
            Ok(result) => return Ok(result),
            Err(error) => {
                if attempt >= config.max_attempts.max(1) {
                    return Err(error);
                }
                tracing::debug!(attempt, code = error.code, "connect attempt failed: {error}");
                spinner.wait(config.backoff);
            }
        }
    }
}

/// Keep calling `operation` every `config.wait_interval` while it fails with
/// a not-ready error and the deadline has not passed.
pub fn retry_until_ready<F, T>(
    config: &RetryConfig,
    spinner: &mut Spinner,
    mut operation: F,
) -> Result<T, ConnectError>
where
    F: FnMut() -> Result<T, ConnectError>,
{
    let deadline = Instant::now() + config.wait_timeout;
    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(error) if error.is_not_ready() && Instant::now() < deadline => {
                tracing::info!(code = error.code, "server not ready: {error}");
                spinner.wait(config.wait_interval);
            }
            Err(error) => return Err(error),
        }
    }
}
