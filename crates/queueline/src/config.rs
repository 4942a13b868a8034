//! Client configuration.
//!
//! Defaults suit a backend running locally. Every field can be overridden
//! from the environment:
//!
//! | Variable | Field | Unit |
//! |---|---|---|
//! | `QUEUELINE_ENDPOINT` | `endpoint` | URL |
//! | `QUEUELINE_POLL_INTERVAL_MS` | `poll_interval` | milliseconds |
//! | `QUEUELINE_REQUEST_TIMEOUT_SECS` | `request_timeout` | seconds |
//! | `QUEUELINE_CONNECT_TIMEOUT_SECS` | `connect_timeout` | seconds |
//! | `QUEUELINE_DATA_DIR` | `data_dir` | path |

use std::path::PathBuf;
use std::time::Duration;

use queueline_poll::PollConfig;
use queueline_transport::HttpConfig;

pub const ENDPOINT_VAR: &str = "QUEUELINE_ENDPOINT";
pub const POLL_INTERVAL_VAR: &str = "QUEUELINE_POLL_INTERVAL_MS";
pub const REQUEST_TIMEOUT_VAR: &str = "QUEUELINE_REQUEST_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_VAR: &str = "QUEUELINE_CONNECT_TIMEOUT_SECS";
pub const DATA_DIR_VAR: &str = "QUEUELINE_DATA_DIR";

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive whole number, got `{value}`")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be an http:// or https:// URL, got `{value}`")]
    InvalidEndpoint { var: &'static str, value: String },
}

/// Everything needed to build a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,
    /// How often live screens refresh.
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Where a durable session is kept. `None` lets the application pick.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let http = HttpConfig::default();
        Self {
            endpoint: http.endpoint,
            poll_interval: PollConfig::DEFAULT_INTERVAL,
            request_timeout: http.request_timeout,
            connect_timeout: http.connect_timeout,
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Blank values are
    /// treated as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(endpoint) = get(ENDPOINT_VAR) {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::InvalidEndpoint {
                    var: ENDPOINT_VAR,
                    value: endpoint,
                });
            }
            config.endpoint = endpoint;
        }
        if let Some(raw) = get(POLL_INTERVAL_VAR) {
            config.poll_interval = Duration::from_millis(parse_positive(POLL_INTERVAL_VAR, raw)?);
        }
        if let Some(raw) = get(REQUEST_TIMEOUT_VAR) {
            config.request_timeout = Duration::from_secs(parse_positive(REQUEST_TIMEOUT_VAR, raw)?);
        }
        if let Some(raw) = get(CONNECT_TIMEOUT_VAR) {
            config.connect_timeout = Duration::from_secs(parse_positive(CONNECT_TIMEOUT_VAR, raw)?);
        }
        if let Some(dir) = get(DATA_DIR_VAR) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        tracing::debug!(
            endpoint = %config.endpoint,
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            "client configuration loaded"
        );
        Ok(config)
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            endpoint: self.endpoint.clone(),
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
        }
    }

    /// Poll configuration (the scheduler clamps the interval).
    pub fn poll_config(&self) -> PollConfig {
        PollConfig::with_interval(self.poll_interval)
    }
}

fn parse_positive(var: &'static str, raw: String) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { var, value: raw }),
    }
}
