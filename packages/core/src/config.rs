//! Client façade configuration

use std::time::Duration;

/// Default per-request timeout for façade calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable overriding the request timeout, in milliseconds
pub const REQUEST_TIMEOUT_ENV: &str = "TASKBOARD_REQUEST_TIMEOUT_MS";

/// Configuration for [`TasksService`](crate::services::TasksService)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// How long a single request may take before the call fails with
    /// `Timeout`. The request itself is not cancelled on the backend.
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ServiceConfig {
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Read overrides from the environment, falling back to defaults
    ///
    /// Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(REQUEST_TIMEOUT_ENV) {
            match raw.parse::<u64>() {
                Ok(millis) => config.request_timeout = Duration::from_millis(millis),
                Err(_) => tracing::warn!(
                    value = %raw,
                    "Ignoring invalid {}", REQUEST_TIMEOUT_ENV
                ),
            }
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout.is_zero() {
            return Err("request_timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
