//! Server configuration
//!
//! Every setting has a default suitable for local development and can be
//! overridden from the environment.

use axum::http::HeaderValue;
use thiserror::Error;

pub const PORT_ENV: &str = "TASKBOARD_PORT";
pub const SEED_ENV: &str = "TASKBOARD_SEED";
pub const CORS_ENV: &str = "CORS_ALLOW_ORIGIN";

pub const DEFAULT_PORT: u16 = 3001;

/// Origins allowed when `CORS_ALLOW_ORIGIN` is not set
pub const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:1420",
    "http://localhost:5173",
    "http://localhost:3000",
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Port must be greater than 0")]
    ZeroPort,

    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to listen on (bound on 127.0.0.1)
    pub port: u16,
    /// Start from the demo dataset instead of empty collections
    pub seed: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            seed: true,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(PORT_ENV) {
            config.port = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: PORT_ENV,
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup(SEED_ENV) {
            config.seed = match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: SEED_ENV,
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = lookup(CORS_ENV) {
            config.cors_origins = raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ZeroPort);
        }

        self.origin_headers().map(|_| ())
    }

    /// Allowed origins as header values
    pub fn origin_headers(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.cors_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|_| ConfigError::InvalidOrigin(origin.clone()))
            })
            .collect()
    }

    pub fn bind_address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}
