//! Process configuration for the summary server.
//!
//! Everything is read once at startup from the environment (optionally seeded
//! from a `.env` file) and is immutable afterwards.

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
/// Environment variable for the listening port.
pub const PORT_ENV: &str = "SUMMARY_PORT";
/// Environment variable for the single CORS origin.
pub const ALLOWED_ORIGIN_ENV: &str = "SUMMARY_ALLOWED_ORIGIN";
/// Environment variable for the outbound request timeout, in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "SUMMARY_REQUEST_TIMEOUT_SECS";
/// Environment variable overriding the Gemini API base URL.
pub const API_BASE_ENV: &str = "GEMINI_API_BASE";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8000;
/// Default browser origin allowed to call the API (local frontend dev server).
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
/// Default timeout for the call to the generative API.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Gemini API base URL.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is absent or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    /// A variable is present but cannot be parsed.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Server and upstream settings.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Credential for the generative API. Never logged.
    pub api_key: SecretString,
    /// Port to listen on.
    pub port: u16,
    /// The one origin permitted by the CORS policy.
    pub allowed_origin: String,
    /// Timeout for the outbound generation call.
    pub request_timeout: Duration,
    /// Base URL of the generative API.
    pub api_base: Url,
}

impl AppConfig {
    /// Create a config with defaults and the given API key.
    ///
    /// # Errors
    /// Returns an error if the built-in API base URL cannot be parsed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: SecretString::new(api_key.into()),
            port: DEFAULT_PORT,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            api_base: parse_base(API_BASE_ENV, DEFAULT_API_BASE)?,
        })
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present;
    /// variables already set in the environment win.
    ///
    /// # Errors
    /// Returns an error if the API key is missing or a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if the API key is missing or a value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_ENV).ok_or(ConfigError::Missing(API_KEY_ENV))?;
        let mut config = Self::new(api_key)?;

        if let Some(port) = get(PORT_ENV) {
            config.port = port.trim().parse().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("{e}"),
            })?;
        }

        if let Some(origin) = get(ALLOWED_ORIGIN_ENV) {
            config.allowed_origin = origin.trim().trim_end_matches('/').to_string();
        }

        if let Some(secs) = get(REQUEST_TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|e| ConfigError::Invalid {
                name: REQUEST_TIMEOUT_ENV,
                reason: format!("{e}"),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    name: REQUEST_TIMEOUT_ENV,
                    reason: "must be > 0".to_string(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(base) = get(API_BASE_ENV) {
            config.api_base = parse_base(API_BASE_ENV, base.trim())?;
        }

        Ok(config)
    }

    /// Set the listening port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the allowed CORS origin.
    #[must_use]
    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = origin.into();
        self
    }

    /// Set the outbound request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Point the client at a different API base.
    #[must_use]
    pub fn with_api_base(mut self, base: Url) -> Self {
        self.api_base = base;
        self
    }
}

fn parse_base(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim_end_matches('/')).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
