//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RASENMAEHER_URL` - Base URL of the Rasenmaeher backend
//!
//! ## Optional
//! - `RASENMAEHER_STATE_DIR` - Directory for persisted client state
//!   (default: `.rasenmaeher` under the working directory)
//! - `RASENMAEHER_TOKEN` - Bootstrap bearer credential (normally the
//!   credential comes from local storage or an enrollment flow instead)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_STATE_DIR: &str = ".rasenmaeher";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    /// An environment variable is set but unusable.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

/// Client configuration.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the Rasenmaeher backend.
    pub api_url: Url,
    /// Directory for persisted per-deployment state.
    pub state_dir: PathBuf,
    /// Optional bootstrap bearer credential.
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url.as_str())
            .field("state_dir", &self.state_dir)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `RASENMAEHER_URL` is unset,
    /// or `ConfigError::InvalidEnvVar` if it does not parse as a URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let raw_url = std::env::var("RASENMAEHER_URL")
            .map_err(|_| ConfigError::MissingEnvVar("RASENMAEHER_URL"))?;
        let api_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("RASENMAEHER_URL", e.to_string()))?;

        let state_dir = std::env::var_os("RASENMAEHER_STATE_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);

        let token = std::env::var("RASENMAEHER_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(SecretString::from);

        Ok(Self {
            api_url,
            state_dir,
            token,
        })
    }

    /// Build a configuration directly, for tests and embedders.
    #[must_use]
    pub fn new(api_url: Url, state_dir: PathBuf) -> Self {
        Self {
            api_url,
            state_dir,
            token: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let mut config = Config::new(
            Url::parse("https://rasenmaeher.example.com").unwrap(),
            PathBuf::from("/tmp/state"),
        );
        config.token = Some(SecretString::from("jwt".to_owned()));

        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("jwt"));
    }
}
