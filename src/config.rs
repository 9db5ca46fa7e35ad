//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_AUTH_URL: &str = "https://roble-api.openlab.uninorte.edu.co/auth/flourse_460df99409";
const DEFAULT_DATABASE_URL: &str = "https://roble-api.openlab.uninorte.edu.co/database";
const DEFAULT_DATABASE_NAME: &str = "flourse_460df99409";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the authentication service (login, refresh, ...)
    pub auth_url: String,
    /// Base URL of the hosted database service
    pub database_url: String,
    /// Database (project) name appended to `database_url`
    pub database_name: String,
    /// Where the persistent credential store lives
    pub credentials_path: Option<PathBuf>,
    /// Per-request timeout applied by the underlying HTTP client
    pub http_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            auth_url: "http://127.0.0.1:9/auth".to_string(),
            database_url: "http://127.0.0.1:9/database".to_string(),
            database_name: "test_db".to_string(),
            credentials_path: None,
            http_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// hosted Flourse service for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let http_timeout_secs = match env::var("FLOURSE_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("FLOURSE_HTTP_TIMEOUT_SECS", raw))?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            auth_url: env::var("FLOURSE_AUTH_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            database_url: env::var("FLOURSE_DATABASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            database_name: env::var("FLOURSE_DATABASE_NAME")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| DEFAULT_DATABASE_NAME.to_string()),
            credentials_path: env::var("FLOURSE_CREDENTIALS_PATH").ok().map(PathBuf::from),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Credential file path, required by the binary.
    pub fn require_credentials_path(&self) -> Result<&PathBuf, ConfigError> {
        self.credentials_path
            .as_ref()
            .ok_or(ConfigError::Missing("FLOURSE_CREDENTIALS_PATH"))
    }

    /// Base URL for table operations, e.g. `{database_url}/{database_name}`.
    pub fn database_base(&self) -> String {
        format!("{}/{}", self.database_url, self.database_name)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
