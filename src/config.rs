//! Centralized configuration management for catalog-editor

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_LOG_FILE: &str = "./catalog-editor.log";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote catalog service
    pub api: ApiConfig,
    /// HTTP client configuration
    pub http: HttpConfig,
    /// File the tracing output is appended to
    pub log_file: PathBuf,
}

/// Where the catalog service lives
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL the `/api/...` paths are joined onto
    pub base_url: Url,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds. None leaves requests unbounded.
    pub timeout_seconds: Option<u64>,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("catalog-editor/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let base_url = match std::env::var("CATALOG_API_URL") {
            Ok(val) => Url::parse(&val)
                .with_context(|| format!("Failed to parse environment variable CATALOG_API_URL = '{}'", val))?,
            Err(_) => ApiConfig::default().base_url,
        };

        let http = HttpConfig {
            timeout_seconds: parse_env_var("CATALOG_HTTP_TIMEOUT_SECONDS")?,
            user_agent: std::env::var("CATALOG_USER_AGENT")
                .unwrap_or_else(|_| default_user_agent()),
        };

        let log_file = std::env::var("CATALOG_LOG_FILE")
            .unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string())
            .into();

        Ok(Config {
            api: ApiConfig { base_url },
            http,
            log_file,
        })
    }

    /// Replace the service base URL, e.g. from a command line flag
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self> {
        self.api.base_url = Url::parse(api_url)
            .with_context(|| format!("Invalid API URL: {}", api_url))?;
        Ok(self)
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http.timeout_seconds.map(Duration::from_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.api.base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(anyhow::anyhow!(
                    "Catalog API URL must use http or https, got '{}'",
                    other
                ));
            }
        }

        // Make sure the log file can be created
        if let Some(parent) = self.log_file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create log directory: {}", parent.display()))?;
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            http: HttpConfig::default(),
            log_file: DEFAULT_LOG_FILE.into(),
        }
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
