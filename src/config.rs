//! Configuration module for Cloudstash.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, VaultError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Backend platform configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Backend implementation: `http` or `memory`.
    #[serde(default = "default_backend_kind")]
    pub kind: String,
    /// Platform API endpoint, e.g. `https://cloud.appwrite.io/v1`.
    #[serde(default)]
    pub endpoint: String,
    /// Project ID.
    #[serde(default)]
    pub project_id: String,
    /// Server API key used for admin calls.
    #[serde(default)]
    pub api_key: String,
    /// Database ID.
    #[serde(default = "default_database_id")]
    pub database_id: String,
    /// Collection holding user documents.
    #[serde(default = "default_users_collection")]
    pub users_collection_id: String,
    /// Collection holding file metadata documents.
    #[serde(default = "default_files_collection")]
    pub files_collection_id: String,
    /// Storage bucket for file contents.
    #[serde(default = "default_bucket_id")]
    pub bucket_id: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_backend_kind() -> String {
    "http".to_string()
}

fn default_database_id() -> String {
    "cloudstash".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_files_collection() -> String {
    "files".to_string()
}

fn default_bucket_id() -> String {
    "files".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_backend_kind(),
            endpoint: String::new(),
            project_id: String::new(),
            api_key: String::new(),
            database_id: default_database_id(),
            users_collection_id: default_users_collection(),
            files_collection_id: default_files_collection(),
            bucket_id: default_bucket_id(),
            timeout_secs: default_timeout(),
        }
    }
}

/// File upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_max_upload_size() -> u64 {
    50
}

impl FilesConfig {
    /// Maximum upload size in bytes, saturating at `u64::MAX`.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Whether the cookie carries the `Secure` attribute.
    #[serde(default = "default_secure")]
    pub secure: bool,
}

fn default_cookie_name() -> String {
    "appwrite-session".to_string()
}

fn default_secure() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secure: default_secure(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/cloudstash.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Backend platform configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// File upload configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Session cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(VaultError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VaultError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `CLOUDSTASH_API_KEY`: Override the backend API key
    /// - `CLOUDSTASH_ENDPOINT`: Override the backend endpoint
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("CLOUDSTASH_API_KEY") {
            if !api_key.is_empty() {
                self.backend.api_key = api_key;
            }
        }
        if let Ok(endpoint) = std::env::var("CLOUDSTASH_ENDPOINT") {
            if !endpoint.is_empty() {
                self.backend.endpoint = endpoint;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The backend kind is unknown
    /// - The HTTP backend lacks an endpoint, project ID or API key
    /// - The endpoint is not a valid URL
    pub fn validate(&self) -> Result<()> {
        match self.backend.kind.as_str() {
            "memory" => return Ok(()),
            "http" => {}
            other => {
                return Err(VaultError::Config(format!(
                    "unknown backend kind '{other}' (expected 'http' or 'memory')"
                )))
            }
        }

        if self.backend.endpoint.is_empty() {
            return Err(VaultError::Config(
                "backend.endpoint is not set. \
                 Set it in config.toml or via CLOUDSTASH_ENDPOINT environment variable."
                    .to_string(),
            ));
        }
        url::Url::parse(&self.backend.endpoint)
            .map_err(|e| VaultError::Config(format!("backend.endpoint is invalid: {e}")))?;

        if self.backend.project_id.is_empty() {
            return Err(VaultError::Config("backend.project_id is not set".to_string()));
        }
        if self.backend.api_key.is_empty() {
            return Err(VaultError::Config(
                "backend.api_key is not set. \
                 Set it in config.toml or via CLOUDSTASH_API_KEY environment variable."
                    .to_string(),
            ));
        }
        Ok(())
    }
}
