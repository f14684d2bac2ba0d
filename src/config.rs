//! Configuration management for Taskdeck
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, TaskdeckError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Taskdeck
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Where the session tokens are kept
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Deployment environment, selecting a default API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment: {}", other)),
        }
    }
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000/api/v1".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Development)
    }
}

impl ApiConfig {
    /// Preset endpoint and timeout for an environment.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                base_url: default_base_url(),
                timeout_ms: default_timeout_ms(),
            },
            Environment::Production => Self {
                base_url: "https://todo-api-golang.onrender.com/api/v1".to_string(),
                timeout_ms: 15_000,
            },
        }
    }
}

/// Token storage backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file in the data directory
    #[default]
    File,
    /// OS keyring
    Keyring,
    /// In-memory only; the session ends with the process
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" => Ok(StorageBackend::Keyring),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

/// Token storage configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend stores the token pair
    #[serde(default)]
    pub backend: StorageBackend,

    /// Session file location for the file backend. Defaults to the
    /// platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns [`TaskdeckError::Config`] if the file exists but cannot be
    /// read or parsed.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TaskdeckError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| TaskdeckError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(environment) = std::env::var("TASKDECK_ENV") {
            match environment.parse() {
                Ok(env) => self.api = ApiConfig::for_environment(env),
                Err(e) => tracing::warn!("Invalid TASKDECK_ENV: {}", e),
            }
        }

        if let Ok(base_url) = std::env::var("TASKDECK_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("TASKDECK_API_TIMEOUT") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_ms = value;
            } else {
                tracing::warn!("Invalid TASKDECK_API_TIMEOUT: {}", timeout);
            }
        }

        if let Ok(backend) = std::env::var("TASKDECK_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(value) => self.storage.backend = value,
                Err(e) => tracing::warn!("Invalid TASKDECK_STORAGE_BACKEND: {}", e),
            }
        }

        if let Ok(path) = std::env::var("TASKDECK_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            self.api.base_url = api_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`TaskdeckError::Config`] if the base URL is not an absolute
    /// http(s) URL or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            TaskdeckError::Config(format!("Invalid API base URL {}: {}", self.api.base_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(TaskdeckError::Config(format!(
                "API base URL must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.api.timeout_ms == 0 {
            return Err(
                TaskdeckError::Config("timeout_ms must be greater than 0".to_string()).into(),
            );
        }

        Ok(())
    }
}
