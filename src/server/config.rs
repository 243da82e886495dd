//! Server configuration
//!
//! Loaded from `settings.yaml` in the config directory, then overridden by
//! `PROJECT_DECK_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Default port number
pub const DEFAULT_PORT: u16 = 19836;

/// Config file name
const CONFIG_FILENAME: &str = "settings.yaml";

/// Database file name used when no path is configured
const DATABASE_FILENAME: &str = "projects.db";

/// Application directory name under the platform config dir
const APP_DIR_NAME: &str = "project-deck";

pub const ENV_PORT: &str = "PROJECT_DECK_PORT";
pub const ENV_DATABASE: &str = "PROJECT_DECK_DB";
pub const ENV_TOKEN: &str = "PROJECT_DECK_TOKEN";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("failed to write config: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen port; 0 picks an ephemeral port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Listen host
    #[serde(default = "default_host")]
    pub host: String,
    /// SQLite file; defaults to `<config_dir>/projects.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// Static bearer token required on project routes when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Page size used when a list request does not name one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: default_host(),
            database_path: None,
            api_token: None,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ServerConfig {
    /// Platform config directory for this application
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
    }

    /// Load from the config directory
    ///
    /// A missing file yields the defaults; an unreadable or malformed file is
    /// an error.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::config_path(config_dir);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;

        let config: Self =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: config_path,
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to the config directory
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(Self::config_path(config_dir), content)?;
        Ok(())
    }

    /// Apply `PROJECT_DECK_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_PORT) {
            self.port = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_PORT,
                message: format!("{:?} is not a port number", raw),
            })?;
        }
        if let Some(path) = lookup(ENV_DATABASE).filter(|p| !p.trim().is_empty()) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.api_token = Some(token).filter(|t| !t.trim().is_empty());
        }
        self.validate()?;
        Ok(self)
    }

    /// Check every field
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::validate_port(self.port).map_err(|message| ConfigError::Invalid {
            key: "port",
            message,
        })?;
        if !(1..=MAX_PAGE_SIZE).contains(&self.default_page_size) {
            return Err(ConfigError::Invalid {
                key: "default_page_size",
                message: format!("must be between 1 and {}", MAX_PAGE_SIZE),
            });
        }
        Ok(())
    }

    /// Port must be 0 (ephemeral) or a non-privileged port
    pub fn validate_port(port: u16) -> Result<(), String> {
        if port != 0 && port < 1024 {
            return Err("Port must be >= 1024 (non-privileged ports)".to_string());
        }
        Ok(())
    }

    /// Database file, falling back to the config directory
    pub fn resolve_database_path(&self, config_dir: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| config_dir.join(DATABASE_FILENAME))
    }

    /// Full path of the config file
    pub fn config_path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILENAME)
    }
}
