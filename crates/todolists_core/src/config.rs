//! Service configuration model, loading and validation.
//!
//! # Responsibility
//! - Describe listener, storage, paging and logging settings as one value.
//! - Load them from an optional TOML file, then apply environment overrides.
//!
//! # Invariants
//! - Every field has a default; an empty file is a valid configuration.
//! - A returned configuration has passed `validate()`.

use crate::db::PoolOptions;
use crate::logging::default_log_level;
use crate::pagination::{PageLimits, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the config file when no path is passed.
pub const CONFIG_ENV_VAR: &str = "TODOLISTS_CONFIG";
pub const PORT_ENV_VAR: &str = "TODOLISTS_SERVER_PORT";
pub const MAX_PAGE_SIZE_ENV_VAR: &str = "TODOLISTS_MAX_PAGE_SIZE";
pub const DATABASE_PATH_ENV_VAR: &str = "TODOLISTS_DATABASE_PATH";
pub const LOG_LEVEL_ENV_VAR: &str = "TODOLISTS_LOG_LEVEL";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 50051;
const DEFAULT_WORKERS: usize = 10;
const DEFAULT_DATABASE_PATH: &str = "todolists.sqlite3";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    /// `0` binds an ephemeral port.
    pub port: u16,
    /// Size of the fixed worker pool executing calls.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Storage target and session pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub pool_size: u32,
    pub connection_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
            pool_size: DEFAULT_POOL_SIZE,
            connection_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
        }
    }
}

impl StorageConfig {
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_sessions: self.pool_size,
            connection_timeout: Duration::from_millis(self.connection_timeout_ms),
        }
    }
}

/// Page size limits for the `List` method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub max_page_size: u32,
    pub default_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationConfig {
    pub fn limits(&self) -> PageLimits {
        PageLimits {
            max_page_size: self.max_page_size,
            default_page_size: self.default_page_size,
        }
    }
}

/// Logging level and destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rotating log files; stderr when absent.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl ServiceConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// Resolution: explicit `path`, else `TODOLISTS_CONFIG`, else defaults.
    /// Environment overrides are applied afterwards.
    ///
    /// # Errors
    /// - Returns `Io` when the file cannot be read.
    /// - Returns `Parse` when the file is not valid TOML for this model.
    /// - Returns `Invalid` when an override or the final value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        let mut config = match resolved {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|err| {
                    ConfigError::Io(format!("failed to read `{}`: {err}", path.display()))
                })?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without applying overrides or validation.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment-style overrides read through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(PORT_ENV_VAR) {
            self.server.port = parse_override(PORT_ENV_VAR, &value)?;
        }
        if let Some(value) = lookup(MAX_PAGE_SIZE_ENV_VAR) {
            self.pagination.max_page_size = parse_override(MAX_PAGE_SIZE_ENV_VAR, &value)?;
        }
        if let Some(value) = lookup(DATABASE_PATH_ENV_VAR) {
            self.storage.path = PathBuf::from(value.trim());
        }
        if let Some(value) = lookup(LOG_LEVEL_ENV_VAR) {
            self.logging.level = value.trim().to_string();
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host cannot be empty".to_string()));
        }
        if self.server.workers == 0 {
            return Err(ConfigError::Invalid(
                "server.workers must be at least 1".to_string(),
            ));
        }
        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.path cannot be empty".to_string()));
        }
        if self.storage.pool_size == 0 {
            return Err(ConfigError::Invalid(
                "storage.pool_size must be at least 1".to_string(),
            ));
        }
        if self.pagination.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "pagination.max_page_size must be at least 1".to_string(),
            ));
        }
        if self.pagination.default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "pagination.default_page_size must be at least 1".to_string(),
            ));
        }
        if self.pagination.default_page_size > self.pagination.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "pagination.default_page_size {} exceeds max_page_size {}",
                self.pagination.default_page_size, self.pagination.max_page_size
            )));
        }
        Ok(())
    }

    /// `host:port` the server listens on and clients dial.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_override<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key} has invalid value `{value}`")))
}
