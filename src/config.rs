//! Configuration for the rotator service.
//!
//! Loaded from a TOML file; every section and field has a default, so an
//! empty file (or no file) yields a working development setup.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// The config file does not exist. Any other failure means the file is
    /// there but unusable.
    pub fn is_missing_file(&self) -> bool {
        match self {
            ConfigError::Read { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RotatorConfig {
    pub logger: LoggerConfig,
    pub api: ApiConfig,
    pub bandit: BanditConfig,
    pub rotator: SelectionConfig,
    pub queue: QueueConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub http_port: u16,
    pub grpc_port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 8080,
            grpc_port: 50051,
        }
    }
}

impl ApiConfig {
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    pub fn grpc_addr(&self) -> String {
        format!("{}:{}", self.host, self.grpc_port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BanditConfig {
    /// Fixed RNG seed; entropy-seeded when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Take a per-slot lock around select-and-record.
    pub serialize_slot_selection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: "rotator".to_string(),
        }
    }
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl RotatorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RotatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LEVELS.contains(&self.logger.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log level {:?}, expected one of {}",
                self.logger.level,
                LEVELS.join("|")
            )));
        }
        if self.queue.name.trim().is_empty() {
            return Err(ConfigError::Invalid("queue name must not be empty".into()));
        }
        if self.api.host.trim().is_empty() {
            return Err(ConfigError::Invalid("api host must not be empty".into()));
        }
        Ok(())
    }
}
