//! Configuration for hostkit.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.hostkit/config.toml`
//! - Per-service settings for the console, file system and logging layers
//!
//! # Configuration File
//!
//! ```toml
//! [console]
//! # Characters a single read_input call may return
//! input_buffer_capacity = 64
//! # Stream the console service initializes: "stdout" or "stderr"
//! output = "stdout"
//!
//! [file_system]
//! mount_table = "/proc/self/mounts"
//! # Extra file system types to report as remote
//! remote_types = ["fuse.s3fs"]
//!
//! [logging]
//! level = "info"
//! file = "/var/log/hostkit.log"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::console::buffer::DEFAULT_CAPACITY;
use crate::console::Descriptor;
use crate::fs::mounts::DEFAULT_MOUNT_TABLE;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine config path")]
    NoConfigPath,
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub console: ConsoleConfig,
    pub file_system: FileSystemConfig,
    pub logging: LoggingConfig,
}

/// Stream the console service writes attributes and cursor commands to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleOutput {
    #[default]
    Stdout,
    Stderr,
}

impl ConsoleOutput {
    pub fn descriptor(self) -> Descriptor {
        match self {
            ConsoleOutput::Stdout => Descriptor::STDOUT,
            ConsoleOutput::Stderr => Descriptor::STDERR,
        }
    }
}

/// Console settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub input_buffer_capacity: usize,
    pub output: ConsoleOutput,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            input_buffer_capacity: DEFAULT_CAPACITY,
            output: ConsoleOutput::default(),
        }
    }
}

/// File system settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSystemConfig {
    /// Mount table read on Linux
    pub mount_table: PathBuf,
    /// Extra types reported as remote
    pub remote_types: Vec<String>,
}

impl Default for FileSystemConfig {
    fn default() -> Self {
        Self {
            mount_table: PathBuf::from(DEFAULT_MOUNT_TABLE),
            remote_types: Vec::new(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Log file (appended to); stderr when unset
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from `~/.hostkit/config.toml`, falling back to defaults
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(config) = Self::load_from(&path) {
                    return config;
                }
            }
        }
        Self::default()
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to `~/.hostkit/config.toml`
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::get_config_path().ok_or(ConfigError::NoConfigPath)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get config file path
    pub fn get_config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".hostkit").join("config.toml"))
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.console.input_buffer_capacity, DEFAULT_CAPACITY);
        assert_eq!(config.console.output.descriptor(), Descriptor::STDOUT);
        assert_eq!(config.file_system.mount_table, PathBuf::from("/proc/self/mounts"));
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [console]
            output = "stderr"

            [file_system]
            remote_types = ["fuse.s3fs"]
            "#,
        )
        .unwrap();
        assert_eq!(config.console.output, ConsoleOutput::Stderr);
        assert_eq!(config.console.input_buffer_capacity, DEFAULT_CAPACITY);
        assert_eq!(config.file_system.remote_types, vec!["fuse.s3fs".to_string()]);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let err = Config::parse("[console]\noutput = \"printer\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.console.input_buffer_capacity = 8;
        config.logging.file = Some(dir.path().join("hostkit.log"));

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
