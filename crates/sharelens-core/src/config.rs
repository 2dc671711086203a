//! Configuration management for Sharelens.
//!
//! This module provides configuration loading and defaults.
//! Configuration is stored in TOML format in a platform-appropriate location
//! and is read once at startup; it is never mutated afterwards.

use crate::error::{CoreError, Result};
use crate::types::SharedRoot;
use crate::walker::NameFilter;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Main configuration structure for Sharelens.
///
/// ## Example Configuration File (sharelens.toml)
///
/// ```toml
/// [general]
/// max_results = 0
///
/// [server]
/// bind = "0.0.0.0:3001"
/// public_url = "http://sja-files:3001"
///
/// [tags]
/// path = "C:\\SJA-FILES\\tags.json"
///
/// [[roots]]
/// name = "Archive2019"
/// path = "F:\\Archive2019"
///
/// [[roots]]
/// name = "DESIGNTEAM"
/// path = "G:\\DESIGNTEAM"
///
/// [exclude]
/// patterns = ["$RECYCLE.BIN", "System Volume Information"]
///
/// [indexed]
/// program = "powershell"
/// args = ["-NoProfile", "-ExecutionPolicy", "Bypass", "-File", "search-index.ps1", "-query"]
/// timeout_secs = 30
///
/// [convert]
/// ffmpeg = "C:/ffmpeg/bin/ffmpeg.exe"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Tag store location
    pub tags: TagsConfig,

    /// Shared roots searched by the recursive walk, in search order
    pub roots: Vec<SharedRoot>,

    /// Folder names never descended into
    pub exclude: ExcludeConfig,

    /// External indexed search
    pub indexed: IndexedConfig,

    /// External AVI converter
    pub convert: ConvertConfig,
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Maximum number of walk search results (0 = unlimited)
    pub max_results: usize,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            max_results: 0,
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,

    /// Externally reachable base URL, used to build preview links
    pub public_url: String,

    /// Append-only preview access log (None = default location)
    pub preview_log: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:3001".to_string(),
            public_url: "http://localhost:3001".to_string(),
            preview_log: None,
        }
    }
}

/// Tag store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    /// JSON file mapping absolute paths to tags (None = default location)
    pub path: Option<PathBuf>,
}

/// Exclusion configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcludeConfig {
    /// Glob patterns matched case-insensitively against folder names
    pub patterns: Vec<String>,
}

/// Indexed search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexedConfig {
    /// Program to run
    pub program: String,

    /// Arguments placed before the query
    pub args: Vec<String>,

    /// Separator between paths in the program's output
    pub delimiter: String,

    /// Seconds before the program is killed
    pub timeout_secs: u64,
}

impl Default for IndexedConfig {
    fn default() -> Self {
        IndexedConfig {
            program: "powershell".to_string(),
            args: vec![
                "-NoProfile".to_string(),
                "-ExecutionPolicy".to_string(),
                "Bypass".to_string(),
                "-File".to_string(),
                "search-index.ps1".to_string(),
                "-query".to_string(),
            ],
            delimiter: "|~|".to_string(),
            timeout_secs: 30,
        }
    }
}

impl IndexedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// AVI conversion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Path to the ffmpeg executable
    pub ffmpeg: String,

    /// Seconds before a conversion is abandoned
    pub timeout_secs: u64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            ffmpeg: "ffmpeg".to_string(),
            timeout_secs: 900,
        }
    }
}

impl ConvertConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default config if no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|e| CoreError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
        })?;

        // Surface bad exclusion patterns at startup rather than mid-search
        config.exclude_filter()?;

        Ok(config)
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.config_dir().join("sharelens.toml"))
    }

    /// Get the default data directory path.
    pub fn default_data_dir() -> Result<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Get the tag store file (from config or default).
    pub fn tags_path(&self) -> Result<PathBuf> {
        match self.tags.path {
            Some(ref path) => Ok(path.clone()),
            None => Ok(Self::default_data_dir()?.join("tags.json")),
        }
    }

    /// Get the preview log file (from config or default).
    pub fn preview_log_path(&self) -> Result<PathBuf> {
        match self.server.preview_log {
            Some(ref path) => Ok(path.clone()),
            None => Ok(Self::default_data_dir()?.join("preview.log")),
        }
    }

    /// Compile the folder exclusion patterns.
    pub fn exclude_filter(&self) -> Result<NameFilter> {
        NameFilter::new(&self.exclude.patterns)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "sharelens").ok_or_else(|| CoreError::ConfigError {
        reason: "Could not determine config directory".to_string(),
    })
}
