//! Configuration management for Binsight
//!
//! Handles loading and validation of TOML configuration files.

use crate::error::ConfigError;
use crate::logging::LogLevel;
use crate::ports::media::FacingMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for Binsight
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Camera acquisition and capture settings
    #[serde(default)]
    pub camera: CameraConfig,

    /// Classification service settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Camera configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraConfig {
    /// Camera to open first (default: environment)
    #[serde(default)]
    pub default_facing: FacingMode,

    /// Ideal width requested by the high-resolution tier (default: 1920)
    #[serde(default = "default_ideal_width")]
    pub ideal_width: u32,

    /// Ideal height requested by the high-resolution tier (default: 1080)
    #[serde(default = "default_ideal_height")]
    pub ideal_height: u32,

    /// JPEG quality for captured photos, 90-100 (default: 92)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            default_facing: FacingMode::default(),
            ideal_width: default_ideal_width(),
            ideal_height: default_ideal_height(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// How the classifier reaches the inference provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Call the provider API with a local key
    #[default]
    Direct,
    /// Post the image to a relay that holds the key
    Relay,
}

impl std::fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierMode::Direct => write!(f, "direct"),
            ClassifierMode::Relay => write!(f, "relay"),
        }
    }
}

/// Classification service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    /// "direct" or "relay"
    #[serde(default)]
    pub mode: ClassifierMode,

    /// Model name used in direct mode
    #[serde(default = "default_model")]
    pub model: String,

    /// Relay endpoint used in relay mode
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::default(),
            model: default_model(),
            relay_url: default_relay_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Directory for log files (default: ~/.binsight/logs)
    #[serde(default = "default_log_dir", deserialize_with = "deserialize_path")]
    pub log_dir: PathBuf,

    /// Log level: error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_ideal_width() -> u32 {
    1920
}

fn default_ideal_height() -> u32 {
    1080
}

fn default_jpeg_quality() -> u8 {
    92
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_relay_url() -> String {
    "http://localhost:3001/api/analyze".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_log_dir() -> PathBuf {
    binsight_home().join("logs")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Returns the Binsight home directory (`~/.binsight`)
pub fn binsight_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".binsight")
}

/// Expands tilde (~) in a path to the home directory
fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path_str == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    path.to_path_buf()
}

/// Custom deserializer for paths that expands tilde
fn deserialize_path<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let path_str = String::deserialize(deserializer)?;
    Ok(expand_tilde(Path::new(&path_str)))
}

impl Config {
    /// Validates the configuration values
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if:
    /// - `camera.ideal_width` or `camera.ideal_height` is 0
    /// - `camera.jpeg_quality` is outside 90-100
    /// - `classifier.timeout_seconds` is 0
    /// - `classifier.model` is empty in direct mode
    /// - `classifier.relay_url` is empty in relay mode
    /// - `logging.level` is not a known level
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.ideal_width == 0 || self.camera.ideal_height == 0 {
            return Err(ConfigError::InvalidValue(
                "ideal_width and ideal_height must be > 0".to_string(),
            ));
        }

        if !(90..=100).contains(&self.camera.jpeg_quality) {
            return Err(ConfigError::InvalidValue(
                "jpeg_quality must be between 90 and 100".to_string(),
            ));
        }

        if self.classifier.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_seconds must be > 0".to_string(),
            ));
        }

        match self.classifier.mode {
            ClassifierMode::Direct if self.classifier.model.trim().is_empty() => {
                return Err(ConfigError::InvalidValue(
                    "model must be set in direct mode".to_string(),
                ));
            }
            ClassifierMode::Relay if self.classifier.relay_url.trim().is_empty() => {
                return Err(ConfigError::InvalidValue(
                    "relay_url must be set in relay mode".to_string(),
                ));
            }
            _ => {}
        }

        if self.logging.level.parse::<LogLevel>().is_err() {
            return Err(ConfigError::InvalidValue(format!(
                "unknown log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Parsed log level, falling back to info
    pub fn log_level(&self) -> LogLevel {
        self.logging.level.parse().unwrap_or_default()
    }
}

/// Returns the default configuration file path (`~/.binsight/config.toml`)
pub fn get_default_config_path() -> PathBuf {
    binsight_home().join("config.toml")
}

/// Loads configuration from the specified path
///
/// If the file doesn't exist, creates a default configuration file.
/// If the file is invalid or contains invalid values, returns default configuration.
///
/// # Errors
/// Only IO errors during file creation or reading are returned.
pub fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let default_config = Config::default();
        let toml_str = toml::to_string_pretty(&default_config)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, &toml_str)?;

        tracing::info!("Created default configuration file at {:?}", path);
        return Ok(default_config);
    }

    let content = fs::read_to_string(path)?;

    let config: Config = match toml::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(
                "Failed to parse configuration file {:?}: {}. Using default configuration.",
                path,
                e
            );
            return Ok(Config::default());
        }
    };

    if let Err(e) = config.validate() {
        tracing::warn!(
            "Invalid configuration in {:?}: {}. Using default configuration.",
            path,
            e
        );
        return Ok(Config::default());
    }

    Ok(config)
}

/// Loads configuration from the default path (`~/.binsight/config.toml`)
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from_path(&get_default_config_path())
}
