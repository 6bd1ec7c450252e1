//! Pipeline Configuration - dataset layout, run range and stage options as TOML
//!
//! Every struct implements `Default` with the values of the historical
//! processing scripts, so an absent config file reproduces them exactly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::windowing::WindowPolicy;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "BENDFORM_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "bendform.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration of one processing batch.
///
/// Load with `PipelineConfig::load()` which searches:
/// 1. `$BENDFORM_CONFIG` env var
/// 2. `./bendform.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Inclusive run id range
    #[serde(default)]
    pub runs: RunRangeConfig,

    /// Merged run table options
    #[serde(default)]
    pub prepare: PrepareConfig,

    /// Window statistics options
    #[serde(default)]
    pub windowing: WindowingConfig,

    /// Quantization encoder options
    #[serde(default)]
    pub encoder: EncoderConfig,
}

impl PipelineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$BENDFORM_CONFIG` environment variable
    /// 2. `./bendform.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded pipeline config from {CONFIG_ENV}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV} points to non-existent file, falling back");
            }
        }

        // 2. Check ./bendform.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded pipeline config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    ///
    /// Unknown keys are reported as warnings, never as errors.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate the config for internal consistency.
    ///
    /// Rules:
    /// - Run range must be ordered
    /// - Quantization step must be positive
    /// - Encoder channel count is fixed by the display schema
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.runs.start > self.runs.end {
            errors.push(format!(
                "runs.start ({}) must be <= runs.end ({})",
                self.runs.start, self.runs.end
            ));
        }

        if self.encoder.quant <= 0 {
            errors.push(format!("encoder.quant = {} must be > 0", self.encoder.quant));
        }

        if self.encoder.num_channels != defaults::NUM_CHANNELS {
            errors.push(format!(
                "encoder.num_channels = {} but the display schema has exactly {} channels",
                self.encoder.num_channels,
                defaults::NUM_CHANNELS
            ));
        }

        if self.paths.folder_prefix.is_empty() {
            errors.push("paths.folder_prefix must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Path of the parameter table.
    pub fn parameter_path(&self) -> PathBuf {
        self.paths.base_dir.join(&self.paths.parameter_file)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Paths
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Dataset root holding the parameter table and the run folders
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Merged run tables and window statistics are written here
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Encoded channel scripts are written here
    #[serde(default = "default_website_dir")]
    pub website_dir: PathBuf,

    /// Parameter table file name inside `base_dir`
    #[serde(default = "default_parameter_file")]
    pub parameter_file: String,

    /// Run folder prefix (folders are `<prefix><id:02>`)
    #[serde(default = "default_folder_prefix")]
    pub folder_prefix: String,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("Simulation Data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_website_dir() -> PathBuf {
    PathBuf::from("website_data")
}
fn default_parameter_file() -> String {
    defaults::PARAMETER_FILE.to_string()
}
fn default_folder_prefix() -> String {
    defaults::FOLDER_PREFIX.to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            output_dir: default_output_dir(),
            website_dir: default_website_dir(),
            parameter_file: default_parameter_file(),
            folder_prefix: default_folder_prefix(),
        }
    }
}

// ============================================================================
// Run Range
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRangeConfig {
    #[serde(default = "default_run_start")]
    pub start: u32,

    /// Inclusive
    #[serde(default = "default_run_end")]
    pub end: u32,
}

fn default_run_start() -> u32 {
    defaults::RUN_START
}
fn default_run_end() -> u32 {
    defaults::RUN_END
}

impl Default for RunRangeConfig {
    fn default() -> Self {
        Self {
            start: default_run_start(),
            end: default_run_end(),
        }
    }
}

impl RunRangeConfig {
    pub fn ids(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }
}

// ============================================================================
// Stage Options
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareConfig {
    /// Keep the `Time` column in merged tables and window statistics
    #[serde(default)]
    pub keep_time: bool,

    /// Write `Simulation_<id>.csv` for every loaded run
    #[serde(default = "default_true")]
    pub save_merged: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            keep_time: false,
            save_merged: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowingConfig {
    /// Window placement around each geometry angle
    #[serde(default)]
    pub method: WindowPolicy,

    /// Persist `sim_<id>_<variant>_stats.csv`
    #[serde(default = "default_true")]
    pub save_stats: bool,
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            method: WindowPolicy::default(),
            save_stats: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    #[serde(default = "default_quant")]
    pub quant: i64,

    /// Fixed by the display schema; present so configs can state it
    #[serde(default = "default_num_channels")]
    pub num_channels: usize,
}

fn default_quant() -> i64 {
    defaults::DEFAULT_QUANT
}
fn default_num_channels() -> usize {
    defaults::NUM_CHANNELS
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            quant: default_quant(),
            num_channels: default_num_channels(),
        }
    }
}
