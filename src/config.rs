//! Configuration management for sceviz
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (sceviz.toml)
//! - Environment variables (SCEVIZ__*, e.g. SCEVIZ__PIPELINE__MAX_DEPTH)
//!
//! ## Example config file (sceviz.toml):
//! ```toml
//! [pipeline]
//! max_depth = 128
//! strict_array_indices = false
//!
//! [input]
//! max_bytes = 1048576
//! allowed_extensions = ["json"]
//!
//! [output]
//! format = "pretty"
//! grabbable_nodes = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::schema::flatten::DEFAULT_MAX_DEPTH;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VizConfig {
    /// Conversion settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Document loading restrictions
    #[serde(default)]
    pub input: InputConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Deepest nesting accepted before the walk is aborted
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Reject numeric property names instead of folding them into arrays
    #[serde(default)]
    pub strict_array_indices: bool,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Largest document accepted, in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Accepted file extensions (without the dot)
    #[serde(default = "default_extensions")]
    pub allowed_extensions: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON layout
    #[serde(default)]
    pub format: OutputFormat,

    /// Let viewers drag schema nodes
    #[serde(default)]
    pub grabbable_nodes: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

// Default value functions
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_bytes() -> u64 {
    1024 * 1024
}

fn default_extensions() -> Vec<String> {
    vec!["json".to_string()]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            strict_array_indices: false,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            allowed_extensions: default_extensions(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            grabbable_nodes: false,
        }
    }
}

impl VizConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["sceviz.toml", ".sceviz.toml", "config/sceviz.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "sceviz", "sceviz") {
            let xdg_config = config_dir.config_dir().join("sceviz.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (SCEVIZ__*)
        builder = builder.add_source(
            Environment::with_prefix("SCEVIZ")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
