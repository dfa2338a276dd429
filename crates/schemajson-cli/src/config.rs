//! Configuration for the schemajson binary
//!
//! Loaded from an optional YAML file. Environment variables override the
//! file, and command-line flags override both.

use schemajson_convert::{ConverterConfig, ExtensionFailurePolicy};
use schemajson_registry::{ExtensionError, ExtensionRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid extension list: {0}")]
    Extension(#[from] ExtensionError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive (trace, debug, info, warn, error, or per module)
    pub level: String,

    /// pretty, json, compact
    pub format: String,

    /// stderr, file, both
    pub output: String,

    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            output: "stderr".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub conversion: ConverterConfig,

    /// Extension names registered as opaque pass-through types
    pub extensions: Vec<String>,

    pub logging: LoggingConfig,
}

impl Config {
    /// Load from a YAML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env();
        Ok(config)
    }

    /// Defaults plus environment overrides, for runs without a file.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(depth) = std::env::var("SCHEMAJSON_MAX_DEPTH") {
            if let Ok(depth) = depth.parse() {
                self.conversion.max_depth = depth;
            }
        }
        if let Ok(policy) = std::env::var("SCHEMAJSON_EXTENSION_FAILURE") {
            if let Some(policy) = ExtensionFailurePolicy::parse(&policy) {
                self.conversion.extension_failure = policy;
            }
        }
        if let Ok(names) = std::env::var("SCHEMAJSON_EXTENSIONS") {
            self.extensions = names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.logging.directory = dir;
        }
    }

    /// Registry with every configured extension as an opaque type.
    /// Naming the same extension twice is an error.
    pub fn registry(&self) -> Result<ExtensionRegistry, ConfigError> {
        let mut registry = ExtensionRegistry::new();
        for name in &self.extensions {
            registry.register_opaque(name.as_str())?;
        }
        Ok(registry)
    }
}
