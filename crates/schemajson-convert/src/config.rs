//! Converter configuration

use serde::{Deserialize, Serialize};

/// What to do when a registered extension fails to deserialize its payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionFailurePolicy {
    /// Keep the storage type (extension keys already stripped) and log a warning
    #[default]
    Fallback,
    /// Surface the failure as `ConvertError::ExtensionDeserializeFailure`
    Strict,
}

impl ExtensionFailurePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fallback" => Some(ExtensionFailurePolicy::Fallback),
            "strict" => Some(ExtensionFailurePolicy::Strict),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Deepest field nesting accepted in either direction. Top-level fields
    /// are depth 1.
    pub max_depth: usize,

    pub extension_failure: ExtensionFailurePolicy,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            extension_failure: ExtensionFailurePolicy::Fallback,
        }
    }
}

impl ConverterConfig {
    /// Defaults overridden by environment variables.
    ///
    /// - `SCHEMAJSON_MAX_DEPTH`: maximum field nesting depth
    /// - `SCHEMAJSON_EXTENSION_FAILURE`: `fallback` or `strict`
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("SCHEMAJSON_MAX_DEPTH") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_depth = v;
            }
        }

        if let Ok(s) = std::env::var("SCHEMAJSON_EXTENSION_FAILURE") {
            if let Some(policy) = ExtensionFailurePolicy::parse(&s) {
                cfg.extension_failure = policy;
            }
        }

        cfg
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn strict(mut self) -> Self {
        self.extension_failure = ExtensionFailurePolicy::Strict;
        self
    }
}
