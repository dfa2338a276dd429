use schemajson_registry::ExtensionError;
use thiserror::Error;

/// Result type local to schemajson-convert.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Conversion failure. `path` is the dotted field path (`outer.inner`),
/// empty at schema level.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Unsupported type at '{path}': {data_type}")]
    UnsupportedType { path: String, data_type: String },

    #[error("Malformed input at '{path}': {reason}")]
    MalformedInput { path: String, reason: String },

    #[error("Invalid value at '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("Extension '{name}' at '{path}' failed to deserialize: {source}")]
    ExtensionDeserializeFailure {
        path: String,
        name: String,
        #[source]
        source: ExtensionError,
    },

    #[error("Nesting at '{path}' exceeds the limit of {limit} levels")]
    NestingTooDeep { path: String, limit: usize },
}

impl ConvertError {
    pub fn path(&self) -> &str {
        match self {
            ConvertError::UnsupportedType { path, .. }
            | ConvertError::MalformedInput { path, .. }
            | ConvertError::InvalidValue { path, .. }
            | ConvertError::ExtensionDeserializeFailure { path, .. }
            | ConvertError::NestingTooDeep { path, .. } => path,
        }
    }
}
