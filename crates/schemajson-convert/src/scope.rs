//! Position tracking for recursive conversion

use crate::error::ConvertError;

/// Where the converter currently is: dotted field path plus nesting depth.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    path: String,
    depth: usize,
}

impl Scope {
    pub(crate) fn root() -> Self {
        Self::default()
    }

    /// Descend into the field `name`, enforcing the depth limit.
    pub(crate) fn enter(&self, name: &str, limit: usize) -> Result<Scope, ConvertError> {
        let path = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path, name)
        };
        let depth = self.depth + 1;
        if depth > limit {
            return Err(ConvertError::NestingTooDeep { path, limit });
        }
        Ok(Scope { path, depth })
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn malformed(&self, reason: impl Into<String>) -> ConvertError {
        ConvertError::MalformedInput {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(&self, reason: impl Into<String>) -> ConvertError {
        ConvertError::InvalidValue {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(&self, data_type: impl ToString) -> ConvertError {
        ConvertError::UnsupportedType {
            path: self.path.clone(),
            data_type: data_type.to_string(),
        }
    }
}
