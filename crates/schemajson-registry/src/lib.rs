//! Extension type registry
//!
//! Converters only consume the [`ExtensionLookup`] contract. Hosts pass a
//! registry in explicitly; there is no process-wide table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use schemajson_types::{DataType, ExtensionType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Extension '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Extension '{name}' rejected payload: {reason}")]
    InvalidPayload { name: String, reason: String },

    #[error("Extension '{name}' cannot be stored as {storage}")]
    StorageMismatch { name: String, storage: String },
}

/// Rebuilds a named extension type from its storage type and payload
pub trait ExtensionFactory: Send + Sync {
    fn name(&self) -> &str;

    fn deserialize(&self, storage: &DataType, payload: &str) -> Result<DataType, ExtensionError>;
}

/// Read-only lookup of extension factories by name
pub trait ExtensionLookup: Send + Sync {
    fn lookup(&self, name: &str) -> Option<&dyn ExtensionFactory>;
}

/// Lookup that knows no extensions; every extension passes through as storage
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRegistry;

impl ExtensionLookup for EmptyRegistry {
    fn lookup(&self, _name: &str) -> Option<&dyn ExtensionFactory> {
        None
    }
}

/// Factory that accepts any storage and payload and re-wraps them unchanged
#[derive(Debug, Clone)]
pub struct OpaqueExtension {
    name: String,
}

impl OpaqueExtension {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ExtensionFactory for OpaqueExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn deserialize(&self, storage: &DataType, payload: &str) -> Result<DataType, ExtensionError> {
        Ok(DataType::Extension(ExtensionType::new(
            self.name.clone(),
            Some(payload.to_string()),
            storage.clone(),
        )))
    }
}

/// Name-keyed table of extension factories
#[derive(Default)]
pub struct ExtensionRegistry {
    factories: HashMap<String, Arc<dyn ExtensionFactory>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under its own name. Names are unique.
    pub fn register(&mut self, factory: Arc<dyn ExtensionFactory>) -> Result<(), ExtensionError> {
        let name = factory.name().to_string();
        if self.factories.contains_key(&name) {
            return Err(ExtensionError::AlreadyRegistered(name));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Register an [`OpaqueExtension`] for `name`
    pub fn register_opaque(&mut self, name: impl Into<String>) -> Result<(), ExtensionError> {
        self.register(Arc::new(OpaqueExtension::new(name)))
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ExtensionLookup for ExtensionRegistry {
    fn lookup(&self, name: &str) -> Option<&dyn ExtensionFactory> {
        self.factories.get(name).map(|f| f.as_ref())
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("names", &self.names())
            .finish()
    }
}
