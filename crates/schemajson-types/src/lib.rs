//! schemajson data model
//!
//! Fields, schemas and ordered metadata that the interchange converters read
//! and produce, plus the closed tag vocabularies of the wire format.

use serde::{Deserialize, Serialize};

mod error;
pub mod tags;
mod types;

pub use error::TypeError;
pub use tags::{IntervalUnitTag, PrecisionTag, TypeTag, UnitTag};
pub use types::*;

/// Metadata key naming the extension type of a field
pub const EXTENSION_NAME_KEY: &str = "ARROW:extension:name";

/// Metadata key carrying the serialized extension payload
pub const EXTENSION_METADATA_KEY: &str = "ARROW:extension:metadata";

/// One metadata entry, in its wire shape `{"key": .., "value": ..}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered key/value metadata.
///
/// Keys may repeat and order is significant; nothing here sorts or
/// deduplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Vec<KeyValue>);

impl Metadata {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(KeyValue::new(key, value));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyValue> {
        self.0.iter()
    }

    /// Value of the first entry with `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|kv| kv.key == key).map(|kv| kv.value.as_str())
    }

    /// Index of the first entry with `key`
    pub fn position(&self, key: &str) -> Option<usize> {
        self.0.iter().position(|kv| kv.key == key)
    }

    pub fn entry(&self, index: usize) -> Option<&KeyValue> {
        self.0.get(index)
    }

    /// Remove the entry at `index`, shifting later entries down.
    pub fn remove(&mut self, index: usize) -> Option<KeyValue> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }
}

impl From<Vec<KeyValue>> for Metadata {
    fn from(entries: Vec<KeyValue>) -> Self {
        Self(entries)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| KeyValue::new(k, v)).collect())
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = &'a KeyValue;
    type IntoIter = std::slice::Iter<'a, KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A named, typed, nullable schema element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub metadata: Metadata,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Ordered fields plus schema-level metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub fields: Vec<Field>,
    pub metadata: Metadata,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}
