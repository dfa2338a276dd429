//! JSON wire shape: key names and typed accessors over `serde_json::Value`.

use schemajson_types::{KeyValue, Metadata, EXTENSION_METADATA_KEY, EXTENSION_NAME_KEY};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::scope::Scope;

pub(crate) type Object = Map<String, Value>;

pub(crate) mod keys {
    pub const SCHEMA: &str = "schema";
    pub const FIELDS: &str = "fields";
    pub const NAME: &str = "name";
    pub const NULLABLE: &str = "nullable";
    pub const TYPE: &str = "type";
    pub const METADATA: &str = "metadata";
    pub const CHILDREN: &str = "children";
    pub const IS_SIGNED: &str = "isSigned";
    pub const BIT_WIDTH: &str = "bitWidth";
    pub const PRECISION: &str = "precision";
    pub const SCALE: &str = "scale";
    pub const UNIT: &str = "unit";
    pub const TIMEZONE: &str = "timezone";
    pub const BYTE_WIDTH: &str = "byteWidth";
    pub const LIST_SIZE: &str = "listSize";
    pub const KEY_SORTED: &str = "keySorted";
    pub const MAP_KEY: &str = "key";
    pub const MAP_ITEM: &str = "item";
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn as_object<'v>(value: &'v Value, what: &str, scope: &Scope) -> Result<&'v Object> {
    value
        .as_object()
        .ok_or_else(|| scope.malformed(format!("{} must be an object, found {}", what, kind(value))))
}

pub(crate) fn require<'v>(object: &'v Object, key: &str, scope: &Scope) -> Result<&'v Value> {
    object
        .get(key)
        .ok_or_else(|| scope.malformed(format!("missing required key '{}'", key)))
}

pub(crate) fn require_str<'v>(object: &'v Object, key: &str, scope: &Scope) -> Result<&'v str> {
    let value = require(object, key, scope)?;
    value
        .as_str()
        .ok_or_else(|| scope.malformed(format!("'{}' must be a string, found {}", key, kind(value))))
}

pub(crate) fn require_bool(object: &Object, key: &str, scope: &Scope) -> Result<bool> {
    let value = require(object, key, scope)?;
    value
        .as_bool()
        .ok_or_else(|| scope.malformed(format!("'{}' must be a boolean, found {}", key, kind(value))))
}

pub(crate) fn require_i64(object: &Object, key: &str, scope: &Scope) -> Result<i64> {
    let value = require(object, key, scope)?;
    value
        .as_i64()
        .ok_or_else(|| scope.malformed(format!("'{}' must be an integer, found {}", key, value)))
}

pub(crate) fn require_array<'v>(object: &'v Object, key: &str, scope: &Scope) -> Result<&'v Vec<Value>> {
    let value = require(object, key, scope)?;
    value
        .as_array()
        .ok_or_else(|| scope.malformed(format!("'{}' must be an array, found {}", key, kind(value))))
}

pub(crate) fn require_object<'v>(object: &'v Object, key: &str, scope: &Scope) -> Result<&'v Object> {
    let value = require(object, key, scope)?;
    as_object(value, &format!("'{}'", key), scope)
}

/// Integer key that must fit `T` (and be non-negative when `T` is unsigned
/// or `non_negative` is set); range violations are invalid values.
pub(crate) fn require_int<T>(object: &Object, key: &str, non_negative: bool, scope: &Scope) -> Result<T>
where
    T: TryFrom<i64>,
{
    let raw = require_i64(object, key, scope)?;
    if non_negative && raw < 0 {
        return Err(scope.invalid(format!("'{}' must not be negative, got {}", key, raw)));
    }
    T::try_from(raw).map_err(|_| scope.invalid(format!("'{}' is out of range: {}", key, raw)))
}

pub(crate) fn metadata_to_json<'a>(entries: impl IntoIterator<Item = &'a KeyValue>) -> Vec<Value> {
    entries
        .into_iter()
        .map(|kv| {
            let mut entry = Object::new();
            entry.insert("key".to_string(), Value::String(kv.key.clone()));
            entry.insert("value".to_string(), Value::String(kv.value.clone()));
            Value::Object(entry)
        })
        .collect()
}

/// Metadata copied verbatim, with the first index of each reserved
/// extension key.
#[derive(Debug, Default)]
pub(crate) struct ParsedMetadata {
    pub(crate) metadata: Metadata,
    pub(crate) extension_name: Option<usize>,
    pub(crate) extension_payload: Option<usize>,
}

pub(crate) fn parse_metadata(value: &Value, scope: &Scope) -> Result<ParsedMetadata> {
    let entries = value
        .as_array()
        .ok_or_else(|| scope.malformed(format!("'metadata' must be an array, found {}", kind(value))))?;

    let mut parsed = ParsedMetadata::default();
    let mut copied = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        let kv = KeyValue::deserialize(entry)
            .map_err(|e| scope.malformed(format!("metadata entry {}: {}", i, e)))?;

        if kv.key == EXTENSION_NAME_KEY && parsed.extension_name.is_none() {
            parsed.extension_name = Some(i);
        } else if kv.key == EXTENSION_METADATA_KEY && parsed.extension_payload.is_none() {
            parsed.extension_payload = Some(i);
        }
        copied.push(kv);
    }

    parsed.metadata = Metadata::from(copied);
    Ok(parsed)
}
