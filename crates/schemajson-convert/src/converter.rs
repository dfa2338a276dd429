//! Whole-schema conversion in both directions

use schemajson_registry::{EmptyRegistry, ExtensionLookup};
use schemajson_types::{Field, Metadata, Schema};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::ConverterConfig;
use crate::error::Result;
use crate::marshal::Marshaler;
use crate::scope::Scope;
use crate::unmarshal::Unmarshaler;
use crate::wire::{as_object, keys, metadata_to_json, parse_metadata, require_array, require_object, Object};

/// Schema ↔ JSON converter bound to an extension registry.
///
/// The registry is only consulted on the way in; marshaling never needs it.
pub struct SchemaConverter<'r> {
    registry: &'r dyn ExtensionLookup,
    config: ConverterConfig,
}

impl<'r> SchemaConverter<'r> {
    pub fn new(registry: &'r dyn ExtensionLookup) -> Self {
        Self::with_config(registry, ConverterConfig::default())
    }

    pub fn with_config(registry: &'r dyn ExtensionLookup, config: ConverterConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// `{"schema": {"fields": [...], "metadata": [...]}}`, with `metadata`
    /// omitted when empty. The first failing field aborts the whole schema.
    pub fn schema_to_json(&self, schema: &Schema) -> Result<Value> {
        let marshaler = Marshaler::new(&self.config);
        let root = Scope::root();
        let fields = schema
            .fields
            .iter()
            .map(|field| marshaler.field(field, &root))
            .collect::<Result<Vec<_>>>()?;

        let mut body = Object::new();
        body.insert(keys::FIELDS.to_string(), Value::Array(fields));
        if !schema.metadata.is_empty() {
            body.insert(keys::METADATA.to_string(), Value::Array(metadata_to_json(&schema.metadata)));
        }

        tracing::debug!(fields = schema.fields.len(), "schema marshaled");

        let mut document = Object::new();
        document.insert(keys::SCHEMA.to_string(), Value::Object(body));
        Ok(Value::Object(document))
    }

    pub fn json_to_schema(&self, json: &Value) -> Result<Schema> {
        let root = Scope::root();
        let document = as_object(json, "document", &root)?;
        let body = require_object(document, keys::SCHEMA, &root)?;

        let unmarshaler = Unmarshaler::new(self.registry, &self.config);
        let fields = require_array(body, keys::FIELDS, &root)?
            .iter()
            .map(|field| unmarshaler.field(field, &root))
            .collect::<Result<Vec<_>>>()?;

        // Reserved extension keys carry no meaning at schema level.
        let metadata = match body.get(keys::METADATA) {
            Some(value) => parse_metadata(value, &root)?.metadata,
            None => Metadata::new(),
        };

        tracing::debug!(fields = fields.len(), "schema unmarshaled");
        Ok(Schema { fields, metadata })
    }

    pub fn field_to_json(&self, field: &Field) -> Result<Value> {
        Marshaler::new(&self.config).field(field, &Scope::root())
    }

    pub fn json_to_field(&self, json: &Value) -> Result<Field> {
        Unmarshaler::new(self.registry, &self.config).field(json, &Scope::root())
    }

    /// Hex SHA-256 of the canonical encoding with object keys sorted.
    /// Equal schemas always hash equal, whatever key order a JSON backend uses.
    pub fn fingerprint(&self, schema: &Schema) -> Result<String> {
        let json = self.schema_to_json(schema)?;
        let mut canonical = String::new();
        write_canonical(&json, &mut canonical);

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl std::fmt::Debug for SchemaConverter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaConverter").field("config", &self.config).finish_non_exhaustive()
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(object) => {
            let mut entries: Vec<(&String, &Value)> = object.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Marshal with default settings.
pub fn schema_to_json(schema: &Schema) -> Result<Value> {
    SchemaConverter::new(&EmptyRegistry).schema_to_json(schema)
}

/// Unmarshal with default settings and no registered extensions.
pub fn json_to_schema(json: &Value) -> Result<Schema> {
    SchemaConverter::new(&EmptyRegistry).json_to_schema(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use schemajson_types::{DataType, UnionMode};
    use serde_json::json;

    fn sample() -> Schema {
        Schema::new(vec![
            Field::new("IntField", DataType::int32(), true),
            Field::new("FloatField", DataType::float32(), false),
        ])
        .with_metadata([("origin", "test"), ("origin", "again")].into_iter().collect())
    }

    #[test]
    fn test_schema_shape() {
        let json = schema_to_json(&sample()).unwrap();
        assert_eq!(
            json,
            json!({
                "schema": {
                    "fields": [
                        {"name": "IntField", "nullable": true, "type": {"name": "int", "isSigned": true, "bitWidth": 32}},
                        {"name": "FloatField", "nullable": false, "type": {"name": "floatingpoint", "precision": "SINGLE"}},
                    ],
                    "metadata": [
                        {"key": "origin", "value": "test"},
                        {"key": "origin", "value": "again"},
                    ],
                }
            })
        );
    }

    #[test]
    fn test_empty_schema_metadata_omitted() {
        let json = schema_to_json(&Schema::new(vec![])).unwrap();
        assert_eq!(json, json!({"schema": {"fields": []}}));
        assert_eq!(json_to_schema(&json).unwrap(), Schema::new(vec![]));
    }

    #[test]
    fn test_round_trip() {
        let schema = sample();
        let back = json_to_schema(&schema_to_json(&schema).unwrap()).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_union_aborts_schema() {
        let schema = Schema::new(vec![
            Field::new("ok", DataType::Utf8, true),
            Field::new(
                "u",
                DataType::Union {
                    fields: vec![Field::new("a", DataType::int8(), true)],
                    mode: UnionMode::Dense,
                },
                true,
            ),
        ]);
        let err = schema_to_json(&schema).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedType { ref path, .. } if path == "u"));
    }

    #[test]
    fn test_missing_fields_is_malformed() {
        for json in [json!({}), json!({"schema": {}}), json!({"schema": {"fields": {}}}), json!([])] {
            let err = json_to_schema(&json).unwrap_err();
            assert!(matches!(err, ConvertError::MalformedInput { .. }), "{}", json);
        }
    }

    #[test]
    fn test_field_entry_points() {
        let converter = SchemaConverter::new(&EmptyRegistry);
        let field = Field::new("f", DataType::list(Field::new("item", DataType::Utf8, true)), true);
        let json = converter.field_to_json(&field).unwrap();
        assert_eq!(converter.json_to_field(&json).unwrap(), field);
    }

    #[test]
    fn test_fingerprint_stable_and_sensitive() {
        let converter = SchemaConverter::new(&EmptyRegistry);
        let a = converter.fingerprint(&sample()).unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, converter.fingerprint(&sample()).unwrap());

        let mut changed = sample();
        changed.fields[1].nullable = true;
        assert_ne!(a, converter.fingerprint(&changed).unwrap());
    }

    #[test]
    fn test_canonical_writer_sorts_keys() {
        let mut out = String::new();
        write_canonical(&json!({"b": [1, {"d": null, "c": "x\"y"}], "a": true}), &mut out);
        assert_eq!(out, r#"{"a":true,"b":[1,{"c":"x\"y","d":null}]}"#);
    }
}
