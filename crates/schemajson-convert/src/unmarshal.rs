//! JSON → Field

use schemajson_registry::ExtensionLookup;
use schemajson_types::{
    DataType, Field, IntWidth, IntervalUnitTag, Metadata, PrecisionTag, TimeUnit, TypeError, TypeTag,
    UnitTag,
};
use serde_json::Value;

use crate::config::{ConverterConfig, ExtensionFailurePolicy};
use crate::error::{ConvertError, Result};
use crate::scope::Scope;
use crate::wire::{
    as_object, keys, parse_metadata, require, require_array, require_bool, require_i64, require_int,
    require_object, require_str, Object, ParsedMetadata,
};

pub(crate) struct Unmarshaler<'a> {
    registry: &'a dyn ExtensionLookup,
    config: &'a ConverterConfig,
}

impl<'a> Unmarshaler<'a> {
    pub(crate) fn new(registry: &'a dyn ExtensionLookup, config: &'a ConverterConfig) -> Self {
        Self { registry, config }
    }

    pub(crate) fn field(&self, value: &Value, parent: &Scope) -> Result<Field> {
        let object = as_object(value, "field", parent)?;
        // The name is read before entering so a missing one reports the parent path.
        let name = require_str(object, keys::NAME, parent)?;
        let scope = parent.enter(name, self.config.max_depth)?;

        let nullable = require_bool(object, keys::NULLABLE, &scope)?;
        let type_object = require_object(object, keys::TYPE, &scope)?;
        let storage = self.data_type(type_object, object, &scope)?;

        let parsed = match object.get(keys::METADATA) {
            Some(metadata) => parse_metadata(metadata, &scope)?,
            None => ParsedMetadata::default(),
        };

        let (data_type, metadata) = self.resolve_extension(storage, parsed, &scope)?;
        tracing::trace!(path = scope.path(), data_type = %data_type, "unmarshal field");

        Ok(Field {
            name: name.to_string(),
            data_type,
            nullable,
            metadata,
        })
    }

    fn data_type(&self, type_object: &Object, field_object: &Object, scope: &Scope) -> Result<DataType> {
        let tag_name = require_str(type_object, keys::NAME, scope)?;

        let data_type = match TypeTag::lookup(tag_name) {
            TypeTag::Null => DataType::Null,
            TypeTag::Bool => DataType::Boolean,
            TypeTag::Int => {
                let signed = require_bool(type_object, keys::IS_SIGNED, scope)?;
                let bits = require_i64(type_object, keys::BIT_WIDTH, scope)?;
                let width = IntWidth::from_bits(bits).map_err(|e| scope.invalid(e.to_string()))?;
                DataType::Int { signed, width }
            }
            TypeTag::FloatingPoint => {
                let literal = require_str(type_object, keys::PRECISION, scope)?;
                let precision = PrecisionTag::lookup(literal)
                    .precision()
                    .ok_or_else(|| scope.invalid(format!("unknown precision '{}'", literal)))?;
                DataType::FloatingPoint(precision)
            }
            TypeTag::Utf8 => DataType::Utf8,
            TypeTag::Binary => DataType::Binary,
            TypeTag::FixedSizeBinary => {
                DataType::FixedSizeBinary(require_int(type_object, keys::BYTE_WIDTH, true, scope)?)
            }
            TypeTag::Date => {
                let literal = require_str(type_object, keys::UNIT, scope)?;
                let unit = UnitTag::lookup(literal)
                    .date_unit()
                    .ok_or_else(|| scope.invalid(format!("'{}' is not a date unit", literal)))?;
                DataType::Date(unit)
            }
            TypeTag::Time => {
                let bits = require_i64(type_object, keys::BIT_WIDTH, scope)?;
                let unit = time_unit(type_object, scope)?;
                let time = match bits {
                    32 => DataType::time32(unit),
                    64 => DataType::time64(unit),
                    other => Err(TypeError::TimeBitWidth(other)),
                };
                time.map_err(|e| scope.invalid(e.to_string()))?
            }
            TypeTag::Timestamp => {
                let unit = time_unit(type_object, scope)?;
                let timezone = require_str(type_object, keys::TIMEZONE, scope)?;
                DataType::timestamp(unit, timezone)
            }
            TypeTag::Interval => {
                let literal = require_str(type_object, keys::UNIT, scope)?;
                let unit = IntervalUnitTag::lookup(literal)
                    .interval_unit()
                    .ok_or_else(|| scope.invalid(format!("'{}' is not an interval unit", literal)))?;
                DataType::Interval(unit)
            }
            TypeTag::Duration => DataType::Duration(time_unit(type_object, scope)?),
            TypeTag::Decimal => DataType::Decimal {
                precision: require_int(type_object, keys::PRECISION, true, scope)?,
                scale: require_int(type_object, keys::SCALE, false, scope)?,
            },
            TypeTag::List => DataType::List(Box::new(self.single_child(field_object, scope)?)),
            TypeTag::FixedSizeList => {
                let list_size = require_int(type_object, keys::LIST_SIZE, true, scope)?;
                DataType::FixedSizeList(Box::new(self.single_child(field_object, scope)?), list_size)
            }
            TypeTag::Struct => {
                let children = require_array(field_object, keys::CHILDREN, scope)?;
                let fields = children
                    .iter()
                    .map(|child| self.field(child, scope))
                    .collect::<Result<Vec<_>>>()?;
                DataType::Struct(fields)
            }
            TypeTag::Map => {
                let keys_sorted = require_bool(type_object, keys::KEY_SORTED, scope)?;
                let (key, item) = self.map_entry(field_object, scope)?;
                DataType::Map {
                    key: Box::new(key),
                    item: Box::new(item),
                    keys_sorted,
                }
            }
            unsupported @ (TypeTag::Union
            | TypeTag::Dictionary
            | TypeTag::LargeUtf8
            | TypeTag::LargeBinary
            | TypeTag::LargeList) => return Err(scope.unsupported(unsupported)),
            TypeTag::NotSet => return Err(scope.invalid(format!("unknown type name '{}'", tag_name))),
        };
        Ok(data_type)
    }

    fn single_child(&self, field_object: &Object, scope: &Scope) -> Result<Field> {
        match require_array(field_object, keys::CHILDREN, scope)?.as_slice() {
            [child] => self.field(child, scope),
            other => Err(scope.malformed(format!("expected exactly one child, found {}", other.len()))),
        }
    }

    fn map_entry(&self, field_object: &Object, scope: &Scope) -> Result<(Field, Field)> {
        let entry = match require_array(field_object, keys::CHILDREN, scope)?.as_slice() {
            [entry] => as_object(entry, "map entry", scope)?,
            other => {
                return Err(scope.malformed(format!(
                    "map expects exactly one entry in 'children', found {}",
                    other.len()
                )))
            }
        };
        if let Some(extra) = entry.keys().find(|k| *k != keys::MAP_KEY && *k != keys::MAP_ITEM) {
            return Err(scope.malformed(format!("unexpected key '{}' in map entry", extra)));
        }
        let key = self.field(require(entry, keys::MAP_KEY, scope)?, scope)?;
        let item = self.field(require(entry, keys::MAP_ITEM, scope)?, scope)?;
        Ok((key, item))
    }

    /// Turn a storage type plus its metadata into the field's final type.
    fn resolve_extension(
        &self,
        storage: DataType,
        parsed: ParsedMetadata,
        scope: &Scope,
    ) -> Result<(DataType, Metadata)> {
        let ParsedMetadata {
            mut metadata,
            extension_name,
            extension_payload,
        } = parsed;

        let Some(name_index) = extension_name else {
            return Ok((storage, metadata));
        };
        let name = match metadata.entry(name_index) {
            Some(entry) => entry.value.clone(),
            None => return Ok((storage, metadata)),
        };

        let Some(factory) = self.registry.lookup(&name) else {
            tracing::debug!(path = scope.path(), extension = %name, "unregistered extension kept as storage type");
            return Ok((storage, metadata));
        };

        let payload = extension_payload
            .and_then(|i| metadata.entry(i))
            .map(|entry| entry.value.clone())
            .unwrap_or_default();

        // Higher index first so the lower one stays valid.
        let mut reserved: Vec<usize> = std::iter::once(name_index).chain(extension_payload).collect();
        reserved.sort_unstable_by(|a, b| b.cmp(a));
        for index in reserved {
            metadata.remove(index);
        }

        match factory.deserialize(&storage, &payload) {
            Ok(data_type) => Ok((data_type, metadata)),
            Err(source) => match self.config.extension_failure {
                ExtensionFailurePolicy::Fallback => {
                    tracing::warn!(
                        path = scope.path(),
                        extension = %name,
                        error = %source,
                        "extension failed to deserialize, using storage type"
                    );
                    Ok((storage, metadata))
                }
                ExtensionFailurePolicy::Strict => Err(ConvertError::ExtensionDeserializeFailure {
                    path: scope.path().to_string(),
                    name,
                    source,
                }),
            },
        }
    }
}

fn time_unit(type_object: &Object, scope: &Scope) -> Result<TimeUnit> {
    let literal = require_str(type_object, keys::UNIT, scope)?;
    UnitTag::lookup(literal)
        .time_unit()
        .ok_or_else(|| scope.invalid(format!("'{}' is not a time unit", literal)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemajson_registry::{EmptyRegistry, ExtensionRegistry};
    use schemajson_types::{DateUnit, EXTENSION_METADATA_KEY, EXTENSION_NAME_KEY};
    use serde_json::json;

    fn unmarshal(value: Value) -> Result<Field> {
        let config = ConverterConfig::default();
        Unmarshaler::new(&EmptyRegistry, &config).field(&value, &Scope::root())
    }

    fn field_with_type(type_json: Value) -> Value {
        json!({"name": "f", "nullable": true, "type": type_json})
    }

    #[test]
    fn test_int_field() {
        let field = unmarshal(json!({
            "name": "IntField",
            "nullable": true,
            "type": {"name": "int", "isSigned": true, "bitWidth": 32},
        }))
        .unwrap();
        assert_eq!(field, Field::new("IntField", DataType::int32(), true));
    }

    #[test]
    fn test_scalar_types() {
        let cases = vec![
            (json!({"name": "null"}), DataType::Null),
            (json!({"name": "bool"}), DataType::Boolean),
            (json!({"name": "int", "isSigned": false, "bitWidth": 64}), DataType::uint64()),
            (json!({"name": "floatingpoint", "precision": "DOUBLE"}), DataType::float64()),
            (json!({"name": "utf8"}), DataType::Utf8),
            (json!({"name": "binary"}), DataType::Binary),
            (json!({"name": "fixedsizebinary", "byteWidth": 4}), DataType::FixedSizeBinary(4)),
            (json!({"name": "date", "unit": "MILLISECOND"}), DataType::Date(DateUnit::Millisecond)),
            (
                json!({"name": "time", "isSigned": false, "bitWidth": 64, "unit": "MICROSECOND"}),
                DataType::Time64(TimeUnit::Microsecond),
            ),
            (
                json!({"name": "timestamp", "unit": "NANOSECOND", "timezone": "Europe/Paris"}),
                DataType::timestamp(TimeUnit::Nanosecond, "Europe/Paris"),
            ),
            (json!({"name": "duration", "unit": "SECOND"}), DataType::Duration(TimeUnit::Second)),
            (
                json!({"name": "decimal", "precision": 38, "scale": -2}),
                DataType::Decimal { precision: 38, scale: -2 },
            ),
        ];
        for (type_json, expected) in cases {
            let field = unmarshal(field_with_type(type_json.clone())).unwrap();
            assert_eq!(field.data_type, expected, "{}", type_json);
        }
    }

    #[test]
    fn test_bad_vocabulary_is_invalid_value() {
        let cases = vec![
            json!({"name": "integer"}),
            json!({"name": "int", "isSigned": true, "bitWidth": 24}),
            json!({"name": "floatingpoint", "precision": "QUAD"}),
            json!({"name": "date", "unit": "SECOND"}),
            json!({"name": "time", "isSigned": false, "bitWidth": 32, "unit": "NANOSECOND"}),
            json!({"name": "time", "isSigned": false, "bitWidth": 16, "unit": "SECOND"}),
            json!({"name": "timestamp", "unit": "DAY", "timezone": ""}),
            json!({"name": "interval", "unit": "WEEK"}),
            json!({"name": "fixedsizebinary", "byteWidth": -1}),
        ];
        for type_json in cases {
            let err = unmarshal(field_with_type(type_json.clone())).unwrap_err();
            assert!(matches!(err, ConvertError::InvalidValue { .. }), "{}: {}", type_json, err);
        }
    }

    #[test]
    fn test_missing_keys_are_malformed() {
        let cases = vec![
            json!({"name": "f", "type": {"name": "utf8"}}),
            json!({"name": "f", "nullable": true}),
            json!({"name": "f", "nullable": "yes", "type": {"name": "utf8"}}),
            field_with_type(json!({"name": "int", "bitWidth": 32})),
            field_with_type(json!({"name": "timestamp", "unit": "SECOND"})),
            field_with_type(json!({"name": "decimal", "precision": 10})),
            field_with_type(json!({"name": "map", "keySorted": false})),
            field_with_type(json!({"unit": "DAY"})),
        ];
        for value in cases {
            let err = unmarshal(value.clone()).unwrap_err();
            assert!(matches!(err, ConvertError::MalformedInput { .. }), "{}: {}", value, err);
        }
    }

    #[test]
    fn test_struct_missing_children_is_malformed() {
        let err = unmarshal(field_with_type(json!({"name": "struct"}))).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput { ref path, .. } if path == "f"));
    }

    #[test]
    fn test_list_needs_exactly_one_child() {
        let mut value = field_with_type(json!({"name": "list"}));
        value["children"] = json!([]);
        assert!(matches!(unmarshal(value.clone()).unwrap_err(), ConvertError::MalformedInput { .. }));

        let item = json!({"name": "item", "nullable": true, "type": {"name": "bool"}});
        value["children"] = json!([item.clone(), item]);
        assert!(matches!(unmarshal(value).unwrap_err(), ConvertError::MalformedInput { .. }));
    }

    #[test]
    fn test_map_entry_shape() {
        let key = json!({"name": "k", "nullable": false, "type": {"name": "utf8"}});
        let item = json!({"name": "v", "nullable": true, "type": {"name": "bool"}});

        let mut value = field_with_type(json!({"name": "map", "keySorted": false}));
        value["children"] = json!([{"key": key.clone(), "item": item.clone()}]);
        let field = unmarshal(value.clone()).unwrap();
        assert_eq!(
            field.data_type,
            DataType::map(
                Field::new("k", DataType::Utf8, false),
                Field::new("v", DataType::Boolean, true),
                false
            )
        );

        value["children"] = json!([key.clone(), item.clone()]);
        assert!(matches!(unmarshal(value.clone()).unwrap_err(), ConvertError::MalformedInput { .. }));

        value["children"] = json!([{"key": key.clone()}]);
        assert!(matches!(unmarshal(value.clone()).unwrap_err(), ConvertError::MalformedInput { .. }));

        value["children"] = json!([{"key": key, "item": item, "extra": 1}]);
        assert!(matches!(unmarshal(value).unwrap_err(), ConvertError::MalformedInput { .. }));
    }

    #[test]
    fn test_unsupported_tags() {
        for tag in ["union", "dictionary", "largeutf8", "largebinary", "largelist"] {
            let err = unmarshal(field_with_type(json!({ "name": tag }))).unwrap_err();
            assert!(matches!(err, ConvertError::UnsupportedType { .. }), "{}", tag);
        }
    }

    #[test]
    fn test_every_tag_name_is_recognized() {
        // a bare name may lack required keys, but it is never an unknown type
        for tag in TypeTag::ALL {
            match unmarshal(field_with_type(json!({ "name": tag.as_str() }))) {
                Ok(_) | Err(ConvertError::MalformedInput { .. }) | Err(ConvertError::UnsupportedType { .. }) => {}
                Err(err) => panic!("{}: {}", tag, err),
            }
        }
    }

    #[test]
    fn test_nested_error_path() {
        let value = json!({
            "name": "outer",
            "nullable": true,
            "type": {"name": "struct"},
            "children": [{"name": "inner", "nullable": true, "type": {"name": "bogus"}}],
        });
        let err = unmarshal(value).unwrap_err();
        assert_eq!(err.path(), "outer.inner");
    }

    #[test]
    fn test_unregistered_extension_keeps_metadata() {
        let mut value = field_with_type(json!({"name": "fixedsizebinary", "byteWidth": 16}));
        value["metadata"] = json!([
            {"key": EXTENSION_NAME_KEY, "value": "uuid"},
            {"key": EXTENSION_METADATA_KEY, "value": "uuid-serialized"},
        ]);
        let field = unmarshal(value).unwrap();
        assert_eq!(field.data_type, DataType::FixedSizeBinary(16));
        assert_eq!(field.metadata.get(EXTENSION_NAME_KEY), Some("uuid"));
        assert_eq!(field.metadata.get(EXTENSION_METADATA_KEY), Some("uuid-serialized"));
    }

    #[test]
    fn test_opaque_extension_strips_reserved_keys() {
        let mut registry = ExtensionRegistry::new();
        registry.register_opaque("geo").unwrap();
        let config = ConverterConfig::default();

        let mut value = field_with_type(json!({"name": "binary"}));
        value["metadata"] = json!([
            {"key": EXTENSION_METADATA_KEY, "value": "wkb"},
            {"key": "crs", "value": "4326"},
            {"key": EXTENSION_NAME_KEY, "value": "geo"},
        ]);
        let field = Unmarshaler::new(&registry, &config)
            .field(&value, &Scope::root())
            .unwrap();
        assert_eq!(
            field.data_type,
            DataType::extension("geo", Some("wkb".to_string()), DataType::Binary)
        );
        assert_eq!(field.metadata.len(), 1);
        assert_eq!(field.metadata.get("crs"), Some("4326"));
    }
}
