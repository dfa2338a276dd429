//! Field → JSON

use schemajson_types::{
    DataType, Field, IntervalUnitTag, KeyValue, PrecisionTag, TimeUnit, TypeTag, UnitTag,
    EXTENSION_METADATA_KEY, EXTENSION_NAME_KEY,
};
use serde_json::{json, Value};

use crate::config::ConverterConfig;
use crate::error::Result;
use crate::scope::Scope;
use crate::wire::{keys, metadata_to_json, Object};

pub(crate) struct Marshaler<'a> {
    config: &'a ConverterConfig,
}

impl<'a> Marshaler<'a> {
    pub(crate) fn new(config: &'a ConverterConfig) -> Self {
        Self { config }
    }

    pub(crate) fn field(&self, field: &Field, parent: &Scope) -> Result<Value> {
        let scope = parent.enter(&field.name, self.config.max_depth)?;
        let mut metadata = metadata_to_json(&field.metadata);

        // Extension entries go after the field's own, even when the same keys
        // already appear there.
        let data_type = match &field.data_type {
            DataType::Extension(ext) => {
                let mut reserved = vec![KeyValue::new(EXTENSION_NAME_KEY, ext.name())];
                if let Some(payload) = ext.payload() {
                    reserved.push(KeyValue::new(EXTENSION_METADATA_KEY, payload));
                }
                metadata.extend(metadata_to_json(&reserved));
                ext.storage()
            }
            other => other,
        };

        tracing::trace!(path = scope.path(), depth = scope.depth(), data_type = %data_type, "marshal field");

        let (type_json, children) = self.data_type(data_type, &scope)?;

        let mut object = Object::new();
        object.insert(keys::NAME.to_string(), Value::String(field.name.clone()));
        object.insert(keys::NULLABLE.to_string(), Value::Bool(field.nullable));
        object.insert(keys::TYPE.to_string(), type_json);
        if !metadata.is_empty() {
            object.insert(keys::METADATA.to_string(), Value::Array(metadata));
        }
        if let Some(children) = children {
            object.insert(keys::CHILDREN.to_string(), Value::Array(children));
        }
        Ok(Value::Object(object))
    }

    /// The `type` object, plus the `children` array for composite types
    fn data_type(&self, data_type: &DataType, scope: &Scope) -> Result<(Value, Option<Vec<Value>>)> {
        let type_json = match data_type {
            DataType::Null => named(TypeTag::Null),
            DataType::Boolean => named(TypeTag::Bool),
            DataType::Int { signed, width } => json!({
                "name": TypeTag::Int.as_str(),
                "isSigned": signed,
                "bitWidth": width.bits(),
            }),
            DataType::FloatingPoint(precision) => json!({
                "name": TypeTag::FloatingPoint.as_str(),
                "precision": PrecisionTag::from(*precision).as_str(),
            }),
            DataType::Utf8 => named(TypeTag::Utf8),
            DataType::Binary => named(TypeTag::Binary),
            DataType::FixedSizeBinary(byte_width) => json!({
                "name": TypeTag::FixedSizeBinary.as_str(),
                "byteWidth": non_negative(keys::BYTE_WIDTH, *byte_width, scope)?,
            }),
            DataType::Date(unit) => json!({
                "name": TypeTag::Date.as_str(),
                "unit": UnitTag::from(*unit).as_str(),
            }),
            DataType::Time32(unit) => time(32, *unit, scope)?,
            DataType::Time64(unit) => time(64, *unit, scope)?,
            DataType::Timestamp { unit, timezone } => json!({
                "name": TypeTag::Timestamp.as_str(),
                "unit": UnitTag::from(*unit).as_str(),
                "timezone": timezone,
            }),
            DataType::Interval(unit) => json!({
                "name": TypeTag::Interval.as_str(),
                "unit": IntervalUnitTag::from(*unit).as_str(),
            }),
            DataType::Duration(unit) => json!({
                "name": TypeTag::Duration.as_str(),
                "unit": UnitTag::from(*unit).as_str(),
            }),
            DataType::Decimal { precision, scale } => json!({
                "name": TypeTag::Decimal.as_str(),
                "scale": scale,
                "precision": precision,
            }),
            DataType::List(child) => {
                let children = vec![self.field(child, scope)?];
                return Ok((named(TypeTag::List), Some(children)));
            }
            DataType::FixedSizeList(child, list_size) => {
                let list_size = non_negative(keys::LIST_SIZE, *list_size, scope)?;
                let children = vec![self.field(child, scope)?];
                let type_json = json!({
                    "name": TypeTag::FixedSizeList.as_str(),
                    "listSize": list_size,
                });
                return Ok((type_json, Some(children)));
            }
            DataType::Struct(fields) => {
                let children = fields
                    .iter()
                    .map(|child| self.field(child, scope))
                    .collect::<Result<Vec<_>>>()?;
                return Ok((named(TypeTag::Struct), Some(children)));
            }
            DataType::Map {
                key,
                item,
                keys_sorted,
            } => {
                // One element holding both named sub-objects, not two elements.
                let mut entry = Object::new();
                entry.insert(keys::MAP_KEY.to_string(), self.field(key, scope)?);
                entry.insert(keys::MAP_ITEM.to_string(), self.field(item, scope)?);
                let type_json = json!({
                    "name": TypeTag::Map.as_str(),
                    "keySorted": keys_sorted,
                });
                return Ok((type_json, Some(vec![Value::Object(entry)])));
            }
            DataType::Extension(ext) => {
                return Err(scope.unsupported(format!(
                    "extension '{}' stored as another extension",
                    ext.name()
                )));
            }
            DataType::Union { .. }
            | DataType::Dictionary { .. }
            | DataType::LargeUtf8
            | DataType::LargeBinary
            | DataType::LargeList(_) => return Err(scope.unsupported(data_type)),
        };
        Ok((type_json, None))
    }
}

fn named(tag: TypeTag) -> Value {
    json!({ "name": tag.as_str() })
}

/// Sizes the reader would refuse are refused here too.
fn non_negative(key: &str, value: i32, scope: &Scope) -> Result<i32> {
    if value < 0 {
        return Err(scope.invalid(format!("'{}' must not be negative, got {}", key, value)));
    }
    Ok(value)
}

fn time(bit_width: u8, unit: TimeUnit, scope: &Scope) -> Result<Value> {
    if unit.time_bit_width() != bit_width {
        return Err(scope.invalid(format!(
            "unit {} is not valid for {}-bit time",
            UnitTag::from(unit),
            bit_width
        )));
    }
    Ok(json!({
        "name": TypeTag::Time.as_str(),
        "isSigned": false,
        "bitWidth": bit_width,
        "unit": UnitTag::from(unit).as_str(),
    }))
}
