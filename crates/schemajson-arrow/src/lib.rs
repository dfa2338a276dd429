//! Bridge between the schemajson data model and `arrow::datatypes`
//!
//! Arrow keeps metadata in a hash map, so the bridge is lossy in one place:
//! entries come in sorted by key, and duplicate keys collapse (last wins) on
//! the way out. Extension types are carried by the usual
//! `ARROW:extension:*` field metadata in both models.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{
    DataType as ArrowType, Field as ArrowField, Fields, IntervalUnit as ArrowIntervalUnit,
    Schema as ArrowSchema, TimeUnit as ArrowTimeUnit, UnionFields, UnionMode as ArrowUnionMode,
};
use schemajson_types::{
    DataType, DateUnit, ExtensionType, Field, IntervalUnit, Metadata, Precision, Schema, TimeUnit, TypeError,
    UnionMode, EXTENSION_METADATA_KEY, EXTENSION_NAME_KEY,
};
use thiserror::Error;

/// Largest precision a 128-bit decimal holds
const DECIMAL128_MAX_PRECISION: u8 = 38;

/// Name Arrow gives the struct field inside a map
const MAP_ENTRIES: &str = "entries";

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("No counterpart for {0}")]
    Unrepresentable(String),

    #[error("Map entries must be a struct of key and value, found {0}")]
    MapEntries(String),

    #[error("Union has {0} members, more than an i8 type id can address")]
    UnionTooWide(usize),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("Field '{name}': {source}")]
    Field {
        name: String,
        #[source]
        source: Box<BridgeError>,
    },
}

pub type Result<T> = std::result::Result<T, BridgeError>;

fn in_field(name: &str) -> impl FnOnce(BridgeError) -> BridgeError + '_ {
    move |source| match source {
        // Keep the innermost name, it is the one that failed.
        nested @ BridgeError::Field { .. } => nested,
        source => BridgeError::Field {
            name: name.to_string(),
            source: Box::new(source),
        },
    }
}

// ---------------------------------------------------------------------------
// Arrow → model
// ---------------------------------------------------------------------------

pub fn from_arrow_schema(schema: &ArrowSchema) -> Result<Schema> {
    let fields = schema
        .fields()
        .iter()
        .map(|field| from_arrow_field(field))
        .collect::<Result<Vec<_>>>()?;
    let metadata = sorted_metadata(schema.metadata());
    tracing::debug!(fields = fields.len(), "arrow schema imported");
    Ok(Schema { fields, metadata })
}

pub fn from_arrow_field(field: &ArrowField) -> Result<Field> {
    let storage = from_arrow_type(field.data_type()).map_err(in_field(field.name()))?;

    let mut metadata = sorted_metadata(field.metadata());
    let data_type = match metadata.position(EXTENSION_NAME_KEY) {
        Some(name_index) => {
            let payload_index = metadata.position(EXTENSION_METADATA_KEY);
            let payload = payload_index
                .and_then(|i| metadata.entry(i))
                .map(|kv| kv.value.clone());
            // Sorted order puts the metadata key before the name key.
            let name = metadata.remove(name_index).map(|kv| kv.value).unwrap_or_default();
            if let Some(i) = payload_index {
                metadata.remove(i);
            }
            DataType::Extension(ExtensionType::new(name, payload, storage))
        }
        None => storage,
    };

    Ok(Field {
        name: field.name().clone(),
        data_type,
        nullable: field.is_nullable(),
        metadata,
    })
}

pub fn from_arrow_type(data_type: &ArrowType) -> Result<DataType> {
    let converted = match data_type {
        ArrowType::Null => DataType::Null,
        ArrowType::Boolean => DataType::Boolean,
        ArrowType::Int8 => DataType::int8(),
        ArrowType::Int16 => DataType::int16(),
        ArrowType::Int32 => DataType::int32(),
        ArrowType::Int64 => DataType::int64(),
        ArrowType::UInt8 => DataType::uint8(),
        ArrowType::UInt16 => DataType::uint16(),
        ArrowType::UInt32 => DataType::uint32(),
        ArrowType::UInt64 => DataType::uint64(),
        ArrowType::Float16 => DataType::float16(),
        ArrowType::Float32 => DataType::float32(),
        ArrowType::Float64 => DataType::float64(),
        ArrowType::Utf8 => DataType::Utf8,
        ArrowType::Binary => DataType::Binary,
        ArrowType::FixedSizeBinary(width) => DataType::FixedSizeBinary(*width),
        ArrowType::Date32 => DataType::Date(DateUnit::Day),
        ArrowType::Date64 => DataType::Date(DateUnit::Millisecond),
        ArrowType::Time32(unit) => DataType::time32(time_unit(unit))?,
        ArrowType::Time64(unit) => DataType::time64(time_unit(unit))?,
        ArrowType::Timestamp(unit, tz) => DataType::timestamp(time_unit(unit), tz.as_deref().unwrap_or("")),
        ArrowType::Duration(unit) => DataType::Duration(time_unit(unit)),
        ArrowType::Interval(unit) => DataType::Interval(match unit {
            ArrowIntervalUnit::YearMonth => IntervalUnit::YearMonth,
            ArrowIntervalUnit::DayTime => IntervalUnit::DayTime,
            ArrowIntervalUnit::MonthDayNano => IntervalUnit::MonthDayNano,
        }),
        ArrowType::Decimal128(precision, scale) | ArrowType::Decimal256(precision, scale) => DataType::Decimal {
            precision: *precision,
            scale: *scale,
        },
        ArrowType::List(child) => DataType::list(from_arrow_field(child)?),
        ArrowType::FixedSizeList(child, size) => DataType::fixed_size_list(from_arrow_field(child)?, *size),
        ArrowType::Struct(fields) => DataType::struct_(
            fields
                .iter()
                .map(|field| from_arrow_field(field))
                .collect::<Result<Vec<_>>>()?,
        ),
        ArrowType::Map(entries, keys_sorted) => {
            let (key, item) = match entries.data_type() {
                ArrowType::Struct(kv) if kv.len() == 2 => (from_arrow_field(&kv[0])?, from_arrow_field(&kv[1])?),
                other => return Err(BridgeError::MapEntries(other.to_string())),
            };
            DataType::map(key, item, *keys_sorted)
        }
        ArrowType::Union(fields, mode) => DataType::Union {
            fields: fields
                .iter()
                .map(|(_, field)| from_arrow_field(field))
                .collect::<Result<Vec<_>>>()?,
            mode: match mode {
                ArrowUnionMode::Sparse => UnionMode::Sparse,
                ArrowUnionMode::Dense => UnionMode::Dense,
            },
        },
        ArrowType::Dictionary(key, value) => DataType::Dictionary {
            key: Box::new(from_arrow_type(key)?),
            value: Box::new(from_arrow_type(value)?),
        },
        ArrowType::LargeUtf8 => DataType::LargeUtf8,
        ArrowType::LargeBinary => DataType::LargeBinary,
        ArrowType::LargeList(child) => DataType::LargeList(Box::new(from_arrow_field(child)?)),
        other => return Err(BridgeError::Unrepresentable(other.to_string())),
    };
    Ok(converted)
}

fn time_unit(unit: &ArrowTimeUnit) -> TimeUnit {
    match unit {
        ArrowTimeUnit::Second => TimeUnit::Second,
        ArrowTimeUnit::Millisecond => TimeUnit::Millisecond,
        ArrowTimeUnit::Microsecond => TimeUnit::Microsecond,
        ArrowTimeUnit::Nanosecond => TimeUnit::Nanosecond,
    }
}

fn sorted_metadata(map: &HashMap<String, String>) -> Metadata {
    let mut entries: Vec<(&String, &String)> = map.iter().collect();
    entries.sort();
    entries.into_iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

// ---------------------------------------------------------------------------
// Model → Arrow
// ---------------------------------------------------------------------------

pub fn to_arrow_schema(schema: &Schema) -> Result<ArrowSchema> {
    let fields = schema
        .fields
        .iter()
        .map(to_arrow_field)
        .collect::<Result<Vec<_>>>()?;
    Ok(ArrowSchema::new(fields).with_metadata(collapse_metadata(&schema.metadata)))
}

pub fn to_arrow_field(field: &Field) -> Result<ArrowField> {
    let mut metadata = collapse_metadata(&field.metadata);
    let storage = match &field.data_type {
        DataType::Extension(ext) => {
            metadata.insert(EXTENSION_NAME_KEY.to_string(), ext.name().to_string());
            if let Some(payload) = ext.payload() {
                metadata.insert(EXTENSION_METADATA_KEY.to_string(), payload.to_string());
            }
            if let DataType::Extension(inner) = ext.storage() {
                return Err(in_field(&field.name)(BridgeError::Unrepresentable(format!(
                    "extension '{}' stored as extension '{}'",
                    ext.name(),
                    inner.name()
                ))));
            }
            ext.storage()
        }
        other => other,
    };
    let data_type = to_arrow_type(storage).map_err(in_field(&field.name))?;
    Ok(ArrowField::new(field.name.clone(), data_type, field.nullable).with_metadata(metadata))
}

/// Arrow type for `data_type`. An extension yields its storage type; only
/// [`to_arrow_field`] can carry the extension itself.
pub fn to_arrow_type(data_type: &DataType) -> Result<ArrowType> {
    use schemajson_types::IntWidth::*;

    let converted = match data_type {
        DataType::Null => ArrowType::Null,
        DataType::Boolean => ArrowType::Boolean,
        DataType::Int { signed: true, width } => match width {
            W8 => ArrowType::Int8,
            W16 => ArrowType::Int16,
            W32 => ArrowType::Int32,
            W64 => ArrowType::Int64,
        },
        DataType::Int { signed: false, width } => match width {
            W8 => ArrowType::UInt8,
            W16 => ArrowType::UInt16,
            W32 => ArrowType::UInt32,
            W64 => ArrowType::UInt64,
        },
        DataType::FloatingPoint(Precision::Half) => ArrowType::Float16,
        DataType::FloatingPoint(Precision::Single) => ArrowType::Float32,
        DataType::FloatingPoint(Precision::Double) => ArrowType::Float64,
        DataType::Utf8 => ArrowType::Utf8,
        DataType::Binary => ArrowType::Binary,
        DataType::FixedSizeBinary(width) => ArrowType::FixedSizeBinary(*width),
        DataType::Date(DateUnit::Day) => ArrowType::Date32,
        DataType::Date(DateUnit::Millisecond) => ArrowType::Date64,
        DataType::Time32(unit) => ArrowType::Time32(arrow_time_unit(*unit)),
        DataType::Time64(unit) => ArrowType::Time64(arrow_time_unit(*unit)),
        DataType::Timestamp { unit, timezone } => {
            let tz = (!timezone.is_empty()).then(|| Arc::from(timezone.as_str()));
            ArrowType::Timestamp(arrow_time_unit(*unit), tz)
        }
        DataType::Interval(unit) => ArrowType::Interval(match unit {
            IntervalUnit::YearMonth => ArrowIntervalUnit::YearMonth,
            IntervalUnit::DayTime => ArrowIntervalUnit::DayTime,
            IntervalUnit::MonthDayNano => ArrowIntervalUnit::MonthDayNano,
        }),
        DataType::Duration(unit) => ArrowType::Duration(arrow_time_unit(*unit)),
        DataType::Decimal { precision, scale } if *precision > DECIMAL128_MAX_PRECISION => {
            ArrowType::Decimal256(*precision, *scale)
        }
        DataType::Decimal { precision, scale } => ArrowType::Decimal128(*precision, *scale),
        DataType::List(child) => ArrowType::List(Arc::new(to_arrow_field(child)?)),
        DataType::FixedSizeList(child, size) => ArrowType::FixedSizeList(Arc::new(to_arrow_field(child)?), *size),
        DataType::Struct(fields) => ArrowType::Struct(to_arrow_fields(fields)?),
        DataType::Map {
            key,
            item,
            keys_sorted,
        } => {
            let entries = Fields::from(vec![to_arrow_field(key)?, to_arrow_field(item)?]);
            let entries = ArrowField::new(MAP_ENTRIES, ArrowType::Struct(entries), false);
            ArrowType::Map(Arc::new(entries), *keys_sorted)
        }
        DataType::Extension(ext) => to_arrow_type(ext.storage())?,
        DataType::Union { fields, mode } => {
            if fields.len() > i8::MAX as usize + 1 {
                return Err(BridgeError::UnionTooWide(fields.len()));
            }
            let members = fields.iter().map(to_arrow_field).collect::<Result<Vec<_>>>()?;
            let mode = match mode {
                UnionMode::Sparse => ArrowUnionMode::Sparse,
                UnionMode::Dense => ArrowUnionMode::Dense,
            };
            ArrowType::Union(UnionFields::new(0..=i8::MAX, members), mode)
        }
        DataType::Dictionary { key, value } => {
            ArrowType::Dictionary(Box::new(to_arrow_type(key)?), Box::new(to_arrow_type(value)?))
        }
        DataType::LargeUtf8 => ArrowType::LargeUtf8,
        DataType::LargeBinary => ArrowType::LargeBinary,
        DataType::LargeList(child) => ArrowType::LargeList(Arc::new(to_arrow_field(child)?)),
    };
    Ok(converted)
}

fn to_arrow_fields(fields: &[Field]) -> Result<Fields> {
    Ok(Fields::from(fields.iter().map(to_arrow_field).collect::<Result<Vec<_>>>()?))
}

fn arrow_time_unit(unit: TimeUnit) -> ArrowTimeUnit {
    match unit {
        TimeUnit::Second => ArrowTimeUnit::Second,
        TimeUnit::Millisecond => ArrowTimeUnit::Millisecond,
        TimeUnit::Microsecond => ArrowTimeUnit::Microsecond,
        TimeUnit::Nanosecond => ArrowTimeUnit::Nanosecond,
    }
}

fn collapse_metadata(metadata: &Metadata) -> HashMap<String, String> {
    let mut map = HashMap::with_capacity(metadata.len());
    for kv in metadata {
        if let Some(previous) = map.insert(kv.key.clone(), kv.value.clone()) {
            tracing::debug!(key = %kv.key, dropped = %previous, "duplicate metadata key collapsed");
        }
    }
    map
}
