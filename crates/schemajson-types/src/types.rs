//! Type system for schemajson fields

use std::fmt;

use crate::error::TypeError;
use crate::Field;

/// Bit width of an integer type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub const fn bits(self) -> u8 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    /// Resolve a raw bit count; only 8, 16, 32 and 64 are valid.
    pub fn from_bits(bits: i64) -> Result<Self, TypeError> {
        match bits {
            8 => Ok(IntWidth::W8),
            16 => Ok(IntWidth::W16),
            32 => Ok(IntWidth::W32),
            64 => Ok(IntWidth::W64),
            other => Err(TypeError::IntBitWidth(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Half,
    Single,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateUnit {
    Day,
    Millisecond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl TimeUnit {
    /// Bit width of the time-of-day type that carries this unit
    pub const fn time_bit_width(self) -> u8 {
        match self {
            TimeUnit::Second | TimeUnit::Millisecond => 32,
            TimeUnit::Microsecond | TimeUnit::Nanosecond => 64,
        }
    }

    pub const fn abbreviation(self) -> &'static str {
        match self {
            TimeUnit::Second => "s",
            TimeUnit::Millisecond => "ms",
            TimeUnit::Microsecond => "us",
            TimeUnit::Nanosecond => "ns",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    YearMonth,
    DayTime,
    MonthDayNano,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnionMode {
    Sparse,
    Dense,
}

/// A named extension type layered over a storage type.
///
/// An empty payload is stored as `None`, so "no payload" has a single
/// representation and survives a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionType {
    name: String,
    payload: Option<String>,
    storage: Box<DataType>,
}

impl ExtensionType {
    pub fn new(name: impl Into<String>, payload: Option<String>, storage: DataType) -> Self {
        Self {
            name: name.into(),
            payload: payload.filter(|p| !p.is_empty()),
            storage: Box::new(storage),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn storage(&self) -> &DataType {
        &self.storage
    }
}

/// Logical type of a field.
///
/// `Union`, `Dictionary` and the `Large*` variants can be described but have
/// no interchange encoding; converters reject them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Null,
    Boolean,
    Int { signed: bool, width: IntWidth },
    FloatingPoint(Precision),
    Utf8,
    Binary,
    FixedSizeBinary(i32),
    Date(DateUnit),
    Time32(TimeUnit),
    Time64(TimeUnit),
    Timestamp { unit: TimeUnit, timezone: String },
    Interval(IntervalUnit),
    Duration(TimeUnit),
    Decimal { precision: u8, scale: i8 },
    List(Box<Field>),
    FixedSizeList(Box<Field>, i32),
    Struct(Vec<Field>),
    Map {
        key: Box<Field>,
        item: Box<Field>,
        keys_sorted: bool,
    },
    Extension(ExtensionType),

    // Describable, not encodable
    Union { fields: Vec<Field>, mode: UnionMode },
    Dictionary {
        key: Box<DataType>,
        value: Box<DataType>,
    },
    LargeUtf8,
    LargeBinary,
    LargeList(Box<Field>),
}

impl DataType {
    pub const fn int(signed: bool, width: IntWidth) -> Self {
        DataType::Int { signed, width }
    }

    pub const fn int8() -> Self {
        Self::int(true, IntWidth::W8)
    }

    pub const fn int16() -> Self {
        Self::int(true, IntWidth::W16)
    }

    pub const fn int32() -> Self {
        Self::int(true, IntWidth::W32)
    }

    pub const fn int64() -> Self {
        Self::int(true, IntWidth::W64)
    }

    pub const fn uint8() -> Self {
        Self::int(false, IntWidth::W8)
    }

    pub const fn uint16() -> Self {
        Self::int(false, IntWidth::W16)
    }

    pub const fn uint32() -> Self {
        Self::int(false, IntWidth::W32)
    }

    pub const fn uint64() -> Self {
        Self::int(false, IntWidth::W64)
    }

    pub const fn float16() -> Self {
        DataType::FloatingPoint(Precision::Half)
    }

    pub const fn float32() -> Self {
        DataType::FloatingPoint(Precision::Single)
    }

    pub const fn float64() -> Self {
        DataType::FloatingPoint(Precision::Double)
    }

    /// Time-of-day with 32-bit storage; only seconds and milliseconds fit.
    pub fn time32(unit: TimeUnit) -> Result<Self, TypeError> {
        match unit.time_bit_width() {
            32 => Ok(DataType::Time32(unit)),
            _ => Err(TypeError::TimeUnit { bit_width: 32, unit }),
        }
    }

    /// Time-of-day with 64-bit storage; only microseconds and nanoseconds fit.
    pub fn time64(unit: TimeUnit) -> Result<Self, TypeError> {
        match unit.time_bit_width() {
            64 => Ok(DataType::Time64(unit)),
            _ => Err(TypeError::TimeUnit { bit_width: 64, unit }),
        }
    }

    pub fn timestamp(unit: TimeUnit, timezone: impl Into<String>) -> Self {
        DataType::Timestamp {
            unit,
            timezone: timezone.into(),
        }
    }

    pub fn list(child: Field) -> Self {
        DataType::List(Box::new(child))
    }

    pub fn fixed_size_list(child: Field, size: i32) -> Self {
        DataType::FixedSizeList(Box::new(child), size)
    }

    pub fn struct_(children: Vec<Field>) -> Self {
        DataType::Struct(children)
    }

    pub fn map(key: Field, item: Field, keys_sorted: bool) -> Self {
        DataType::Map {
            key: Box::new(key),
            item: Box::new(item),
            keys_sorted,
        }
    }

    pub fn extension(name: impl Into<String>, payload: Option<String>, storage: DataType) -> Self {
        DataType::Extension(ExtensionType::new(name, payload, storage))
    }

    /// Direct child fields, in declaration order. Map yields key then item.
    pub fn children(&self) -> Vec<&Field> {
        match self {
            DataType::List(child) | DataType::FixedSizeList(child, _) | DataType::LargeList(child) => {
                vec![child.as_ref()]
            }
            DataType::Struct(children) | DataType::Union { fields: children, .. } => children.iter().collect(),
            DataType::Map { key, item, .. } => vec![key.as_ref(), item.as_ref()],
            DataType::Extension(ext) => ext.storage().children(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Null => write!(f, "Null"),
            DataType::Boolean => write!(f, "Boolean"),
            DataType::Int { signed, width } => {
                let prefix = if *signed { "Int" } else { "UInt" };
                write!(f, "{}{}", prefix, width.bits())
            }
            DataType::FloatingPoint(p) => match p {
                Precision::Half => write!(f, "Float16"),
                Precision::Single => write!(f, "Float32"),
                Precision::Double => write!(f, "Float64"),
            },
            DataType::Utf8 => write!(f, "Utf8"),
            DataType::Binary => write!(f, "Binary"),
            DataType::FixedSizeBinary(width) => write!(f, "FixedSizeBinary({})", width),
            DataType::Date(DateUnit::Day) => write!(f, "Date32"),
            DataType::Date(DateUnit::Millisecond) => write!(f, "Date64"),
            DataType::Time32(unit) => write!(f, "Time32({})", unit.abbreviation()),
            DataType::Time64(unit) => write!(f, "Time64({})", unit.abbreviation()),
            DataType::Timestamp { unit, timezone } if timezone.is_empty() => {
                write!(f, "Timestamp({})", unit.abbreviation())
            }
            DataType::Timestamp { unit, timezone } => {
                write!(f, "Timestamp({}, {:?})", unit.abbreviation(), timezone)
            }
            DataType::Interval(unit) => match unit {
                IntervalUnit::YearMonth => write!(f, "Interval(YearMonth)"),
                IntervalUnit::DayTime => write!(f, "Interval(DayTime)"),
                IntervalUnit::MonthDayNano => write!(f, "Interval(MonthDayNano)"),
            },
            DataType::Duration(unit) => write!(f, "Duration({})", unit.abbreviation()),
            DataType::Decimal { precision, scale } => write!(f, "Decimal({}, {})", precision, scale),
            DataType::List(child) => write!(f, "List<{}>", child.data_type),
            DataType::FixedSizeList(child, size) => {
                write!(f, "FixedSizeList<{}; {}>", child.data_type, size)
            }
            DataType::Struct(children) => {
                write!(f, "Struct<")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", child.name, child.data_type)?;
                }
                write!(f, ">")
            }
            DataType::Map {
                key,
                item,
                keys_sorted,
            } => {
                write!(f, "Map<{}, {}>", key.data_type, item.data_type)?;
                if *keys_sorted {
                    write!(f, " (sorted)")?;
                }
                Ok(())
            }
            DataType::Extension(ext) => write!(f, "Extension({}) over {}", ext.name(), ext.storage()),
            DataType::Union { fields, mode } => {
                let mode = match mode {
                    UnionMode::Sparse => "Sparse",
                    UnionMode::Dense => "Dense",
                };
                write!(f, "{}Union[{} variants]", mode, fields.len())
            }
            DataType::Dictionary { key, value } => write!(f, "Dictionary<{}, {}>", key, value),
            DataType::LargeUtf8 => write!(f, "LargeUtf8"),
            DataType::LargeBinary => write!(f, "LargeBinary"),
            DataType::LargeList(child) => write!(f, "LargeList<{}>", child.data_type),
        }
    }
}
