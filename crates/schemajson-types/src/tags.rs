//! Closed-vocabulary lookup tables for the interchange format.
//!
//! Each table maps a canonical string literal to a tag. Unknown input resolves
//! to `NotSet`, never to a real value; callers must reject it.

use std::fmt;

use crate::types::{DateUnit, IntervalUnit, Precision, TimeUnit};

macro_rules! tag_table {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $lit:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            NotSet,
        }

        impl $name {
            /// Every set value, in table order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn lookup(s: &str) -> Self {
                match s {
                    $($lit => $name::$variant,)+
                    _ => $name::NotSet,
                }
            }

            /// Wire literal; `NotSet` has none and renders empty.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $lit,)+
                    $name::NotSet => "",
                }
            }

            pub const fn is_set(self) -> bool {
                !matches!(self, $name::NotSet)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $name::NotSet => write!(f, "<not set>"),
                    other => write!(f, "{}", other.as_str()),
                }
            }
        }
    };
}

tag_table! {
    /// Value of `type.name`
    TypeTag {
        Null => "null",
        Bool => "bool",
        Int => "int",
        FloatingPoint => "floatingpoint",
        Utf8 => "utf8",
        Binary => "binary",
        FixedSizeBinary => "fixedsizebinary",
        Date => "date",
        Timestamp => "timestamp",
        Time => "time",
        Interval => "interval",
        Decimal => "decimal",
        List => "list",
        Struct => "struct",
        Map => "map",
        Duration => "duration",
        FixedSizeList => "fixedsizelist",
        Union => "union",
        Dictionary => "dictionary",
        LargeUtf8 => "largeutf8",
        LargeBinary => "largebinary",
        LargeList => "largelist",
    }
}

tag_table! {
    /// Value of `type.precision` for floating point
    PrecisionTag {
        Half => "HALF",
        Single => "SINGLE",
        Double => "DOUBLE",
    }
}

tag_table! {
    /// Value of `type.unit` for date, time, timestamp and duration
    UnitTag {
        Day => "DAY",
        Second => "SECOND",
        Millisecond => "MILLISECOND",
        Microsecond => "MICROSECOND",
        Nanosecond => "NANOSECOND",
    }
}

tag_table! {
    /// Value of `type.unit` for interval
    IntervalUnitTag {
        YearMonth => "YEAR_MONTH",
        DayTime => "DAY_TIME",
        MonthDayNano => "MONTH_DAY_NANO",
    }
}

impl From<Precision> for PrecisionTag {
    fn from(p: Precision) -> Self {
        match p {
            Precision::Half => PrecisionTag::Half,
            Precision::Single => PrecisionTag::Single,
            Precision::Double => PrecisionTag::Double,
        }
    }
}

impl PrecisionTag {
    pub const fn precision(self) -> Option<Precision> {
        match self {
            PrecisionTag::Half => Some(Precision::Half),
            PrecisionTag::Single => Some(Precision::Single),
            PrecisionTag::Double => Some(Precision::Double),
            PrecisionTag::NotSet => None,
        }
    }
}

impl From<TimeUnit> for UnitTag {
    fn from(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Second => UnitTag::Second,
            TimeUnit::Millisecond => UnitTag::Millisecond,
            TimeUnit::Microsecond => UnitTag::Microsecond,
            TimeUnit::Nanosecond => UnitTag::Nanosecond,
        }
    }
}

impl From<DateUnit> for UnitTag {
    fn from(unit: DateUnit) -> Self {
        match unit {
            DateUnit::Day => UnitTag::Day,
            DateUnit::Millisecond => UnitTag::Millisecond,
        }
    }
}

impl UnitTag {
    /// `DAY` is a date-only unit and yields `None`.
    pub const fn time_unit(self) -> Option<TimeUnit> {
        match self {
            UnitTag::Second => Some(TimeUnit::Second),
            UnitTag::Millisecond => Some(TimeUnit::Millisecond),
            UnitTag::Microsecond => Some(TimeUnit::Microsecond),
            UnitTag::Nanosecond => Some(TimeUnit::Nanosecond),
            UnitTag::Day | UnitTag::NotSet => None,
        }
    }

    pub const fn date_unit(self) -> Option<DateUnit> {
        match self {
            UnitTag::Day => Some(DateUnit::Day),
            UnitTag::Millisecond => Some(DateUnit::Millisecond),
            _ => None,
        }
    }
}

impl From<IntervalUnit> for IntervalUnitTag {
    fn from(unit: IntervalUnit) -> Self {
        match unit {
            IntervalUnit::YearMonth => IntervalUnitTag::YearMonth,
            IntervalUnit::DayTime => IntervalUnitTag::DayTime,
            IntervalUnit::MonthDayNano => IntervalUnitTag::MonthDayNano,
        }
    }
}

impl IntervalUnitTag {
    pub const fn interval_unit(self) -> Option<IntervalUnit> {
        match self {
            IntervalUnitTag::YearMonth => Some(IntervalUnit::YearMonth),
            IntervalUnitTag::DayTime => Some(IntervalUnit::DayTime),
            IntervalUnitTag::MonthDayNano => Some(IntervalUnit::MonthDayNano),
            IntervalUnitTag::NotSet => None,
        }
    }
}
