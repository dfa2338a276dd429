use thiserror::Error;

use crate::types::TimeUnit;

/// Rejected attempt to build a type with out-of-domain parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("integer bit width must be 8, 16, 32 or 64, got {0}")]
    IntBitWidth(i64),

    #[error("time bit width must be 32 or 64, got {0}")]
    TimeBitWidth(i64),

    #[error("unit {unit:?} is not valid for {bit_width}-bit time")]
    TimeUnit { bit_width: u8, unit: TimeUnit },
}
