//! Measure values carried by sorted rows and their declared column types.

use arrow::datatypes::DataType;
use serde::{Deserialize, Serialize};

/// Declared type of a measure column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeasureType {
    Int64,
    Float64,
    /// Fixed-point decimal stored as a scaled `i128`.
    Decimal { precision: u8, scale: i8 },
    Bytes,
}

impl MeasureType {
    /// Arrow type used for the measure's column in a columnar fragment.
    pub fn arrow_type(&self) -> DataType {
        match *self {
            MeasureType::Int64 => DataType::Int64,
            MeasureType::Float64 => DataType::Float64,
            MeasureType::Decimal { precision, scale } => DataType::Decimal128(precision, scale),
            MeasureType::Bytes => DataType::Binary,
        }
    }

    /// Whether `value` may be stored in a column of this type. Null fits any
    /// measure column; a decimal must have at most `precision` digits.
    pub fn accepts(&self, value: &MeasureValue) -> bool {
        match (self, value) {
            (_, MeasureValue::Null)
            | (MeasureType::Int64, MeasureValue::Int64(_))
            | (MeasureType::Float64, MeasureValue::Float64(_))
            | (MeasureType::Bytes, MeasureValue::Bytes(_)) => true,
            (MeasureType::Decimal { precision, .. }, MeasureValue::Decimal(v)) => {
                decimal_fits(*v, *precision)
            }
            _ => false,
        }
    }
}

/// `|v| < 10^precision`. Precisions beyond what an `i128` holds never fit.
fn decimal_fits(v: i128, precision: u8) -> bool {
    10i128
        .checked_pow(u32::from(precision))
        .is_some_and(|limit| v.unsigned_abs() < limit.unsigned_abs())
}

/// A single measure value of a sorted row.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureValue {
    Null,
    Int64(i64),
    Float64(f64),
    /// Scaled decimal; the scale comes from the column's [`MeasureType`].
    Decimal(i128),
    Bytes(Vec<u8>),
}

impl MeasureValue {
    pub fn is_null(&self) -> bool {
        matches!(self, MeasureValue::Null)
    }
}

macro_rules! impl_from_for_measure {
    ($variant:ident, $($t:ty),*) => {
        $(
            impl From<$t> for MeasureValue {
                fn from(v: $t) -> Self {
                    MeasureValue::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_measure!(Int64, i8, i16, i32, i64, u8, u16, u32);
impl_from_for_measure!(Float64, f32, f64);
impl_from_for_measure!(Bytes, Vec<u8>);

impl<T: Into<MeasureValue>> From<Option<T>> for MeasureValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(MeasureValue::Null)
    }
}
