//! Flat positional rows consumed by fact writers.
//!
//! The layout of an [`OutputRow`] is fixed by the table schema:
//!
//! ```text
//! | measure_0 .. measure_{n-1} | raw_payload (optional) | packed_key |
//! ```
//!
//! The payload slot only exists when the table has no-dictionary or complex
//! dimensions. Fact writers address values by position, never by name.

use crate::key::PackedKey;
use crate::measure::MeasureValue;
use factload_result::{Error, Result};

/// One slot of an output row.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    Measure(MeasureValue),
    /// Serialized no-dictionary and complex dimension bytes.
    RawPayload(Option<Vec<u8>>),
    Key(PackedKey),
}

/// Segment-wide shape of every output row of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    measure_count: usize,
    has_extra: bool,
}

impl RowLayout {
    pub fn new(
        measure_count: usize,
        no_dictionary_count: usize,
        complex_dimension_count: usize,
    ) -> Self {
        Self {
            measure_count,
            has_extra: no_dictionary_count > 0 || complex_dimension_count > 0,
        }
    }

    #[inline]
    pub fn measure_count(&self) -> usize {
        self.measure_count
    }

    /// Whether rows carry a raw payload slot.
    #[inline]
    pub fn has_extra(&self) -> bool {
        self.has_extra
    }

    /// Number of slots in every output row.
    #[inline]
    pub fn output_len(&self) -> usize {
        if self.has_extra {
            self.measure_count + 2
        } else {
            self.measure_count + 1
        }
    }

    #[inline]
    pub fn payload_index(&self) -> Option<usize> {
        self.has_extra.then_some(self.measure_count)
    }

    #[inline]
    pub fn key_index(&self) -> usize {
        self.output_len() - 1
    }

    /// Check that `row` has this layout's arity and slot kinds.
    pub fn check(&self, row: &OutputRow) -> Result<()> {
        if row.len() != self.output_len() {
            return Err(Error::InvalidArgumentError(format!(
                "output row has {} values, layout expects {}",
                row.len(),
                self.output_len()
            )));
        }
        for (idx, value) in row.values().iter().enumerate() {
            let ok = match value {
                OutputValue::Measure(_) => idx < self.measure_count,
                OutputValue::RawPayload(_) => Some(idx) == self.payload_index(),
                OutputValue::Key(_) => idx == self.key_index(),
            };
            if !ok {
                return Err(Error::InvalidArgumentError(format!(
                    "unexpected {value:?} at output row position {idx}"
                )));
            }
        }
        Ok(())
    }
}

/// Flat output row handed to a fact writer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputRow(Vec<OutputValue>);

impl OutputRow {
    pub fn with_capacity(len: usize) -> Self {
        Self(Vec::with_capacity(len))
    }

    pub fn push(&mut self, value: OutputValue) {
        self.0.push(value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&OutputValue> {
        self.0.get(idx)
    }

    pub fn values(&self) -> &[OutputValue] {
        &self.0
    }

    pub fn into_values(self) -> Vec<OutputValue> {
        self.0
    }

    /// The packed key in the last slot, if the row ends with one.
    pub fn key(&self) -> Option<&PackedKey> {
        match self.0.last() {
            Some(OutputValue::Key(k)) => Some(k),
            _ => None,
        }
    }
}

impl From<Vec<OutputValue>> for OutputRow {
    fn from(values: Vec<OutputValue>) -> Self {
        Self(values)
    }
}
