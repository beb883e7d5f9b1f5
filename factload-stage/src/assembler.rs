use std::sync::Arc;

use factload_keygen::KeyPacker;
use factload_result::{Error, Result};
use factload_types::{OutputRow, OutputValue, RowLayout};

use crate::row::Row;

/// Turns one sorted row into the positional row a fact writer consumes.
///
/// Output layout: `[measures.., raw_payload?, packed_key]`. The payload slot
/// exists only when the table has no-dictionary or complex dimensions.
#[derive(Clone)]
pub struct RowLayoutAssembler {
    layout: RowLayout,
    key_packer: Arc<dyn KeyPacker>,
}

impl RowLayoutAssembler {
    pub fn new(layout: RowLayout, key_packer: Arc<dyn KeyPacker>) -> Self {
        Self { layout, key_packer }
    }

    pub fn layout(&self) -> RowLayout {
        self.layout
    }

    /// Assemble `row`. Malformed dimension indices are reported by the key
    /// packer; measures beyond the configured count are dropped.
    pub fn assemble(&self, row: Row) -> Result<OutputRow> {
        let measure_count = self.layout.measure_count();
        if row.measures.len() < measure_count {
            return Err(Error::InvalidArgumentError(format!(
                "row carries {} measures, layout expects {measure_count}",
                row.measures.len()
            )));
        }

        let mut out = OutputRow::with_capacity(self.layout.output_len());
        for value in row.measures.into_iter().take(measure_count) {
            out.push(OutputValue::Measure(value));
        }
        if self.layout.has_extra() {
            out.push(OutputValue::RawPayload(row.raw_payload));
        }
        out.push(OutputValue::Key(
            self.key_packer.pack(&row.dimension_indices)?,
        ));

        debug_assert_eq!(out.len(), self.layout.output_len());
        Ok(out)
    }
}
