use std::path::Path;

use factload_result::Result;
use factload_types::{
    MeasureType, OutputRow, RowLayout, SegmentId, TableIdentity, TaskId, WriterUnitId,
};

use crate::config::FactWriterConfig;
use crate::lifecycle::FactWriterState;
use crate::parquet_writer::ParquetFactWriter;

/// Sink persisting the output rows of one writer unit.
///
/// Calls must follow [`FactWriterState`]: `initialise` once, `add_row` per
/// row in order, `finish`, then `close`; `abort` replaces `close` for a
/// failed unit. Implementations reject anything else with an error rather
/// than panicking.
pub trait FactWriter: Send {
    fn initialise(&mut self) -> Result<()>;

    fn add_row(&mut self, row: OutputRow) -> Result<()>;

    /// Flush buffered rows to the backing store.
    fn finish(&mut self) -> Result<()>;

    /// Release handles and buffers. Must be called even if `finish` failed.
    fn close(&mut self) -> Result<()>;

    /// Discard the unit: release handles without completing the fragment and
    /// remove whatever was already written. Used once the unit has failed, so
    /// no partial fragment is left behind for readers.
    fn abort(&mut self) -> Result<()>;

    fn state(&self) -> FactWriterState;

    /// Rows accepted by `add_row` so far.
    fn rows_written(&self) -> u64;
}

/// Segment-wide snapshot every writer of a load is built from.
///
/// Resolved once before the first batch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FactWriterContext {
    pub table: TableIdentity,
    pub task_id: TaskId,
    pub segment_id: SegmentId,
    pub layout: RowLayout,
    pub measure_types: Vec<MeasureType>,
    pub key_size_bytes: usize,
}

/// Builds a fresh fact writer for each (partition, batch) unit.
pub trait FactWriterFactory: Send {
    fn create(
        &self,
        ctx: &FactWriterContext,
        unit: WriterUnitId,
        store_location: &Path,
    ) -> Result<Box<dyn FactWriter>>;
}

/// Factory producing [`ParquetFactWriter`]s.
#[derive(Debug, Clone, Default)]
pub struct ParquetFactWriterFactory {
    config: FactWriterConfig,
}

impl ParquetFactWriterFactory {
    pub fn new(config: FactWriterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FactWriterConfig {
        &self.config
    }
}

impl FactWriterFactory for ParquetFactWriterFactory {
    fn create(
        &self,
        ctx: &FactWriterContext,
        unit: WriterUnitId,
        store_location: &Path,
    ) -> Result<Box<dyn FactWriter>> {
        Ok(Box::new(ParquetFactWriter::new(
            ctx,
            unit,
            store_location,
            self.config.clone(),
        )?))
    }
}
