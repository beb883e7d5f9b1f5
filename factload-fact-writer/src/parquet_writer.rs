use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BinaryArray, Decimal128Array, FixedSizeBinaryArray, Float64Array, Int64Array,
};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use factload_result::{Error, Result};
use factload_types::{MeasureType, MeasureValue, OutputRow, OutputValue, RowLayout, WriterUnitId};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::config::FactWriterConfig;
use crate::factory::{FactWriter, FactWriterContext};
use crate::lifecycle::FactWriterState;
use crate::schema::fragment_schema;

/// File name of the fragment written for `unit`.
///
/// Unique within a store location as long as task ids are unique per
/// concurrently running stage instance.
pub fn fragment_file_name(ctx: &FactWriterContext, unit: WriterUnitId) -> String {
    format!(
        "part-{}-{}-{}.parquet",
        ctx.task_id, unit.partition, unit.batch
    )
}

/// Fact writer persisting one batch as a Parquet file.
///
/// Rows are buffered in memory and encoded into the open row group every
/// `rows_per_flush` rows. `finish` encodes the remainder and flushes the row
/// group; `close` writes the footer and releases the file handle.
pub struct ParquetFactWriter {
    unit: WriterUnitId,
    path: PathBuf,
    schema: SchemaRef,
    layout: RowLayout,
    measure_types: Vec<MeasureType>,
    key_size_bytes: usize,
    config: FactWriterConfig,
    state: FactWriterState,
    writer: Option<ArrowWriter<BufWriter<File>>>,
    pending: Vec<OutputRow>,
    rows_written: u64,
}

impl ParquetFactWriter {
    pub fn new(
        ctx: &FactWriterContext,
        unit: WriterUnitId,
        store_location: &Path,
        config: FactWriterConfig,
    ) -> Result<Self> {
        let schema = fragment_schema(ctx, unit)?;
        Ok(Self {
            unit,
            path: store_location.join(fragment_file_name(ctx, unit)),
            schema,
            layout: ctx.layout,
            measure_types: ctx.measure_types.clone(),
            key_size_bytes: ctx.key_size_bytes,
            config,
            state: FactWriterState::Created,
            writer: None,
            pending: Vec::new(),
            rows_written: 0,
        })
    }

    /// Location of the fragment file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    fn ensure_transition(&self, to: FactWriterState) -> Result<()> {
        let mut next = self.state;
        next.transition(to, self.unit)
    }

    fn validate_row(&self, row: &OutputRow) -> Result<()> {
        self.layout.check(row)?;
        for (idx, ty) in self.measure_types.iter().enumerate() {
            if let Some(OutputValue::Measure(value)) = row.get(idx)
                && !ty.accepts(value)
            {
                return Err(Error::InvalidArgumentError(format!(
                    "measure {idx} expects {ty:?}, got {value:?}"
                )));
            }
        }
        match row.key() {
            Some(key) if key.len() == self.key_size_bytes => Ok(()),
            Some(key) => Err(Error::InvalidArgumentError(format!(
                "packed key has {} bytes, fragment expects {}",
                key.len(),
                self.key_size_bytes
            ))),
            None => Err(Error::InvalidArgumentError(
                "output row does not end with a packed key".into(),
            )),
        }
    }

    /// Encode buffered rows into the open row group.
    fn encode_pending(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let rows = std::mem::take(&mut self.pending);
        let batch = self.build_batch(&rows)?;
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Internal(format!("no open fragment for {}", self.unit)))?;
        writer.write(&batch)?;
        tracing::trace!(
            "[FACT_WRITER] {} encoded {} rows into {}",
            self.unit,
            rows.len(),
            self.path.display()
        );
        Ok(())
    }

    fn build_batch(&self, rows: &[OutputRow]) -> Result<RecordBatch> {
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(self.layout.output_len());
        for (idx, ty) in self.measure_types.iter().enumerate() {
            columns.push(measure_array(*ty, rows, idx)?);
        }
        if let Some(idx) = self.layout.payload_index() {
            let payloads: BinaryArray = rows
                .iter()
                .map(|r| match r.get(idx) {
                    Some(OutputValue::RawPayload(Some(bytes))) => Some(bytes.as_slice()),
                    _ => None,
                })
                .collect();
            columns.push(Arc::new(payloads));
        }
        let keys = rows
            .iter()
            .map(|r| r.key().map(|k| k.as_bytes()).unwrap_or_default());
        if self.key_size_bytes == 0 {
            let keys: BinaryArray = keys.map(Some).collect();
            columns.push(Arc::new(keys));
        } else {
            columns.push(Arc::new(FixedSizeBinaryArray::try_from_iter(keys)?));
        }
        Ok(RecordBatch::try_new(Arc::clone(&self.schema), columns)?)
    }
}

fn measure_at(row: &OutputRow, idx: usize) -> &MeasureValue {
    match row.get(idx) {
        Some(OutputValue::Measure(value)) => value,
        _ => &MeasureValue::Null,
    }
}

fn measure_array(ty: MeasureType, rows: &[OutputRow], idx: usize) -> Result<ArrayRef> {
    let values = rows.iter().map(|r| measure_at(r, idx));
    let array: ArrayRef = match ty {
        MeasureType::Int64 => Arc::new(
            values
                .map(|v| match v {
                    MeasureValue::Int64(x) => Some(*x),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        MeasureType::Float64 => Arc::new(
            values
                .map(|v| match v {
                    MeasureValue::Float64(x) => Some(*x),
                    _ => None,
                })
                .collect::<Float64Array>(),
        ),
        MeasureType::Decimal { precision, scale } => Arc::new(
            values
                .map(|v| match v {
                    MeasureValue::Decimal(x) => Some(*x),
                    _ => None,
                })
                .collect::<Decimal128Array>()
                .with_precision_and_scale(precision, scale)?,
        ),
        MeasureType::Bytes => Arc::new(
            values
                .map(|v| match v {
                    MeasureValue::Bytes(b) => Some(b.as_slice()),
                    _ => None,
                })
                .collect::<BinaryArray>(),
        ),
    };
    Ok(array)
}

impl FactWriter for ParquetFactWriter {
    fn initialise(&mut self) -> Result<()> {
        self.ensure_transition(FactWriterState::Initialised)?;

        let file = File::create(&self.path).map_err(|e| {
            Error::FactWriter(format!(
                "failed to create fragment '{}': {e}",
                self.path.display()
            ))
        })?;
        let props = WriterProperties::builder()
            .set_compression(self.config.compression.to_parquet())
            .set_max_row_group_size(self.config.max_row_group_size)
            .set_created_by(format!("factload version {}", env!("CARGO_PKG_VERSION")))
            .build();
        let writer =
            ArrowWriter::try_new(BufWriter::new(file), Arc::clone(&self.schema), Some(props))?;

        self.writer = Some(writer);
        self.state = FactWriterState::Initialised;
        tracing::debug!(
            "[FACT_WRITER] {} initialised at {}",
            self.unit,
            self.path.display()
        );
        Ok(())
    }

    fn add_row(&mut self, row: OutputRow) -> Result<()> {
        self.ensure_transition(FactWriterState::Writing)?;
        self.validate_row(&row)?;

        self.pending.push(row);
        self.rows_written += 1;
        self.state = FactWriterState::Writing;

        if self.pending.len() >= self.config.rows_per_flush {
            self.encode_pending()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.ensure_transition(FactWriterState::Finished)?;
        self.encode_pending()?;
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        self.state = FactWriterState::Finished;
        tracing::debug!(
            "[FACT_WRITER] {} finished with {} rows",
            self.unit,
            self.rows_written
        );
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_transition(FactWriterState::Closed)?;
        // The handle is released below whether or not the footer write succeeds.
        self.state = FactWriterState::Closed;

        if !self.pending.is_empty() {
            tracing::warn!(
                "[FACT_WRITER] {} closed with {} unflushed rows; they are discarded",
                self.unit,
                self.pending.len()
            );
            self.pending.clear();
        }

        if let Some(writer) = self.writer.take() {
            let mut inner = writer.into_inner()?;
            inner.flush()?;
            inner.get_ref().sync_all()?;
        }
        tracing::debug!("[FACT_WRITER] {} closed", self.unit);
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        self.ensure_transition(FactWriterState::Closed)?;
        self.state = FactWriterState::Closed;
        self.pending.clear();

        // Dropping the writer closes the file without a footer.
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        drop(writer);
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::FactWriter(format!(
                    "failed to remove partial fragment '{}': {e}",
                    self.path.display()
                )));
            }
        }
        tracing::debug!(
            "[FACT_WRITER] {} aborted; removed {}",
            self.unit,
            self.path.display()
        );
        Ok(())
    }

    fn state(&self) -> FactWriterState {
        self.state
    }

    fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl Drop for ParquetFactWriter {
    fn drop(&mut self) {
        if self.writer.is_some() {
            tracing::warn!(
                "[FACT_WRITER] {} dropped in state {:?} without close; fragment {} is incomplete",
                self.unit,
                self.state,
                self.path.display()
            );
        }
    }
}
