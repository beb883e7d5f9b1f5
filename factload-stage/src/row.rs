//! Sorted input rows and the single-pass sequences that carry them.

use factload_result::Result;
use factload_types::MeasureValue;

/// One sorted, dictionary-encoded row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub measures: Vec<MeasureValue>,
    /// Serialized no-dictionary and complex dimensions; only present for
    /// tables that have them.
    pub raw_payload: Option<Vec<u8>>,
    /// One surrogate per dictionary dimension, in schema order.
    pub dimension_indices: Vec<u32>,
}

impl Row {
    pub fn new(measures: Vec<MeasureValue>, dimension_indices: Vec<u32>) -> Self {
        Self {
            measures,
            raw_payload: None,
            dimension_indices,
        }
    }

    pub fn with_raw_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.raw_payload = Some(payload.into());
        self
    }
}

/// Finite, single-pass sequence of rows produced by the sort step.
///
/// Pulling a row may block on upstream I/O and may fail; a batch is never
/// restarted.
pub struct RowBatch {
    rows: Box<dyn Iterator<Item = Result<Row>> + Send>,
}

impl std::fmt::Debug for RowBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowBatch").finish_non_exhaustive()
    }
}

impl RowBatch {
    pub fn new<I>(rows: I) -> Self
    where
        I: Iterator<Item = Result<Row>> + Send + 'static,
    {
        Self {
            rows: Box::new(rows),
        }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(rows.into_iter().map(Ok))
    }

    /// Next row, `Ok(None)` once the batch is drained.
    #[inline]
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        self.rows.next().transpose()
    }
}

/// Lazy, single-pass sequence of row batches from one upstream partition.
pub trait BatchSource: Send {
    /// Next batch, `Ok(None)` once the partition is exhausted.
    fn next_batch(&mut self) -> Result<Option<RowBatch>>;
}

/// Batch source over any iterator of batches.
pub struct IterBatchSource {
    batches: Box<dyn Iterator<Item = Result<RowBatch>> + Send>,
}

impl IterBatchSource {
    pub fn new<I>(batches: I) -> Self
    where
        I: Iterator<Item = Result<RowBatch>> + Send + 'static,
    {
        Self {
            batches: Box::new(batches),
        }
    }

    pub fn from_batches(batches: Vec<RowBatch>) -> Self {
        Self::new(batches.into_iter().map(Ok))
    }
}

impl BatchSource for IterBatchSource {
    fn next_batch(&mut self) -> Result<Option<RowBatch>> {
        self.batches.next().transpose()
    }
}
