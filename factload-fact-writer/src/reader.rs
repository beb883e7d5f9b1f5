//! Reading fragments back, for verification and tooling.

use std::fs::File;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use factload_result::{Error, Result};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

/// Read every record batch of a Parquet fragment, in row order.
pub fn read_fragment(path: impl AsRef<Path>) -> Result<Vec<RecordBatch>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::Internal(format!("failed to open fragment '{}': {e}", path.display()))
    })?;

    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::Internal(format!("failed to create Parquet reader: {e}")))?
        .build()
        .map_err(|e| Error::Internal(format!("failed to build Parquet reader: {e}")))?;

    let mut batches = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| Error::Internal(format!("failed to read Parquet batch: {e}")))?;
        batches.push(batch);
    }
    Ok(batches)
}
