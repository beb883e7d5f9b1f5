use parquet::basic::Compression;
use serde::{Deserialize, Serialize};

/// Compression codec applied to fragment column chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentCompression {
    Uncompressed,
    #[default]
    Snappy,
}

impl FragmentCompression {
    pub(crate) fn to_parquet(self) -> Compression {
        match self {
            FragmentCompression::Uncompressed => Compression::UNCOMPRESSED,
            FragmentCompression::Snappy => Compression::SNAPPY,
        }
    }
}

/// Tuning for Parquet fact writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactWriterConfig {
    /// Rows buffered in memory before they are encoded into the open row group.
    pub rows_per_flush: usize,
    /// Upper bound on rows per Parquet row group.
    pub max_row_group_size: usize,
    pub compression: FragmentCompression,
}

impl Default for FactWriterConfig {
    fn default() -> Self {
        Self {
            rows_per_flush: 4096,
            max_row_group_size: 8192,
            compression: FragmentCompression::default(),
        }
    }
}

impl FactWriterConfig {
    pub fn with_rows_per_flush(mut self, rows: usize) -> Self {
        self.rows_per_flush = rows.max(1);
        self
    }

    pub fn with_max_row_group_size(mut self, rows: usize) -> Self {
        self.max_row_group_size = rows.max(1);
        self
    }

    pub fn with_compression(mut self, compression: FragmentCompression) -> Self {
        self.compression = compression;
        self
    }
}
