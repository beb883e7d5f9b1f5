//! factload: the columnar writer stage of a fact data load.
//!
//! This crate is the entrypoint of the workspace. It re-exports the writer
//! stage together with the key packing, fact writer and error types it is
//! built from, so a pipeline driver needs a single dependency.
//!
//! # Quick Start
//!
//! Write two partitions of sorted rows as Parquet fragments:
//!
//! ```rust
//! use factload::{
//!     BatchSource, DataWriterBatchStage, IterBatchSource, LoadConfiguration, MeasureType, Row,
//!     RowBatch, SegmentId, TableIdentity, TaskId,
//! };
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = LoadConfiguration::new(
//!     TableIdentity::new("retail", "sales"),
//!     TaskId(1),
//!     SegmentId::new("0"),
//!     dir.path(),
//! )
//! .with_measures(vec![MeasureType::Int64])
//! .with_dimension_cardinalities(vec![10, 400]);
//!
//! let partition = |rows: Vec<Row>| -> Box<dyn BatchSource> {
//!     Box::new(IterBatchSource::from_batches(vec![RowBatch::from_rows(rows)]))
//! };
//! let mut stage = DataWriterBatchStage::new(config);
//! stage
//!     .write_sources(vec![
//!         partition(vec![Row::new(vec![5i64.into()], vec![1, 17])]),
//!         partition(vec![Row::new(vec![8i64.into()], vec![2, 300])]),
//!     ])
//!     .unwrap();
//! assert_eq!(stage.row_counter().get(), 2);
//! ```
//!
//! # Architecture
//!
//! - **Stage** (`factload-stage`): drains partition sources, assembles rows
//!   and drives one fact writer per batch.
//! - **Key generation** (`factload-keygen`): packs dimension surrogates into
//!   order-preserving multi-dimensional keys.
//! - **Fact writers** (`factload-fact-writer`): writer lifecycle and the
//!   Parquet-backed implementation.
//! - **Types** (`factload-types`, `factload-result`): identifiers, row values
//!   and the shared error type.

pub use factload_stage::{
    BatchSource, DataField, DataLoadStep, DataWriterBatchStage, DataWriterBatchStep, FieldKind,
    InMemorySortedStep, IterBatchSource, LoadConfiguration, LoadStatistics,
    LocalStoreLocationResolver, NoopLoadStatistics, Row, RowBatch, RowCounter, RowLayoutAssembler,
    SegmentConstants, StoreLocationResolver, TracingLoadStatistics,
};

pub use factload_types::{
    BatchSeq, MeasureType, MeasureValue, OutputRow, OutputValue, PackedKey, PartitionIndex,
    RowLayout, SegmentId, TableIdentity, TaskId, WriterUnitId,
};

// Re-export result types for error handling
pub use factload_result::{Error, Result};

pub mod keygen {
    //! Multi-dimensional key packing and segment descriptors.

    pub use factload_keygen::{
        CardinalitySegmentResolver, KeyPacker, MultiDimKeyGenerator, SegmentDescriptor,
        SegmentDescriptorResolver, bit_width_for_cardinality,
    };
}

pub mod writer {
    //! Fact writer lifecycle and the Parquet fragment format.

    pub use factload_fact_writer::{
        FactWriter, FactWriterConfig, FactWriterContext, FactWriterFactory, FactWriterState,
        FragmentCompression, KEY_COLUMN_NAME, ParquetFactWriter, ParquetFactWriterFactory,
        RAW_PAYLOAD_COLUMN_NAME, fragment_file_name, measure_column_name, read_fragment,
    };
}
