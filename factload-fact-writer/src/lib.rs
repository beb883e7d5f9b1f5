//! Fact writers: per-(partition, batch) sinks that persist assembled output
//! rows as one columnar fragment.
//!
//! # Lifecycle
//!
//! Every writer moves through [`FactWriterState`] exactly once:
//!
//! ```text
//! Created -> Initialised -> Writing -> Finished -> Closed
//! ```
//!
//! `finish` flushes buffered rows; `close` releases file handles and must run
//! even after a failed `finish`. A closed writer is never reused; the stage
//! asks a [`FactWriterFactory`] for a fresh one for every batch.
//!
//! # Parquet fragments
//!
//! [`ParquetFactWriter`] stores each fragment as a Parquet file with one
//! column per measure, an optional `raw_payload` column and an `mdk` column
//! holding the packed key. See [`fragment_schema`] for the exact layout.

mod config;
mod factory;
mod lifecycle;
mod parquet_writer;
mod reader;
mod schema;

pub use config::{FactWriterConfig, FragmentCompression};
pub use factory::{FactWriter, FactWriterContext, FactWriterFactory, ParquetFactWriterFactory};
pub use lifecycle::FactWriterState;
pub use parquet_writer::{ParquetFactWriter, fragment_file_name};
pub use reader::read_fragment;
pub use schema::{
    FIELD_ID_META_KEY, KEY_COLUMN_NAME, RAW_PAYLOAD_COLUMN_NAME, fragment_schema,
    measure_column_name,
};
