//! Batch-to-columnar writer stage.
//!
//! The last step of a load: it drains the sorted, dictionary-encoded row
//! batches of every upstream partition, assembles each row into the flat
//! layout fact writers expect, packs the dimension indices into a
//! multi-dimensional key, and drives one fresh [`FactWriter`] per batch
//! through its lifecycle.
//!
//! ```text
//! sort step -> [partition sources] -> DataWriterBatchStage
//!                                        |-- per batch: FactWriterFactory::create
//!                                        |-- per row:   RowLayoutAssembler::assemble -> add_row
//!                                        `-- per batch: finish (logged) -> close (fatal)
//! ```
//!
//! Processing is strictly sequential inside one stage instance. Run several
//! instances with distinct task ids to load partitions in parallel.
//!
//! [`FactWriter`]: factload_fact_writer::FactWriter

mod assembler;
mod config;
mod counter;
mod lifecycle;
mod location;
mod row;
mod stage;
mod statistics;
mod step;

pub use assembler::RowLayoutAssembler;
pub use config::LoadConfiguration;
pub use counter::RowCounter;
pub use location::{LocalStoreLocationResolver, StoreLocationResolver};
pub use row::{BatchSource, IterBatchSource, Row, RowBatch};
pub use stage::{DataWriterBatchStage, SegmentConstants};
pub use statistics::{LoadStatistics, NoopLoadStatistics, TracingLoadStatistics};
pub use step::{DataField, DataLoadStep, DataWriterBatchStep, FieldKind, InMemorySortedStep};
