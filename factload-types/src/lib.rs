//! Identifiers and value types shared across factload crates.
//!
//! These types live in their own crate so the key packer, the fact writers and
//! the writer stage can agree on a row layout without depending on each other.

pub mod ids;
pub mod key;
pub mod measure;
pub mod output;

pub use ids::{BatchSeq, PartitionIndex, SegmentId, TableIdentity, TaskId, WriterUnitId};
pub use key::PackedKey;
pub use measure::{MeasureType, MeasureValue};
pub use output::{OutputRow, OutputValue, RowLayout};
