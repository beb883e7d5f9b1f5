//! Identifiers naming a load, its partitions and its writer units.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Database and table a load writes into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableIdentity {
    pub database_name: String,
    pub table_name: String,
}

impl TableIdentity {
    pub fn new(database_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            table_name: table_name.into(),
        }
    }
}

impl fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database_name, self.table_name)
    }
}

/// Identifier of the load task running a stage instance.
///
/// Independent stage instances running in parallel must carry distinct task
/// ids so their store locations never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an upstream partition source in the array handed to the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionIndex(pub u32);

impl fmt::Display for PartitionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Segment the loaded fragments belong to.
///
/// Segment ids are opaque strings assigned by the load coordinator
/// (commonly a decimal number such as `"0"` or `"12"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(pub String);

impl SegmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sequence number of a batch within one partition, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchSeq(pub u32);

impl BatchSeq {
    /// The sequence number of the batch after this one.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for BatchSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One (partition, batch) unit of work; owns exactly one fact writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WriterUnitId {
    pub partition: PartitionIndex,
    pub batch: BatchSeq,
}

impl WriterUnitId {
    pub fn new(partition: PartitionIndex, batch: BatchSeq) -> Self {
        Self { partition, batch }
    }
}

impl fmt::Display for WriterUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition {} batch {}", self.partition, self.batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_ids_order_by_partition_then_batch() {
        let a = WriterUnitId::new(PartitionIndex(0), BatchSeq(5));
        let b = WriterUnitId::new(PartitionIndex(1), BatchSeq(0));
        assert!(a < b);
        assert_eq!(b.to_string(), "partition 1 batch 0");
    }

    #[test]
    fn transparent_ids_serialize_as_scalars() {
        let json = serde_json::to_string(&(TaskId(7), SegmentId::new("3"))).unwrap();
        assert_eq!(json, r#"[7,"3"]"#);
    }
}
