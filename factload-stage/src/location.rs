//! Where each partition's fact fragments are written.

use std::path::PathBuf;

use factload_result::{Error, Result};
use factload_types::{PartitionIndex, SegmentId, TableIdentity, TaskId};

/// Maps a (table, task, partition, segment) tuple to a directory and makes
/// sure it exists.
///
/// Resolving the same tuple twice returns the same directory; distinct
/// (task, partition, segment) tuples never share one.
pub trait StoreLocationResolver: Send {
    fn resolve(
        &self,
        table: &TableIdentity,
        task_id: TaskId,
        partition: PartitionIndex,
        segment_id: &SegmentId,
    ) -> Result<PathBuf>;
}

/// Resolver laying directories out under a local base path:
///
/// ```text
/// <base>/<database>/<table>/<task>/<partition>/Segment_<segment>
/// ```
#[derive(Debug, Clone)]
pub struct LocalStoreLocationResolver {
    base_dir: PathBuf,
}

impl LocalStoreLocationResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &std::path::Path {
        &self.base_dir
    }

    /// The directory for a tuple, without touching the filesystem.
    pub fn location_for(
        &self,
        table: &TableIdentity,
        task_id: TaskId,
        partition: PartitionIndex,
        segment_id: &SegmentId,
    ) -> PathBuf {
        self.base_dir
            .join(&table.database_name)
            .join(&table.table_name)
            .join(task_id.to_string())
            .join(partition.to_string())
            .join(format!("Segment_{segment_id}"))
    }
}

impl StoreLocationResolver for LocalStoreLocationResolver {
    fn resolve(
        &self,
        table: &TableIdentity,
        task_id: TaskId,
        partition: PartitionIndex,
        segment_id: &SegmentId,
    ) -> Result<PathBuf> {
        let dir = self.location_for(table, task_id, partition, segment_id);
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::Internal(format!(
                "failed to create store location '{}': {e}",
                dir.display()
            ))
        })?;
        tracing::trace!("[STORE_LOCATION] resolved {}", dir.display());
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_idempotent() {
        let base = tempfile::tempdir().unwrap();
        let resolver = LocalStoreLocationResolver::new(base.path());
        let table = TableIdentity::new("db", "t");
        let seg = SegmentId::new("0");

        let first = resolver.resolve(&table, TaskId(1), PartitionIndex(0), &seg).unwrap();
        let second = resolver.resolve(&table, TaskId(1), PartitionIndex(0), &seg).unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
        assert!(first.ends_with("db/t/1/0/Segment_0"));
    }

    #[test]
    fn distinct_tuples_get_distinct_directories() {
        let resolver = LocalStoreLocationResolver::new("/base");
        let table = TableIdentity::new("db", "t");
        let a = resolver.location_for(&table, TaskId(1), PartitionIndex(0), &SegmentId::new("0"));
        let b = resolver.location_for(&table, TaskId(2), PartitionIndex(0), &SegmentId::new("0"));
        let c = resolver.location_for(&table, TaskId(1), PartitionIndex(1), &SegmentId::new("0"));
        let d = resolver.location_for(&table, TaskId(1), PartitionIndex(0), &SegmentId::new("1"));
        let all = [a, b, c, d];
        for i in 0..all.len() {
            for j in i + 1..all.len() {
                assert_ne!(all[i], all[j]);
            }
        }
    }

    #[test]
    fn unwritable_base_is_reported() {
        let base = tempfile::tempdir().unwrap();
        let file = base.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let resolver = LocalStoreLocationResolver::new(&file);
        let err = resolver
            .resolve(
                &TableIdentity::new("db", "t"),
                TaskId(0),
                PartitionIndex(0),
                &SegmentId::new("0"),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Internal(msg) if msg.contains("store location")));
    }
}
