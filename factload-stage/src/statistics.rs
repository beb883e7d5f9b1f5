//! Fire-and-forget load telemetry.

use std::time::{SystemTime, UNIX_EPOCH};

use factload_types::WriterUnitId;

/// Sink for load timing and volume checkpoints.
///
/// Calls never fail and never influence the load; implementations must not
/// block for long.
pub trait LoadStatistics: Send + Sync {
    /// Key generation and fragment writing is about to start.
    fn record_mdk_write_start(&self, partition_id: &str, at: SystemTime);

    /// A writer unit finished flushing (successfully or not).
    fn record_unit_finished(&self, unit: WriterUnitId, at: SystemTime);

    /// A writer unit was closed.
    fn record_unit_closed(&self, unit: WriterUnitId, at: SystemTime);

    /// Running end time of key generation for the load partition.
    fn record_mdk_generate_total(&self, partition_id: &str, at: SystemTime);

    /// Rows written so far by the stage.
    fn record_total_records(&self, count: u64);
}

/// Statistics sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoadStatistics;

impl LoadStatistics for NoopLoadStatistics {
    fn record_mdk_write_start(&self, _partition_id: &str, _at: SystemTime) {}
    fn record_unit_finished(&self, _unit: WriterUnitId, _at: SystemTime) {}
    fn record_unit_closed(&self, _unit: WriterUnitId, _at: SystemTime) {}
    fn record_mdk_generate_total(&self, _partition_id: &str, _at: SystemTime) {}
    fn record_total_records(&self, _count: u64) {}
}

/// Statistics sink emitting `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLoadStatistics;

fn epoch_millis(at: SystemTime) -> u128 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

impl LoadStatistics for TracingLoadStatistics {
    fn record_mdk_write_start(&self, partition_id: &str, at: SystemTime) {
        tracing::debug!(
            "[LOAD_STATS] partition {partition_id}: mdk generation and write started at {}",
            epoch_millis(at)
        );
    }

    fn record_unit_finished(&self, unit: WriterUnitId, at: SystemTime) {
        tracing::debug!("[LOAD_STATS] {unit} finished at {}", epoch_millis(at));
    }

    fn record_unit_closed(&self, unit: WriterUnitId, at: SystemTime) {
        tracing::debug!("[LOAD_STATS] {unit} closed at {}", epoch_millis(at));
    }

    fn record_mdk_generate_total(&self, partition_id: &str, at: SystemTime) {
        tracing::debug!(
            "[LOAD_STATS] partition {partition_id}: mdk generation running until {}",
            epoch_millis(at)
        );
    }

    fn record_total_records(&self, count: u64) {
        tracing::info!("[LOAD_STATS] total records written: {count}");
    }
}
