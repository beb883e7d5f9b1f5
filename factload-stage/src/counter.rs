use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Rows written by one stage instance.
///
/// Only the stage's own thread increments it; clones are read-only handles for
/// telemetry readers on other threads and always see a whole value.
#[derive(Debug, Clone, Default)]
pub struct RowCounter {
    rows: Arc<AtomicU64>,
}

impl RowCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` rows and return the new total.
    #[inline]
    pub fn add(&self, n: u64) -> u64 {
        self.rows.fetch_add(n, Ordering::Relaxed) + n
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }
}
