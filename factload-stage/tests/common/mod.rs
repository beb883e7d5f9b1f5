#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use factload_fact_writer::{FactWriter, FactWriterContext, FactWriterFactory, FactWriterState};
use factload_result::{Error, Result};
use factload_stage::{LoadConfiguration, LoadStatistics, Row, RowBatch};
use factload_types::{
    MeasureType, MeasureValue, OutputRow, SegmentId, TableIdentity, TaskId, WriterUnitId,
};

/// Everything a recording writer saw, in call order across all writers.
#[derive(Debug, Clone, PartialEq)]
pub enum WriterEvent {
    Created(WriterUnitId, PathBuf),
    Initialised(WriterUnitId),
    Row(WriterUnitId, OutputRow),
    Finished(WriterUnitId),
    CloseCalled(WriterUnitId),
    Aborted(WriterUnitId),
}

/// Lifecycle calls that should fail, by writer unit.
#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub initialise: Option<WriterUnitId>,
    /// Fail the n-th (0-based) row written to the unit.
    pub add_row: Option<(WriterUnitId, u64)>,
    pub finish: Option<WriterUnitId>,
    pub close: Option<WriterUnitId>,
    pub abort: Option<WriterUnitId>,
}

pub type EventLog = Arc<Mutex<Vec<WriterEvent>>>;

#[derive(Clone, Default)]
pub struct RecordingFactory {
    pub log: EventLog,
    pub failures: Failures,
}

impl RecordingFactory {
    pub fn new(failures: Failures) -> Self {
        Self {
            log: EventLog::default(),
            failures,
        }
    }

    pub fn events(&self) -> Vec<WriterEvent> {
        self.log.lock().unwrap().clone()
    }

    pub fn created_units(&self) -> Vec<WriterUnitId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                WriterEvent::Created(unit, _) => Some(unit),
                _ => None,
            })
            .collect()
    }

    pub fn rows_for(&self, unit: WriterUnitId) -> Vec<OutputRow> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                WriterEvent::Row(u, row) if u == unit => Some(row),
                _ => None,
            })
            .collect()
    }
}

impl FactWriterFactory for RecordingFactory {
    fn create(
        &self,
        _ctx: &FactWriterContext,
        unit: WriterUnitId,
        store_location: &Path,
    ) -> Result<Box<dyn FactWriter>> {
        self.log
            .lock()
            .unwrap()
            .push(WriterEvent::Created(unit, store_location.to_path_buf()));
        Ok(Box::new(RecordingWriter {
            unit,
            state: FactWriterState::Created,
            rows: 0,
            log: Arc::clone(&self.log),
            failures: self.failures.clone(),
        }))
    }
}

/// Writer enforcing the lifecycle and recording every call.
pub struct RecordingWriter {
    unit: WriterUnitId,
    state: FactWriterState,
    rows: u64,
    log: EventLog,
    failures: Failures,
}

impl RecordingWriter {
    fn push(&self, event: WriterEvent) {
        self.log.lock().unwrap().push(event);
    }
}

impl FactWriter for RecordingWriter {
    fn initialise(&mut self) -> Result<()> {
        if self.failures.initialise == Some(self.unit) {
            return Err(Error::FactWriter("injected initialise failure".into()));
        }
        self.state.transition(FactWriterState::Initialised, self.unit)?;
        self.push(WriterEvent::Initialised(self.unit));
        Ok(())
    }

    fn add_row(&mut self, row: OutputRow) -> Result<()> {
        if self.failures.add_row == Some((self.unit, self.rows)) {
            return Err(Error::FactWriter("injected add_row failure".into()));
        }
        self.state.transition(FactWriterState::Writing, self.unit)?;
        self.rows += 1;
        self.push(WriterEvent::Row(self.unit, row));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.failures.finish == Some(self.unit) {
            return Err(Error::FactWriter("injected finish failure".into()));
        }
        self.state.transition(FactWriterState::Finished, self.unit)?;
        self.push(WriterEvent::Finished(self.unit));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.push(WriterEvent::CloseCalled(self.unit));
        self.state.transition(FactWriterState::Closed, self.unit)?;
        if self.failures.close == Some(self.unit) {
            return Err(Error::FactWriter("injected close failure".into()));
        }
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        self.push(WriterEvent::Aborted(self.unit));
        self.state.transition(FactWriterState::Closed, self.unit)?;
        if self.failures.abort == Some(self.unit) {
            return Err(Error::FactWriter("injected abort failure".into()));
        }
        Ok(())
    }

    fn state(&self) -> FactWriterState {
        self.state
    }

    fn rows_written(&self) -> u64 {
        self.rows
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatEvent {
    WriteStart(String),
    UnitFinished(WriterUnitId),
    UnitClosed(WriterUnitId),
    GenerateTotal(String),
    TotalRecords(u64),
}

#[derive(Default)]
pub struct RecordingStatistics {
    pub events: Mutex<Vec<StatEvent>>,
}

impl RecordingStatistics {
    pub fn events(&self) -> Vec<StatEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl LoadStatistics for RecordingStatistics {
    fn record_mdk_write_start(&self, partition_id: &str, _at: SystemTime) {
        self.events
            .lock()
            .unwrap()
            .push(StatEvent::WriteStart(partition_id.to_string()));
    }

    fn record_unit_finished(&self, unit: WriterUnitId, _at: SystemTime) {
        self.events.lock().unwrap().push(StatEvent::UnitFinished(unit));
    }

    fn record_unit_closed(&self, unit: WriterUnitId, _at: SystemTime) {
        self.events.lock().unwrap().push(StatEvent::UnitClosed(unit));
    }

    fn record_mdk_generate_total(&self, partition_id: &str, _at: SystemTime) {
        self.events
            .lock()
            .unwrap()
            .push(StatEvent::GenerateTotal(partition_id.to_string()));
    }

    fn record_total_records(&self, count: u64) {
        self.events.lock().unwrap().push(StatEvent::TotalRecords(count));
    }
}

/// Two Int64 measures, two dictionary dimensions with cardinality 255.
pub fn test_config(store_location: &Path) -> LoadConfiguration {
    LoadConfiguration::new(
        TableIdentity::new("retail", "sales"),
        TaskId(7),
        SegmentId::new("0"),
        store_location,
    )
    .with_measures(vec![MeasureType::Int64, MeasureType::Int64])
    .with_dimension_cardinalities(vec![255, 255])
}

/// Row whose first measure is `seq` and whose dimensions are derived from it.
pub fn seq_row(seq: i64) -> Row {
    Row::new(
        vec![MeasureValue::Int64(seq), MeasureValue::Int64(seq * 10)],
        vec![(seq % 255) as u32, (seq / 255 % 255) as u32],
    )
}

/// Batches of the given sizes with globally increasing sequence ids.
pub fn batches(sizes: &[usize], next_seq: &mut i64) -> Vec<RowBatch> {
    sizes
        .iter()
        .map(|&n| {
            let rows = (0..n)
                .map(|_| {
                    let row = seq_row(*next_seq);
                    *next_seq += 1;
                    row
                })
                .collect();
            RowBatch::from_rows(rows)
        })
        .collect()
}

/// First measure of an output row, as written by `seq_row`.
pub fn seq_of(row: &OutputRow) -> i64 {
    match row.get(0) {
        Some(factload_types::OutputValue::Measure(MeasureValue::Int64(v))) => *v,
        other => panic!("unexpected first slot {other:?}"),
    }
}

/// Local resolver that also records every resolved partition.
#[derive(Clone)]
pub struct CountingLocationResolver {
    inner: factload_stage::LocalStoreLocationResolver,
    pub resolved: Arc<Mutex<Vec<factload_types::PartitionIndex>>>,
}

impl CountingLocationResolver {
    pub fn new(base: &Path) -> Self {
        Self {
            inner: factload_stage::LocalStoreLocationResolver::new(base),
            resolved: Arc::default(),
        }
    }

    pub fn resolved(&self) -> Vec<factload_types::PartitionIndex> {
        self.resolved.lock().unwrap().clone()
    }
}

impl factload_stage::StoreLocationResolver for CountingLocationResolver {
    fn resolve(
        &self,
        table: &TableIdentity,
        task_id: TaskId,
        partition: factload_types::PartitionIndex,
        segment_id: &SegmentId,
    ) -> Result<PathBuf> {
        self.resolved.lock().unwrap().push(partition);
        self.inner.resolve(table, task_id, partition, segment_id)
    }
}

/// Sorted names of the partition directories created for task 7 of
/// `retail.sales`.
pub fn partition_dirs(base: &Path) -> Vec<String> {
    let task_dir = base.join("retail").join("sales").join("7");
    let Ok(entries) = std::fs::read_dir(task_dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().join("Segment_0").is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
