//! Read-only configuration of one load.

use std::path::{Path, PathBuf};

use factload_fact_writer::FactWriterConfig;
use factload_result::{Error, Result};
use factload_types::{MeasureType, SegmentId, TableIdentity, TaskId};
use serde::{Deserialize, Serialize};

/// Everything the writer stage needs to know about the load it runs.
///
/// Loaded from JSON or built in code, validated once before any directory is
/// created, and never mutated while the stage runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadConfiguration {
    pub table: TableIdentity,
    pub task_id: TaskId,
    pub segment_id: SegmentId,
    /// Load partition id reported to the statistics sink.
    #[serde(default = "default_partition_id")]
    pub partition_id: String,
    /// Declared type of every measure, in row order.
    pub measures: Vec<MeasureType>,
    /// Cardinality of every dictionary dimension, in schema order.
    pub dimension_cardinalities: Vec<u32>,
    #[serde(default)]
    pub no_dictionary_count: usize,
    #[serde(default)]
    pub complex_dimension_count: usize,
    /// Root directory fact fragments are written under.
    pub store_location: PathBuf,
    #[serde(default)]
    pub writer: FactWriterConfig,
}

fn default_partition_id() -> String {
    "0".to_string()
}

impl LoadConfiguration {
    pub fn new(
        table: TableIdentity,
        task_id: TaskId,
        segment_id: SegmentId,
        store_location: impl Into<PathBuf>,
    ) -> Self {
        Self {
            table,
            task_id,
            segment_id,
            partition_id: default_partition_id(),
            measures: Vec::new(),
            dimension_cardinalities: Vec::new(),
            no_dictionary_count: 0,
            complex_dimension_count: 0,
            store_location: store_location.into(),
            writer: FactWriterConfig::default(),
        }
    }

    pub fn with_measures(mut self, measures: Vec<MeasureType>) -> Self {
        self.measures = measures;
        self
    }

    pub fn with_dimension_cardinalities(mut self, cardinalities: Vec<u32>) -> Self {
        self.dimension_cardinalities = cardinalities;
        self
    }

    pub fn with_no_dictionary_count(mut self, count: usize) -> Self {
        self.no_dictionary_count = count;
        self
    }

    pub fn with_complex_dimension_count(mut self, count: usize) -> Self {
        self.complex_dimension_count = count;
        self
    }

    pub fn with_partition_id(mut self, partition_id: impl Into<String>) -> Self {
        self.partition_id = partition_id.into();
        self
    }

    pub fn with_writer_config(mut self, writer: FactWriterConfig) -> Self {
        self.writer = writer;
        self
    }

    pub fn measure_count(&self) -> usize {
        self.measures.len()
    }

    pub fn table_name(&self) -> &str {
        &self.table.table_name
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!(
                "failed to read load configuration '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Check the configuration is usable before any work starts.
    pub fn validate(&self) -> Result<()> {
        check_path_component("database name", &self.table.database_name)?;
        check_path_component("table name", &self.table.table_name)?;
        check_path_component("segment id", self.segment_id.as_str())?;
        if self.store_location.as_os_str().is_empty() {
            return Err(Error::Configuration("store location is empty".into()));
        }
        if self.writer.rows_per_flush == 0 || self.writer.max_row_group_size == 0 {
            return Err(Error::Configuration(
                "writer flush and row group sizes must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Identifiers become directory names, so they must be single components.
fn check_path_component(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Configuration(format!("{what} is empty")));
    }
    if value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(Error::Configuration(format!(
            "{what} '{value}' is not a valid directory name"
        )));
    }
    Ok(())
}
