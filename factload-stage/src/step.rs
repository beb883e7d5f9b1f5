//! Load steps chained into a pipeline.
//!
//! Each step initialises its child, then pulls the child's partition sources
//! when executed. The writer step is terminal: it consumes every source and
//! hands nothing downstream.

use std::sync::Arc;

use factload_fact_writer::FactWriterFactory;
use factload_keygen::SegmentDescriptorResolver;
use factload_result::{Error, Result};
use factload_types::MeasureType;
use serde::{Deserialize, Serialize};

use crate::config::LoadConfiguration;
use crate::counter::RowCounter;
use crate::location::StoreLocationResolver;
use crate::row::{BatchSource, IterBatchSource, RowBatch};
use crate::stage::DataWriterBatchStage;
use crate::statistics::LoadStatistics;

/// Role of a column in the rows a step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Measure { measure_type: MeasureType },
    DictionaryDimension,
    NoDictionaryDimension,
    ComplexDimension,
}

/// Named column of a step's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub name: String,
    pub kind: FieldKind,
}

impl DataField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// One step of a load pipeline.
pub trait DataLoadStep: Send {
    fn initialize(&mut self) -> Result<()>;

    fn output_fields(&self) -> &[DataField];

    /// Produce one single-pass batch source per partition.
    fn execute(&mut self) -> Result<Vec<Box<dyn BatchSource>>>;

    fn step_name(&self) -> &'static str;
}

/// Step serving already sorted batches held in memory.
pub struct InMemorySortedStep {
    fields: Vec<DataField>,
    partitions: Option<Vec<Vec<RowBatch>>>,
    initialized: bool,
}

impl InMemorySortedStep {
    pub fn new(fields: Vec<DataField>, partitions: Vec<Vec<RowBatch>>) -> Self {
        Self {
            fields,
            partitions: Some(partitions),
            initialized: false,
        }
    }
}

impl DataLoadStep for InMemorySortedStep {
    fn initialize(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn output_fields(&self) -> &[DataField] {
        &self.fields
    }

    fn execute(&mut self) -> Result<Vec<Box<dyn BatchSource>>> {
        if !self.initialized {
            return Err(Error::Internal(format!(
                "{} executed before initialize",
                self.step_name()
            )));
        }
        let partitions = self.partitions.take().ok_or_else(|| {
            Error::Internal(format!("{} sources were already consumed", self.step_name()))
        })?;
        Ok(partitions
            .into_iter()
            .map(|batches| Box::new(IterBatchSource::from_batches(batches)) as Box<dyn BatchSource>)
            .collect())
    }

    fn step_name(&self) -> &'static str {
        "In-Memory Sorted Batches"
    }
}

/// Terminal step running a [`DataWriterBatchStage`] over its child's output.
pub struct DataWriterBatchStep<C: DataLoadStep> {
    child: C,
    stage: DataWriterBatchStage,
}

impl<C: DataLoadStep> DataWriterBatchStep<C> {
    pub fn new(config: LoadConfiguration, child: C) -> Self {
        Self {
            child,
            stage: DataWriterBatchStage::new(config),
        }
    }

    pub fn with_descriptor_resolver(mut self, resolver: Box<dyn SegmentDescriptorResolver>) -> Self {
        self.stage = self.stage.with_descriptor_resolver(resolver);
        self
    }

    pub fn with_location_resolver(mut self, resolver: Box<dyn StoreLocationResolver>) -> Self {
        self.stage = self.stage.with_location_resolver(resolver);
        self
    }

    pub fn with_writer_factory(mut self, factory: Box<dyn FactWriterFactory>) -> Self {
        self.stage = self.stage.with_writer_factory(factory);
        self
    }

    pub fn with_statistics(mut self, statistics: Arc<dyn LoadStatistics>) -> Self {
        self.stage = self.stage.with_statistics(statistics);
        self
    }

    pub fn row_counter(&self) -> RowCounter {
        self.stage.row_counter()
    }

    pub fn child(&self) -> &C {
        &self.child
    }

    /// The child's declared measures must agree with the configuration.
    fn check_child_fields(&self) -> Result<()> {
        let declared: Vec<MeasureType> = self
            .child
            .output_fields()
            .iter()
            .filter_map(|f| match f.kind {
                FieldKind::Measure { measure_type } => Some(measure_type),
                _ => None,
            })
            .collect();
        let configured = &self.stage.config().measures;
        if !self.child.output_fields().is_empty() && declared != *configured {
            return Err(Error::Configuration(format!(
                "{} produces measures {declared:?}, load is configured for {configured:?}",
                self.child.step_name()
            )));
        }
        Ok(())
    }
}

impl<C: DataLoadStep> DataLoadStep for DataWriterBatchStep<C> {
    fn initialize(&mut self) -> Result<()> {
        self.child
            .initialize()
            .and_then(|()| self.check_child_fields())
            .map_err(|err| Error::data_loading(self.stage.config().table_name(), err))
    }

    fn output_fields(&self) -> &[DataField] {
        self.child.output_fields()
    }

    fn execute(&mut self) -> Result<Vec<Box<dyn BatchSource>>> {
        tracing::debug!(
            "[WRITER_STAGE] {} pulling sources from {}",
            self.step_name(),
            self.child.step_name()
        );
        let sources = self
            .child
            .execute()
            .map_err(|err| Error::data_loading(self.stage.config().table_name(), err))?;
        self.stage.write_sources(sources)?;
        tracing::info!(
            "[WRITER_STAGE] {} completed for table {}: {} rows",
            self.step_name(),
            self.stage.config().table,
            self.stage.row_counter().get()
        );
        Ok(Vec::new())
    }

    fn step_name(&self) -> &'static str {
        "Data Batch Writer"
    }
}
