use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use factload_fact_writer::{
    FactWriter, FactWriterContext, FactWriterFactory, ParquetFactWriterFactory,
};
use factload_keygen::{CardinalitySegmentResolver, SegmentDescriptor, SegmentDescriptorResolver};
use factload_result::{Error, Result};
use factload_types::{BatchSeq, PartitionIndex, RowLayout, WriterUnitId};

use crate::assembler::RowLayoutAssembler;
use crate::config::LoadConfiguration;
use crate::counter::RowCounter;
use crate::lifecycle::{abandon_writer, close_writer, finish_writer};
use crate::location::{LocalStoreLocationResolver, StoreLocationResolver};
use crate::row::{BatchSource, RowBatch};
use crate::statistics::{LoadStatistics, TracingLoadStatistics};

/// Segment-wide values resolved once per stage invocation.
#[derive(Clone)]
pub struct SegmentConstants {
    pub descriptor: SegmentDescriptor,
    pub assembler: RowLayoutAssembler,
    pub writer_context: Arc<FactWriterContext>,
}

impl SegmentConstants {
    /// Derive the row layout and key packer of the segment from `config`.
    pub fn resolve(
        config: &LoadConfiguration,
        descriptor_resolver: &dyn SegmentDescriptorResolver,
    ) -> Result<Self> {
        config.validate()?;

        let descriptor = descriptor_resolver.resolve(&config.dimension_cardinalities)?;
        if descriptor.dimension_count() != config.dimension_cardinalities.len() {
            return Err(Error::Configuration(format!(
                "segment descriptor covers {} dimensions, configuration declares {}",
                descriptor.dimension_count(),
                config.dimension_cardinalities.len()
            )));
        }

        let layout = RowLayout::new(
            config.measure_count(),
            config.no_dictionary_count,
            config.complex_dimension_count,
        );
        let assembler = RowLayoutAssembler::new(layout, Arc::clone(descriptor.key_packer()));
        let writer_context = Arc::new(FactWriterContext {
            table: config.table.clone(),
            task_id: config.task_id,
            segment_id: config.segment_id.clone(),
            layout,
            measure_types: config.measures.clone(),
            key_size_bytes: descriptor.key_size_bytes(),
        });

        Ok(Self {
            descriptor,
            assembler,
            writer_context,
        })
    }

    pub fn layout(&self) -> RowLayout {
        self.assembler.layout()
    }
}

/// Writes every batch of every partition source as one columnar fragment.
///
/// Partitions are processed in index order and batches in source order, one
/// fresh fact writer per batch. Any failure other than a failed `finish`
/// aborts the whole invocation with [`Error::DataLoading`].
pub struct DataWriterBatchStage {
    config: Arc<LoadConfiguration>,
    descriptor_resolver: Box<dyn SegmentDescriptorResolver>,
    location_resolver: Box<dyn StoreLocationResolver>,
    writer_factory: Box<dyn FactWriterFactory>,
    statistics: Arc<dyn LoadStatistics>,
    row_counter: RowCounter,
}

impl DataWriterBatchStage {
    /// Stage writing Parquet fragments under the configured store location.
    pub fn new(config: LoadConfiguration) -> Self {
        let location_resolver = LocalStoreLocationResolver::new(&config.store_location);
        let writer_factory = ParquetFactWriterFactory::new(config.writer.clone());
        Self {
            config: Arc::new(config),
            descriptor_resolver: Box::new(CardinalitySegmentResolver),
            location_resolver: Box::new(location_resolver),
            writer_factory: Box::new(writer_factory),
            statistics: Arc::new(TracingLoadStatistics),
            row_counter: RowCounter::new(),
        }
    }

    pub fn with_descriptor_resolver(mut self, resolver: Box<dyn SegmentDescriptorResolver>) -> Self {
        self.descriptor_resolver = resolver;
        self
    }

    pub fn with_location_resolver(mut self, resolver: Box<dyn StoreLocationResolver>) -> Self {
        self.location_resolver = resolver;
        self
    }

    pub fn with_writer_factory(mut self, factory: Box<dyn FactWriterFactory>) -> Self {
        self.writer_factory = factory;
        self
    }

    pub fn with_statistics(mut self, statistics: Arc<dyn LoadStatistics>) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn config(&self) -> &LoadConfiguration {
        &self.config
    }

    /// Handle on the stage's row counter, readable from any thread.
    pub fn row_counter(&self) -> RowCounter {
        self.row_counter.clone()
    }

    /// Drain every partition source and write one fragment per batch.
    pub fn write_sources(&mut self, sources: Vec<Box<dyn BatchSource>>) -> Result<()> {
        let table_name = self.config.table_name().to_string();
        self.write_all(sources).map_err(|err| {
            tracing::error!("[WRITER_STAGE] failed for table: {table_name}: {err}");
            Error::data_loading(table_name, err)
        })
    }

    fn write_all(&mut self, sources: Vec<Box<dyn BatchSource>>) -> Result<()> {
        let constants = SegmentConstants::resolve(&self.config, self.descriptor_resolver.as_ref())?;
        tracing::debug!(
            "[WRITER_STAGE] table {}: {} partitions, {} measures, extra slot: {}, {}-byte keys",
            self.config.table,
            sources.len(),
            constants.layout().measure_count(),
            constants.layout().has_extra(),
            constants.descriptor.key_size_bytes()
        );

        self.statistics
            .record_mdk_write_start(&self.config.partition_id, SystemTime::now());

        for (idx, mut source) in sources.into_iter().enumerate() {
            let partition = PartitionIndex(u32::try_from(idx).map_err(|_| {
                Error::InvalidArgumentError(format!("partition index {idx} out of range"))
            })?);
            self.write_partition(&constants, partition, source.as_mut())?;
        }

        self.statistics
            .record_total_records(self.row_counter.get());
        Ok(())
    }

    fn write_partition(
        &self,
        constants: &SegmentConstants,
        partition: PartitionIndex,
        source: &mut dyn BatchSource,
    ) -> Result<()> {
        let location = self.location_resolver.resolve(
            &self.config.table,
            self.config.task_id,
            partition,
            &self.config.segment_id,
        )?;

        let mut batch_seq = BatchSeq(0);
        while let Some(batch) = source.next_batch()? {
            let unit = WriterUnitId::new(partition, batch_seq);
            batch_seq = batch_seq.next();
            self.write_unit(constants, unit, &location, batch)?;
        }
        tracing::debug!(
            "[WRITER_STAGE] partition {partition} done: {} batches",
            batch_seq.0
        );
        Ok(())
    }

    fn write_unit(
        &self,
        constants: &SegmentConstants,
        unit: WriterUnitId,
        location: &Path,
        batch: RowBatch,
    ) -> Result<()> {
        let mut writer = self
            .writer_factory
            .create(&constants.writer_context, unit, location)?;

        let rows = match Self::initialise_and_drain(constants, writer.as_mut(), batch) {
            Ok(rows) => rows,
            Err(err) => {
                abandon_writer(unit, writer.as_mut());
                return Err(err);
            }
        };
        self.row_counter.add(rows);
        tracing::trace!("[WRITER_STAGE] {unit}: wrote {rows} rows");

        finish_writer(self.config.table_name(), unit, writer.as_mut());
        self.statistics.record_unit_finished(unit, SystemTime::now());

        close_writer(unit, writer.as_mut())?;
        let now = SystemTime::now();
        self.statistics.record_unit_closed(unit, now);
        self.statistics
            .record_mdk_generate_total(&self.config.partition_id, now);
        Ok(())
    }

    /// Initialise the writer and feed it every row of `batch` in read order.
    fn initialise_and_drain(
        constants: &SegmentConstants,
        writer: &mut dyn FactWriter,
        mut batch: RowBatch,
    ) -> Result<u64> {
        writer.initialise()?;
        let mut rows = 0u64;
        while let Some(row) = batch.next_row()? {
            writer.add_row(constants.assembler.assemble(row)?)?;
            rows += 1;
        }
        Ok(rows)
    }
}
