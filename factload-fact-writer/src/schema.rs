//! Arrow schema of a Parquet fact fragment.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use factload_result::{Error, Result};
use factload_types::WriterUnitId;

use crate::factory::FactWriterContext;

/// Metadata key for storing the positional field id of a column.
pub const FIELD_ID_META_KEY: &str = "field_id";

/// Column holding no-dictionary and complex dimension bytes.
pub const RAW_PAYLOAD_COLUMN_NAME: &str = "raw_payload";

/// Column holding the packed multi-dimensional key.
pub const KEY_COLUMN_NAME: &str = "mdk";

pub fn measure_column_name(idx: usize) -> String {
    format!("measure_{idx}")
}

fn with_field_id(field: Field, field_id: usize) -> Field {
    field.with_metadata(HashMap::from([(
        FIELD_ID_META_KEY.to_string(),
        field_id.to_string(),
    )]))
}

/// Key column type; zero-dimension tables produce empty variable-width keys.
pub(crate) fn key_data_type(key_size_bytes: usize) -> Result<DataType> {
    if key_size_bytes == 0 {
        return Ok(DataType::Binary);
    }
    let width = i32::try_from(key_size_bytes).map_err(|_| {
        Error::InvalidArgumentError(format!("packed key width {key_size_bytes} is too large"))
    })?;
    Ok(DataType::FixedSizeBinary(width))
}

/// Schema of the fragment written for `unit`.
///
/// Fields follow the output row layout one to one, and each carries its
/// position under [`FIELD_ID_META_KEY`]. Schema metadata records the table,
/// segment, task and unit the fragment belongs to.
pub fn fragment_schema(ctx: &FactWriterContext, unit: WriterUnitId) -> Result<SchemaRef> {
    if ctx.measure_types.len() != ctx.layout.measure_count() {
        return Err(Error::InvalidArgumentError(format!(
            "{} measure types declared for a layout with {} measures",
            ctx.measure_types.len(),
            ctx.layout.measure_count()
        )));
    }

    let mut fields = Vec::with_capacity(ctx.layout.output_len());
    for (idx, ty) in ctx.measure_types.iter().enumerate() {
        fields.push(with_field_id(
            Field::new(measure_column_name(idx), ty.arrow_type(), true),
            idx,
        ));
    }
    if let Some(idx) = ctx.layout.payload_index() {
        fields.push(with_field_id(
            Field::new(RAW_PAYLOAD_COLUMN_NAME, DataType::Binary, true),
            idx,
        ));
    }
    fields.push(with_field_id(
        Field::new(KEY_COLUMN_NAME, key_data_type(ctx.key_size_bytes)?, false),
        ctx.layout.key_index(),
    ));

    let metadata = HashMap::from([
        ("table".to_string(), ctx.table.to_string()),
        ("segment_id".to_string(), ctx.segment_id.to_string()),
        ("task_id".to_string(), ctx.task_id.to_string()),
        ("partition".to_string(), unit.partition.to_string()),
        ("batch".to_string(), unit.batch.to_string()),
    ]);
    Ok(Arc::new(Schema::new_with_metadata(fields, metadata)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use factload_types::{
        BatchSeq, MeasureType, PartitionIndex, RowLayout, SegmentId, TableIdentity, TaskId,
    };

    fn ctx(no_dict: usize, key_size_bytes: usize) -> FactWriterContext {
        FactWriterContext {
            table: TableIdentity::new("db", "sales"),
            task_id: TaskId(1),
            segment_id: SegmentId::new("0"),
            layout: RowLayout::new(2, no_dict, 0),
            measure_types: vec![MeasureType::Int64, MeasureType::Float64],
            key_size_bytes,
        }
    }

    #[test]
    fn schema_follows_layout() {
        let unit = WriterUnitId::new(PartitionIndex(1), BatchSeq(2));
        let schema = fragment_schema(&ctx(1, 3), unit).unwrap();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, ["measure_0", "measure_1", "raw_payload", "mdk"]);
        assert_eq!(schema.field(3).data_type(), &DataType::FixedSizeBinary(3));
        assert_eq!(schema.field(3).metadata()[FIELD_ID_META_KEY], "3");
        assert_eq!(schema.metadata()["partition"], "1");
        assert_eq!(schema.metadata()["table"], "db.sales");
    }

    #[test]
    fn no_payload_column_without_extra() {
        let unit = WriterUnitId::new(PartitionIndex(0), BatchSeq(0));
        let schema = fragment_schema(&ctx(0, 0), unit).unwrap();
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.field(2).data_type(), &DataType::Binary);
    }

    #[test]
    fn measure_type_count_must_match() {
        let mut c = ctx(0, 1);
        c.measure_types.pop();
        let unit = WriterUnitId::new(PartitionIndex(0), BatchSeq(0));
        assert!(fragment_schema(&c, unit).is_err());
    }
}
