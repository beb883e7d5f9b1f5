mod common;

use std::sync::Arc;

use common::*;
use factload_result::Error;
use factload_stage::{
    DataField, DataLoadStep, DataWriterBatchStep, FieldKind, InMemorySortedStep,
};
use factload_types::{BatchSeq, MeasureType, PartitionIndex, WriterUnitId};

fn fields() -> Vec<DataField> {
    vec![
        DataField::new("store", FieldKind::DictionaryDimension),
        DataField::new("day", FieldKind::DictionaryDimension),
        DataField::new(
            "quantity",
            FieldKind::Measure {
                measure_type: MeasureType::Int64,
            },
        ),
        DataField::new(
            "amount_cents",
            FieldKind::Measure {
                measure_type: MeasureType::Int64,
            },
        ),
    ]
}

#[test]
fn writer_step_drains_its_child() {
    factload_test_utils::init_tracing_for_tests();
    let dir = tempfile::tempdir().expect("tempdir");
    let factory = RecordingFactory::default();
    let stats = Arc::new(RecordingStatistics::default());
    let mut seq = 0;
    let child = InMemorySortedStep::new(
        fields(),
        vec![batches(&[3, 2], &mut seq), batches(&[4], &mut seq)],
    );
    let mut step = DataWriterBatchStep::new(test_config(dir.path()), child)
        .with_writer_factory(Box::new(factory.clone()))
        .with_statistics(stats.clone());

    step.initialize().expect("initialize");
    assert_eq!(step.step_name(), "Data Batch Writer");
    assert_eq!(step.output_fields(), fields().as_slice());

    let downstream = step.execute().expect("execute");

    assert!(downstream.is_empty());
    assert_eq!(step.row_counter().get(), 9);
    assert_eq!(factory.created_units().len(), 3);
    assert_eq!(partition_dirs(dir.path()), vec!["0", "1"]);
    assert_eq!(stats.events().last(), Some(&StatEvent::TotalRecords(9)));
}

#[test]
fn measure_mismatch_fails_initialize() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut declared = fields();
    declared[3].kind = FieldKind::Measure {
        measure_type: MeasureType::Float64,
    };
    let child = InMemorySortedStep::new(declared, Vec::new());
    let mut step = DataWriterBatchStep::new(test_config(dir.path()), child);

    let err = step.initialize().unwrap_err();

    assert!(err.is_data_loading());
    assert!(err.to_string().contains("Float64"), "{err}");
}

#[test]
fn child_without_declared_fields_is_trusted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let factory = RecordingFactory::default();
    let mut seq = 0;
    let child = InMemorySortedStep::new(Vec::new(), vec![batches(&[1], &mut seq)]);
    let mut step = DataWriterBatchStep::new(test_config(dir.path()), child)
        .with_writer_factory(Box::new(factory.clone()));

    step.initialize().expect("initialize");
    step.execute().expect("execute");

    assert_eq!(
        factory.created_units(),
        vec![WriterUnitId::new(PartitionIndex(0), BatchSeq(0))]
    );
}

#[test]
fn child_failure_is_reported_as_data_loading() {
    let dir = tempfile::tempdir().expect("tempdir");
    let child = InMemorySortedStep::new(fields(), Vec::new());
    // Child never initialised, so its execute fails.
    let mut step = DataWriterBatchStep::new(test_config(dir.path()), child);

    let err = step.execute().err().expect("execute should fail");

    match err {
        Error::DataLoading { table, message } => {
            assert_eq!(table, "sales");
            assert!(message.contains("before initialize"), "{message}");
        }
        other => panic!("expected DataLoading, got {other:?}"),
    }
}

#[test]
fn sorted_step_hands_out_sources_once() {
    let mut seq = 0;
    let mut step = InMemorySortedStep::new(fields(), vec![batches(&[2], &mut seq)]);
    step.initialize().expect("initialize");

    let mut sources = step.execute().expect("first execute");
    assert_eq!(sources.len(), 1);
    let mut batch = sources[0].next_batch().expect("batch").expect("one batch");
    assert!(batch.next_row().expect("row").is_some());

    assert!(step.execute().is_err());
}

#[test]
fn field_kinds_deserialize_from_json() {
    let json = r#"[
        {"name": "store", "kind": {"kind": "dictionary_dimension"}},
        {"name": "amount", "kind": {"kind": "measure", "measure_type": {"type": "decimal", "precision": 12, "scale": 2}}}
    ]"#;
    let parsed: Vec<DataField> = serde_json::from_str(json).expect("fields");

    assert_eq!(parsed[0].kind, FieldKind::DictionaryDimension);
    assert_eq!(
        parsed[1].kind,
        FieldKind::Measure {
            measure_type: MeasureType::Decimal {
                precision: 12,
                scale: 2
            }
        }
    );
}

struct UnavailableSortStep;

impl DataLoadStep for UnavailableSortStep {
    fn initialize(&mut self) -> factload_result::Result<()> {
        Err(Error::Internal("sort temp directory missing".into()))
    }

    fn output_fields(&self) -> &[DataField] {
        &[]
    }

    fn execute(&mut self) -> factload_result::Result<Vec<Box<dyn factload_stage::BatchSource>>> {
        Ok(Vec::new())
    }

    fn step_name(&self) -> &'static str {
        "Unavailable Sort"
    }
}

#[test]
fn child_initialize_failure_is_reported_as_data_loading() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut step = DataWriterBatchStep::new(test_config(dir.path()), UnavailableSortStep);

    let err = step.initialize().unwrap_err();

    match err {
        Error::DataLoading { table, message } => {
            assert_eq!(table, "sales");
            assert!(message.contains("sort temp directory missing"), "{message}");
        }
        other => panic!("expected DataLoading, got {other:?}"),
    }
}
