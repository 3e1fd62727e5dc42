use super::loader::{load_csv, parse_csv};
use super::synthetic::{self, SYNTHETIC_ROWS};
use super::{load_or_synthetic, DataSource, Dataset, Value};
use crate::logic::error::PipelineError;
use std::io::Write;

#[test]
fn test_load_csv_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "id,Gender,Age,Sleep Duration,Depression").unwrap();
    writeln!(file, "1,Male,21,'5-6 hours',1").unwrap();
    writeln!(file, "2,Female,,?,0").unwrap();

    let loaded = load_csv(&path).unwrap();
    let ds = loaded.dataset;

    assert_eq!(ds.len(), 2);
    assert_eq!(ds.columns()[3], "Sleep Duration");
    assert_eq!(loaded.sha256.len(), 64);

    let first = ds.record(0).unwrap();
    assert_eq!(first["Sleep Duration"], Value::Text("5-6 hours".to_string()));
    assert_eq!(first["Age"], Value::Number(21.0));

    let second = ds.record(1).unwrap();
    assert!(second["Age"].is_missing());
    assert!(second["Sleep Duration"].is_missing());
    assert_eq!(ds.missing_counts().len(), 2);
}

#[test]
fn test_missing_file_is_dataset_load_error() {
    let result = load_csv("/definitely/not/here.csv");
    match result {
        Err(e @ PipelineError::DatasetLoad { .. }) => assert!(e.is_recoverable()),
        _ => panic!("Expected DatasetLoad error"),
    }
}

#[test]
fn test_ragged_rows_are_rejected() {
    let csv = "a,b,label\n1,2,0\n3,1\n";
    assert!(matches!(
        parse_csv(csv.as_bytes()),
        Err(PipelineError::DatasetLoad { .. })
    ));
}

#[test]
fn test_header_only_is_rejected() {
    let csv = "a,b,label\n";
    assert!(parse_csv(csv.as_bytes()).is_err());
}

#[test]
fn test_fallback_to_synthetic_dataset() {
    let (ds, source) = load_or_synthetic("/definitely/not/here.csv").unwrap();

    assert!(source.is_synthetic());
    assert_eq!(source.label(), "synthetic");
    assert_eq!(ds.len(), SYNTHETIC_ROWS);
    match source {
        DataSource::Synthetic { reason, rows } => {
            assert!(reason.contains("here.csv"));
            assert_eq!(rows, SYNTHETIC_ROWS);
        }
        _ => panic!("Expected synthetic source"),
    }
}

#[test]
fn test_synthetic_dataset_is_trainable() {
    let ds = synthetic::dataset().unwrap();
    let label = ds.column_index("Depression").unwrap();
    let positives = ds
        .column(label)
        .iter()
        .filter(|v| v.as_number() == Some(1.0))
        .count();

    assert!(ds.len() >= 10);
    assert!(positives > 0 && positives < ds.len());
    assert!(ds.missing_counts().is_empty());
}

#[test]
fn test_dataset_new_checks_width() {
    let result = Dataset::new(
        vec!["a".to_string(), "b".to_string()],
        vec![vec![Value::Number(1.0)]],
    );
    assert!(result.is_err());
}
