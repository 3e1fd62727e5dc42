use super::*;
use crate::logic::dataset::{synthetic, Dataset, Record, Value};
use crate::logic::error::PipelineError;

fn small_dataset(rows: usize) -> Dataset {
    let columns = ["id", "Gender", "Age", "Sleep", "Depression"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let data = (0..rows)
        .map(|i| {
            vec![
                Value::Number(i as f64),
                Value::parse(if i % 2 == 0 { "Male" } else { "Female" }),
                Value::Number(18.0 + i as f64),
                if i == 3 { Value::Missing } else { Value::parse(if i % 3 == 0 { "Short" } else { "Long" }) },
                Value::Number((i % 2) as f64),
            ]
        })
        .collect();

    Dataset::new(columns, data).unwrap()
}

fn synthetic_fit() -> (FittedPipeline, TrainingTable) {
    fit(&synthetic::dataset().unwrap(), &DatasetColumns::default()).unwrap()
}

#[test]
fn test_schema_excludes_id_and_label() {
    let ds = small_dataset(12);
    let (pipeline, table) = fit(&ds, &DatasetColumns::default()).unwrap();

    let names: Vec<&str> = pipeline.schema().names().collect();
    assert_eq!(names, vec!["Gender", "Age", "Sleep"]);
    assert_eq!(pipeline.schema().len(), ds.columns().len() - 2);
    assert_eq!(table.matrix.dim(), (12, 3));
    assert_eq!(table.n_rows(), 12);
}

#[test]
fn test_kind_detection() {
    let (pipeline, _) = fit(&small_dataset(12), &DatasetColumns::default()).unwrap();
    let kinds: Vec<FeatureKind> = pipeline.schema().features().iter().map(|f| f.kind).collect();

    // Age has 12 distinct values, above the categorical threshold
    assert_eq!(
        kinds,
        vec![FeatureKind::Categorical, FeatureKind::Numeric, FeatureKind::Categorical]
    );
}

#[test]
fn test_missing_categorical_filled_with_mode() {
    let (_, table) = fit(&small_dataset(12), &DatasetColumns::default()).unwrap();
    let sleep = table.columns.iter().find(|c| c.name == "Sleep").unwrap();

    // rows 0,6,9 are Short (row 3 missing); the rest Long
    assert_eq!(sleep.raw[3], Value::Text("Long".to_string()));
    assert!(sleep.raw.iter().all(|v| !v.is_missing()));
}

#[test]
fn test_all_missing_column_becomes_unknown() {
    let columns = vec!["x".to_string(), "Depression".to_string()];
    let rows = (0..10)
        .map(|i| vec![Value::Missing, Value::Number((i % 2) as f64)])
        .collect();
    let ds = Dataset::new(columns, rows).unwrap();

    let (pipeline, table) = fit(&ds, &DatasetColumns::default()).unwrap();
    assert_eq!(table.columns[0].raw[0], Value::Text(UNKNOWN_CATEGORY.to_string()));
    assert_eq!(pipeline.encoder("x").unwrap().classes(), &[UNKNOWN_CATEGORY.to_string()]);
}

#[test]
fn test_missing_numeric_filled_with_median() {
    let columns = vec!["score".to_string(), "Depression".to_string()];
    let rows = (0..12)
        .map(|i| {
            let score = if i == 0 { Value::Missing } else { Value::Number(i as f64 * 10.0) };
            vec![score, Value::Number((i % 2) as f64)]
        })
        .collect();
    let ds = Dataset::new(columns, rows).unwrap();

    let (_, table) = fit(&ds, &DatasetColumns::default()).unwrap();
    // values 10..=110 → median 60
    assert_eq!(table.columns[0].raw[0], Value::Number(60.0));
}

#[test]
fn test_too_few_rows() {
    let result = fit(&small_dataset(9), &DatasetColumns::default());
    assert!(matches!(result, Err(PipelineError::InsufficientData(_))));
}

#[test]
fn test_single_class_rejected() {
    let columns = vec!["x".to_string(), "Depression".to_string()];
    let rows = (0..20)
        .map(|i| vec![Value::Number(i as f64), Value::Number(1.0)])
        .collect();
    let ds = Dataset::new(columns, rows).unwrap();

    assert!(matches!(
        fit(&ds, &DatasetColumns::default()),
        Err(PipelineError::InsufficientData(_))
    ));
}

#[test]
fn test_missing_label_column() {
    let columns = DatasetColumns {
        label: "Outcome".to_string(),
        id: None,
    };
    assert!(matches!(
        fit(&small_dataset(12), &columns),
        Err(PipelineError::InsufficientData(_))
    ));
}

#[test]
fn test_text_labels() {
    assert_eq!(parse_label(&Value::parse("Yes")), Some(1));
    assert_eq!(parse_label(&Value::parse("no")), Some(0));
    assert_eq!(parse_label(&Value::Number(0.0)), Some(0));
    assert_eq!(parse_label(&Value::Number(1.0)), Some(1));
    assert_eq!(parse_label(&Value::parse("maybe")), None);
    assert_eq!(parse_label(&Value::Missing), None);
}

fn labeled_dataset(rows: usize, label: impl Fn(usize) -> Value) -> Dataset {
    let columns = vec!["Gender".to_string(), "Depression".to_string()];
    let data = (0..rows)
        .map(|i| {
            vec![
                Value::parse(if i % 3 == 0 { "Male" } else { "Female" }),
                label(i),
            ]
        })
        .collect();
    Dataset::new(columns, data).unwrap()
}

#[test]
fn test_unlabeled_records_dropped() {
    let ds = labeled_dataset(20, |i| {
        if i == 7 {
            Value::Missing
        } else {
            Value::Number((i % 2) as f64)
        }
    });
    let (pipeline, table) = fit(&ds, &DatasetColumns::default()).unwrap();

    assert_eq!(table.n_rows(), 19);
    assert_eq!(table.matrix.nrows(), 19);
    assert_eq!(table.columns[0].raw.len(), 19);
    // row 7 (Female) is gone, row 8 (Female) moved up
    assert_eq!(table.columns[0].raw[7], Value::parse("Female"));
    assert_eq!(pipeline.schema().len(), 1);
}

#[test]
fn test_row_guard_counts_labeled_records_only() {
    let ds = labeled_dataset(12, |i| {
        if i < 3 {
            Value::Missing
        } else {
            Value::Number((i % 2) as f64)
        }
    });
    assert!(matches!(
        fit(&ds, &DatasetColumns::default()),
        Err(PipelineError::InsufficientData(_))
    ));
}

#[test]
fn test_unparseable_label_still_rejected() {
    let ds = labeled_dataset(20, |i| {
        if i == 4 {
            Value::parse("maybe")
        } else {
            Value::Number((i % 2) as f64)
        }
    });
    assert!(matches!(
        fit(&ds, &DatasetColumns::default()),
        Err(PipelineError::InsufficientData(_))
    ));
}

#[test]
fn test_transform_fills_missing_fields() {
    let (pipeline, _) = synthetic_fit();
    let mut record = Record::new();
    record.insert("Gender".to_string(), Value::parse("Female"));

    let (vector, report) = pipeline.transform(&record);

    assert_eq!(vector.len(), pipeline.schema().len());
    assert!(vector.is_compatible(pipeline.schema()));
    assert_eq!(report.defaulted.len(), pipeline.schema().len() - 1);
    assert!(vector.as_slice().iter().all(|x| x.is_finite()));
}

#[test]
fn test_transform_unseen_category_uses_fallback() {
    let (pipeline, _) = synthetic_fit();
    let mut record = Record::new();
    record.insert("City".to_string(), Value::parse("Atlantis"));

    let (first, report) = pipeline.transform(&record);
    let (second, _) = pipeline.transform(&record);

    let city = first.get_by_name(pipeline.schema(), "City").unwrap();
    assert_eq!(city, pipeline.encoder("City").unwrap().fallback_code() as f64);
    assert_eq!(report.unseen_categories, vec![("City".to_string(), "Atlantis".to_string())]);
    assert_eq!(first, second);
}

#[test]
fn test_transform_matches_categories_ignoring_case() {
    let (pipeline, _) = synthetic_fit();
    let mut exact = Record::new();
    exact.insert("Profession".to_string(), Value::parse("Student"));
    let mut lower = Record::new();
    lower.insert("Profession".to_string(), Value::parse("student"));

    let (a, _) = pipeline.transform(&exact);
    let (b, report) = pipeline.transform(&lower);

    assert_eq!(a, b);
    assert!(report.unseen_categories.is_empty());

    pipeline.match_categories(&mut lower);
    assert_eq!(lower["Profession"], Value::parse("Student"));
}

#[test]
fn test_transform_coerces_bad_numbers() {
    let (pipeline, _) = synthetic_fit();
    let mut record = Record::new();
    record.insert("Age".to_string(), Value::parse("twenty"));
    record.insert("Unrelated".to_string(), Value::Number(1.0));

    let (vector, report) = pipeline.transform(&record);
    let params = pipeline.scaler().params("Age").unwrap();

    assert_eq!(report.coerced, vec!["Age".to_string()]);
    assert_eq!(vector.get_by_name(pipeline.schema(), "Age"), Some(params.apply(0.0)));
    assert_eq!(vector.len(), pipeline.schema().len());
}

#[test]
fn test_transform_is_idempotent() {
    let (pipeline, _) = synthetic_fit();
    let ds = synthetic::dataset().unwrap();
    let record = ds.record(4).unwrap();

    let (a, report) = pipeline.transform(&record);
    let (b, _) = pipeline.transform(&record);

    assert_eq!(a, b);
    assert!(report.is_clean());
}

#[test]
fn test_report_warnings() {
    let report = TransformReport {
        defaulted: vec!["Age".to_string()],
        unseen_categories: vec![("City".to_string(), "X".to_string())],
        coerced: vec![],
    };
    assert_eq!(report.warnings().len(), 2);
    assert!(!report.is_clean());
}
