use serde_json::Value;
use tempfile::TempDir;

use writing_feature_extractor::export::save_results_to_csv;
use writing_feature_extractor::features::CollectionPolicy;
use writing_feature_extractor::text::TextStatistics;
use writing_feature_extractor::{FeatureDescriptor, FeatureValue, build_feature_set};

#[test]
fn saved_csv_has_one_row_per_unit() {
    let (mut collectors, _) = build_feature_set(&[
        FeatureDescriptor::builtin("PACING", CollectionPolicy::OrdinalIndex),
        FeatureDescriptor::builtin("MOOD", CollectionPolicy::RawLabel),
    ])
    .unwrap();
    collectors[0].push(FeatureValue::Index(1));
    collectors[0].push(FeatureValue::Error);
    collectors[1].push(FeatureValue::Label("sad".into()));
    collectors[1].push(FeatureValue::Error);

    let units = vec![
        "\"Run,\" she said. They ran.".to_string(),
        "Nothing happened for a long while.".to_string(),
    ];
    let metrics: Vec<_> = units.iter().map(|u| TextStatistics::compute(u)).collect();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.csv");
    save_results_to_csv(&path, &collectors, &units, &metrics).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "Unit");
    assert_eq!(&headers[1], "Length");
    assert_eq!(&headers[2], "Pace");
    assert_eq!(&headers[3], "Mood");
    assert_eq!(&headers[headers.len() - 1], "ColorMaps");
    assert_eq!(headers.len(), 2 + 2 + TextStatistics::COLUMNS.len() + 1);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][1], "5");
    assert_eq!(&rows[0][2], "1");
    assert_eq!(&rows[0][3], "sad");
    assert_eq!(&rows[1][0], "2");
    assert_eq!(&rows[1][2], "ERROR");
    assert_eq!(&rows[1][3], "ERROR");

    let colors: Value = serde_json::from_str(&rows[0][rows[0].len() - 1]).unwrap();
    assert!(colors["Pace"].is_object());
    assert_eq!(colors["Mood"]["sad"], "#00008B");
}

#[test]
fn unwritable_path_is_a_file_error() {
    let (collectors, _) = build_feature_set(&[FeatureDescriptor::builtin(
        "PACING",
        CollectionPolicy::OrdinalIndex,
    )])
    .unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("results.csv");

    let err = save_results_to_csv(&path, &collectors, &[], &[]).unwrap_err();
    assert!(err.to_string().contains("results.csv"));
}
