mod common;

use common::{sample_series, temp_dir, train_bundle};
use std::fs;
use trendcast::application::artifact::ARTIFACT_FORMAT_VERSION;
use trendcast::application::inference::InferenceService;
use trendcast::domain::errors::{ArtifactError, InferenceError};
use trendcast::infrastructure::{ArtifactStore, read_series};

#[test]
fn test_csv_to_prediction_flow() {
    let dir = temp_dir("pipeline");
    let csv_path = dir.join("series.csv");
    let mut content = String::from("value,trend\n");
    for point in sample_series(30) {
        content.push_str(&format!("{},{}\n", point.value, point.trend));
    }
    fs::write(&csv_path, content).unwrap();

    let series = read_series(&csv_path).unwrap();
    assert_eq!(series.len(), 30);

    let bundle = train_bundle(&series, 10);
    assert_eq!(bundle.codec.classes(), ["down", "stable", "up"]);
    assert_eq!(bundle.report.as_ref().unwrap().epochs.len(), 10);

    let service = InferenceService::from_bundle(bundle).unwrap();
    let prediction = service.predict(&[20.0, 21.0, 23.0]).unwrap();

    assert!(["down", "stable", "up"].contains(&prediction.predicted_trend.as_str()));
    let total: f64 = prediction.probabilities.values().sum();
    assert!((total - 1.0).abs() < 1e-6);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_saved_artifact_predicts_identically() {
    let dir = temp_dir("roundtrip");
    let store = ArtifactStore::new(dir.join("models").join("trend_classifier.json"));

    let bundle = train_bundle(&sample_series(24), 3);
    let before = InferenceService::from_bundle(bundle.clone()).unwrap();
    store.save(&bundle).unwrap();

    let after = InferenceService::from_bundle(store.load().unwrap()).unwrap();

    for window in [[20.0, 21.0, 23.0], [23.0, 22.0, 22.0], [5.0, 50.0, 0.0]] {
        let a = before.predict(&window).unwrap();
        let b = after.predict(&window).unwrap();
        assert_eq!(a.predicted_trend, b.predicted_trend);
        assert_eq!(a.probabilities, b.probabilities);
    }

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_wrong_window_length_is_rejected() {
    let service = InferenceService::from_bundle(train_bundle(&sample_series(12), 1)).unwrap();

    let result = service.predict(&[20.0, 21.0, 23.0, 24.0]);
    assert!(matches!(
        result,
        Err(InferenceError::WindowLengthMismatch {
            expected: 3,
            actual: 4
        })
    ));
}

#[test]
fn test_missing_and_corrupt_artifacts_fail() {
    let dir = temp_dir("broken");

    let missing = ArtifactStore::new(dir.join("absent.json"));
    assert!(matches!(missing.load(), Err(ArtifactError::NotFound { .. })));

    let truncated_path = dir.join("truncated.json");
    let store = ArtifactStore::new(&truncated_path);
    store.save(&train_bundle(&sample_series(12), 1)).unwrap();
    let full = fs::read_to_string(&truncated_path).unwrap();
    fs::write(&truncated_path, &full[..full.len() / 2]).unwrap();
    assert!(matches!(store.load(), Err(ArtifactError::Corrupt { .. })));

    let future_path = dir.join("future.json");
    let mut value: serde_json::Value = serde_json::from_str(&full).unwrap();
    value["format_version"] = serde_json::json!(ARTIFACT_FORMAT_VERSION + 1);
    fs::write(&future_path, value.to_string()).unwrap();
    assert!(matches!(
        ArtifactStore::new(&future_path).load(),
        Err(ArtifactError::UnsupportedVersion { .. })
    ));

    let _ = fs::remove_dir_all(dir);
}
