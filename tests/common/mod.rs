#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use trendcast::application::artifact::ArtifactBundle;
use trendcast::application::model::{ModelConfig, SequenceClassifier};
use trendcast::application::preprocessing::PreparedDataset;
use trendcast::application::training::{Trainer, TrainingParams};
use trendcast::domain::series::SeriesPoint;

static COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn temp_dir(prefix: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("trendcast_{}_{}_{}", prefix, std::process::id(), n));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Repeating pattern covering all three labels.
pub fn sample_series(len: usize) -> Vec<SeriesPoint> {
    let cycle = [
        (20.0, "stable"),
        (21.0, "up"),
        (23.0, "up"),
        (22.0, "down"),
        (22.0, "stable"),
        (20.0, "down"),
    ];
    (0..len)
        .map(|i| {
            let (value, trend) = cycle[i % cycle.len()];
            SeriesPoint::new(value, trend)
        })
        .collect()
}

pub fn train_bundle(series: &[SeriesPoint], epochs: usize) -> ArtifactBundle {
    let dataset = PreparedDataset::prepare(series, 3).unwrap();
    let config = ModelConfig::default()
        .with_lstm_units(vec![8, 8])
        .with_dense_units(vec![8])
        .with_learning_rate(0.01);
    let mut model = SequenceClassifier::new(config, 1, dataset.num_classes(), 42).unwrap();
    let trainer = Trainer::new(TrainingParams {
        epochs,
        batch_size: 4,
        ..TrainingParams::default()
    })
    .unwrap();
    let report = trainer
        .fit(&mut model, dataset.inputs.view(), dataset.targets.view())
        .unwrap();
    ArtifactBundle::new(model, &dataset, Some(report))
}
