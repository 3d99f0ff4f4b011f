//! Mini-batch training loop for the sequence classifier.

use crate::application::model::math::argmax;
use crate::application::model::optimizer::clip_by_global_norm;
use crate::application::model::{Adam, SequenceClassifier};
use crate::domain::errors::ModelError;
use crate::domain::ports::TrendClassifier;
use ndarray::{ArrayD, ArrayView2, ArrayView3, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub epochs: usize,
    pub batch_size: usize,
    pub seed: u64,
    pub shuffle: bool,
    /// Trailing fraction of samples held out for validation, taken before shuffling
    pub validation_split: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            epochs: 100,
            batch_size: 1,
            seed: 42,
            shuffle: true,
            validation_split: 0.0,
        }
    }
}

impl TrainingParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |reason: String| Err(ModelError::InvalidTraining { reason });
        if self.epochs == 0 {
            return invalid("epochs must be at least 1".to_string());
        }
        if self.batch_size == 0 {
            return invalid("batch size must be at least 1".to_string());
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return invalid(format!(
                "validation split {} must be in [0, 1)",
                self.validation_split
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
    pub val_loss: Option<f64>,
    pub val_accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_samples: usize,
    pub validation_samples: usize,
    pub epochs: Vec<EpochMetrics>,
}

impl TrainingReport {
    pub fn final_metrics(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }
}

pub struct Trainer {
    params: TrainingParams,
}

impl Trainer {
    pub fn new(params: TrainingParams) -> Result<Self, ModelError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Fits `model` on `inputs` (`[samples, timesteps, features]`) against
    /// one-hot `targets` (`[samples, classes]`).
    pub fn fit(
        &self,
        model: &mut SequenceClassifier,
        inputs: ArrayView3<'_, f64>,
        targets: ArrayView2<'_, f64>,
    ) -> Result<TrainingReport, ModelError> {
        let samples = inputs.len_of(Axis(0));
        if samples == 0 || samples != targets.nrows() {
            return Err(ModelError::ShapeMismatch {
                context: "training samples",
                expected: format!("{} target rows", samples),
                actual: targets.nrows().to_string(),
            });
        }
        if targets.ncols() != model.num_classes() {
            return Err(ModelError::ShapeMismatch {
                context: "target classes",
                expected: model.num_classes().to_string(),
                actual: targets.ncols().to_string(),
            });
        }
        if inputs.len_of(Axis(2)) != model.input_features() {
            return Err(ModelError::ShapeMismatch {
                context: "input features",
                expected: model.input_features().to_string(),
                actual: inputs.len_of(Axis(2)).to_string(),
            });
        }

        let validation_samples = (samples as f64 * self.params.validation_split).floor() as usize;
        let train_samples = samples - validation_samples;
        if train_samples == 0 {
            return Err(ModelError::InvalidTraining {
                reason: format!(
                    "validation split {} leaves no training samples",
                    self.params.validation_split
                ),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut optimizer = Adam::new(model.config().learning_rate);
        let gradient_clip = model.config().gradient_clip;
        let mut indices: Vec<usize> = (0..train_samples).collect();
        let validation: Vec<usize> = (train_samples..samples).collect();
        let mut history = Vec::with_capacity(self.params.epochs);

        info!(
            "Training on {} samples, validating on {} ({} epochs, batch size {})",
            train_samples, validation_samples, self.params.epochs, self.params.batch_size
        );

        for epoch in 1..=self.params.epochs {
            if self.params.shuffle {
                indices.shuffle(&mut rng);
            }

            let mut loss_sum = 0.0;
            let mut correct = 0usize;

            for batch in indices.chunks(self.params.batch_size) {
                let mut accumulated: Option<Vec<ArrayD<f64>>> = None;

                for &i in batch {
                    let target = targets.row(i);
                    let pass = model.forward_pass(inputs.index_axis(Axis(0), i), Some(&mut rng));
                    loss_sum += model.loss(&pass, target);
                    if argmax(pass.probabilities.view()) == argmax(target) {
                        correct += 1;
                    }

                    let grads = model.backward(&pass, target);
                    match accumulated.as_mut() {
                        Some(total) => {
                            for (sum, g) in total.iter_mut().zip(&grads) {
                                *sum += g;
                            }
                        }
                        None => accumulated = Some(grads),
                    }
                }

                if let Some(mut grads) = accumulated {
                    let scale = 1.0 / batch.len() as f64;
                    for g in grads.iter_mut() {
                        g.mapv_inplace(|v| v * scale);
                    }
                    if let Some(max_norm) = gradient_clip {
                        let norm = clip_by_global_norm(&mut grads, max_norm);
                        debug!("Gradient norm {:.4} (clip {})", norm, max_norm);
                    }
                    optimizer.step(model.parameters_mut(), &grads);
                }
            }

            let loss = loss_sum / train_samples as f64;
            if !loss.is_finite() {
                return Err(ModelError::InvalidTraining {
                    reason: format!("loss diverged at epoch {}", epoch),
                });
            }
            let accuracy = correct as f64 / train_samples as f64;

            let (val_loss, val_accuracy) = if validation.is_empty() {
                (None, None)
            } else {
                let (l, a) = evaluate(model, inputs, targets, &validation);
                (Some(l), Some(a))
            };

            match (val_loss, val_accuracy) {
                (Some(vl), Some(va)) => info!(
                    "Epoch {}/{} - loss: {:.4} - accuracy: {:.4} - val_loss: {:.4} - val_accuracy: {:.4}",
                    epoch, self.params.epochs, loss, accuracy, vl, va
                ),
                _ => info!(
                    "Epoch {}/{} - loss: {:.4} - accuracy: {:.4}",
                    epoch, self.params.epochs, loss, accuracy
                ),
            }

            history.push(EpochMetrics {
                epoch,
                loss,
                accuracy,
                val_loss,
                val_accuracy,
            });
        }

        Ok(TrainingReport {
            train_samples,
            validation_samples,
            epochs: history,
        })
    }
}

/// Mean loss and accuracy over `indices`, without dropout
pub fn evaluate(
    model: &SequenceClassifier,
    inputs: ArrayView3<'_, f64>,
    targets: ArrayView2<'_, f64>,
    indices: &[usize],
) -> (f64, f64) {
    if indices.is_empty() {
        return (0.0, 0.0);
    }

    let mut loss_sum = 0.0;
    let mut correct = 0usize;
    for &i in indices {
        let target = targets.row(i);
        let pass = model.forward_pass(inputs.index_axis(Axis(0), i), None);
        loss_sum += model.loss(&pass, target);
        if argmax(pass.probabilities.view()) == argmax(target) {
            correct += 1;
        }
    }
    let n = indices.len() as f64;
    (loss_sum / n, correct as f64 / n)
}
