//! Stacked LSTM → dense → softmax sequence classifier.

use super::config::ModelConfig;
use super::dense::{Activation, DenseCache, DenseLayer, dropout_mask};
use super::loss::{categorical_cross_entropy, softmax_cross_entropy_grad};
use super::lstm::{LstmCache, LstmLayer};
use super::math::softmax;
use crate::domain::errors::ModelError;
use crate::domain::ports::TrendClassifier;
use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayView2, ArrayViewMutD};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceClassifier {
    config: ModelConfig,
    input_features: usize,
    recurrent: Vec<LstmLayer>,
    hidden: Vec<DenseLayer>,
    output: DenseLayer,
}

/// Activations of one sample, consumed by [`SequenceClassifier::backward`].
#[derive(Debug, Clone)]
pub struct ForwardPass {
    lstm_caches: Vec<LstmCache>,
    dropout_masks: Vec<Option<Array2<f64>>>,
    timesteps: usize,
    hidden_caches: Vec<DenseCache>,
    output_cache: DenseCache,
    pub probabilities: Array1<f64>,
}

impl SequenceClassifier {
    pub fn new(
        config: ModelConfig,
        input_features: usize,
        num_classes: usize,
        seed: u64,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        if input_features == 0 || num_classes == 0 {
            return Err(ModelError::InvalidConfig {
                reason: format!(
                    "input features ({}) and classes ({}) must be positive",
                    input_features, num_classes
                ),
            });
        }

        let mut rng = StdRng::seed_from_u64(seed);

        let mut recurrent = Vec::with_capacity(config.lstm_units.len());
        let mut width = input_features;
        for &units in &config.lstm_units {
            recurrent.push(LstmLayer::new(&mut rng, width, units));
            width = units;
        }

        let mut hidden = Vec::with_capacity(config.dense_units.len());
        for &units in &config.dense_units {
            hidden.push(DenseLayer::new(&mut rng, width, units, Activation::Relu));
            width = units;
        }

        let output = DenseLayer::new(&mut rng, width, num_classes, Activation::Linear);

        Ok(Self {
            config,
            input_features,
            recurrent,
            hidden,
            output,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn input_features(&self) -> usize {
        self.input_features
    }

    pub fn parameter_count(&self) -> usize {
        self.recurrent
            .iter()
            .map(LstmLayer::parameter_count)
            .chain(self.hidden.iter().map(DenseLayer::parameter_count))
            .sum::<usize>()
            + self.output.parameter_count()
    }

    /// Layer table in the spirit of a Keras `model.summary()`
    pub fn summary(&self, timesteps: usize) -> String {
        let mut out = String::new();
        let rule = "─".repeat(62);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{:<26}{:<24}{:>12}", "Layer (type)", "Output Shape", "Param #");
        let _ = writeln!(out, "{}", rule);

        let last = self.recurrent.len() - 1;
        for (i, layer) in self.recurrent.iter().enumerate() {
            let shape = if i == last {
                format!("(None, {})", layer.units())
            } else {
                format!("(None, {}, {})", timesteps, layer.units())
            };
            let _ = writeln!(
                out,
                "{:<26}{:<24}{:>12}",
                format!("lstm_{} (LSTM)", i + 1),
                shape,
                layer.parameter_count()
            );
            if self.config.dropout > 0.0 {
                let _ = writeln!(out, "{:<26}{:<24}{:>12}", format!("dropout_{} (Dropout)", i + 1), shape, 0);
            }
        }

        for (i, layer) in self.hidden.iter().chain(std::iter::once(&self.output)).enumerate() {
            let _ = writeln!(
                out,
                "{:<26}{:<24}{:>12}",
                format!("dense_{} (Dense)", i + 1),
                format!("(None, {})", layer.output_size()),
                layer.parameter_count()
            );
        }

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Total params: {}", self.parameter_count());
        out
    }

    /// Structural check for models that did not come through [`SequenceClassifier::new`],
    /// i.e. deserialized ones.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mismatch = |context: &'static str, expected: usize, actual: usize| {
            Err(ModelError::ShapeMismatch {
                context,
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        };

        if self.recurrent.is_empty() {
            return Err(ModelError::InvalidConfig {
                reason: "model has no LSTM layers".to_string(),
            });
        }

        let mut width = self.input_features;
        for layer in &self.recurrent {
            if layer.input_size() != width
                || layer.w_x.shape() != [4 * layer.units(), width]
                || layer.w_h.shape() != [4 * layer.units(), layer.units()]
                || layer.bias.len() != 4 * layer.units()
            {
                return mismatch("LSTM layer input width", width, layer.input_size());
            }
            width = layer.units();
        }
        for layer in self.hidden.iter().chain(std::iter::once(&self.output)) {
            if layer.input_size() != width || layer.bias.len() != layer.output_size() {
                return mismatch("dense layer input width", width, layer.input_size());
            }
            width = layer.output_size();
        }
        Ok(())
    }

    fn check_window(&self, window: ArrayView2<'_, f64>) -> Result<(), ModelError> {
        if window.nrows() == 0 || window.ncols() != self.input_features {
            return Err(ModelError::ShapeMismatch {
                context: "model input",
                expected: format!("[timesteps >= 1, {}]", self.input_features),
                actual: format!("{:?}", window.shape()),
            });
        }
        Ok(())
    }

    /// Forward pass over one `[timesteps, features]` window.
    ///
    /// Dropout is active only when an RNG is supplied. The window shape must
    /// already be valid (see [`TrendClassifier::predict_proba`] for the checked path).
    pub fn forward_pass(
        &self,
        window: ArrayView2<'_, f64>,
        mut rng: Option<&mut StdRng>,
    ) -> ForwardPass {
        let mut sequence = window.to_owned();
        let mut lstm_caches = Vec::with_capacity(self.recurrent.len());
        let mut dropout_masks = Vec::with_capacity(self.recurrent.len());

        for layer in &self.recurrent {
            let (mut hidden, cache) = layer.forward(sequence.view());
            let mask = match rng.as_deref_mut() {
                Some(rng) if self.config.dropout > 0.0 => {
                    let mask = dropout_mask(rng, hidden.dim(), self.config.dropout);
                    hidden *= &mask;
                    Some(mask)
                }
                _ => None,
            };
            lstm_caches.push(cache);
            dropout_masks.push(mask);
            sequence = hidden;
        }

        let timesteps = sequence.nrows();
        let mut features = sequence.row(timesteps - 1).to_owned();

        let mut hidden_caches = Vec::with_capacity(self.hidden.len());
        for layer in &self.hidden {
            let (activated, cache) = layer.forward(features.view());
            hidden_caches.push(cache);
            features = activated;
        }

        let (logits, output_cache) = self.output.forward(features.view());
        let probabilities = softmax(&logits);

        ForwardPass {
            lstm_caches,
            dropout_masks,
            timesteps,
            hidden_caches,
            output_cache,
            probabilities,
        }
    }

    pub fn loss(&self, pass: &ForwardPass, target: ArrayView1<'_, f64>) -> f64 {
        categorical_cross_entropy(pass.probabilities.view(), target)
    }

    /// Parameter gradients of the cross entropy for one sample, in the order of
    /// [`SequenceClassifier::parameters_mut`].
    pub fn backward(&self, pass: &ForwardPass, target: ArrayView1<'_, f64>) -> Vec<ArrayD<f64>> {
        let d_logits = softmax_cross_entropy_grad(pass.probabilities.view(), target);
        let (mut d_features, output_grads) = self.output.backward(&pass.output_cache, d_logits.view());

        let mut hidden_grads = Vec::with_capacity(self.hidden.len());
        for (layer, cache) in self.hidden.iter().zip(&pass.hidden_caches).rev() {
            let (d_input, grads) = layer.backward(cache, d_features.view());
            hidden_grads.push(grads);
            d_features = d_input;
        }
        hidden_grads.reverse();

        // only the last timestep of the top LSTM feeds the dense stack
        let mut d_sequence = Array2::zeros((pass.timesteps, d_features.len()));
        d_sequence.row_mut(pass.timesteps - 1).assign(&d_features);

        let mut lstm_grads = Vec::with_capacity(self.recurrent.len());
        for ((layer, cache), mask) in self
            .recurrent
            .iter()
            .zip(&pass.lstm_caches)
            .zip(&pass.dropout_masks)
            .rev()
        {
            if let Some(mask) = mask {
                d_sequence *= mask;
            }
            let (d_input, grads) = layer.backward(cache, d_sequence.view());
            lstm_grads.push(grads);
            d_sequence = d_input;
        }
        lstm_grads.reverse();

        let mut flat = Vec::with_capacity(3 * lstm_grads.len() + 2 * hidden_grads.len() + 2);
        for grads in lstm_grads {
            flat.push(grads.w_x.into_dyn());
            flat.push(grads.w_h.into_dyn());
            flat.push(grads.bias.into_dyn());
        }
        for grads in hidden_grads {
            flat.push(grads.weights.into_dyn());
            flat.push(grads.bias.into_dyn());
        }
        flat.push(output_grads.weights.into_dyn());
        flat.push(output_grads.bias.into_dyn());
        flat
    }

    /// Mutable views of every trainable tensor
    pub fn parameters_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        let mut params = Vec::new();
        for layer in self.recurrent.iter_mut() {
            params.push(layer.w_x.view_mut().into_dyn());
            params.push(layer.w_h.view_mut().into_dyn());
            params.push(layer.bias.view_mut().into_dyn());
        }
        for layer in self.hidden.iter_mut() {
            params.push(layer.weights.view_mut().into_dyn());
            params.push(layer.bias.view_mut().into_dyn());
        }
        params.push(self.output.weights.view_mut().into_dyn());
        params.push(self.output.bias.view_mut().into_dyn());
        params
    }
}

impl TrendClassifier for SequenceClassifier {
    fn predict_proba(&self, window: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        self.check_window(window)?;
        Ok(self.forward_pass(window, None).probabilities)
    }

    fn num_classes(&self) -> usize {
        self.output.output_size()
    }

    fn name(&self) -> &str {
        "LSTM sequence classifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small_model(dropout: f64) -> SequenceClassifier {
        let config = ModelConfig::default()
            .with_lstm_units(vec![4, 3])
            .with_dense_units(vec![5])
            .with_dropout(dropout);
        SequenceClassifier::new(config, 1, 3, 17).unwrap()
    }

    fn sample_loss(model: &SequenceClassifier, x: &Array2<f64>, target: &Array1<f64>) -> f64 {
        let pass = model.forward_pass(x.view(), None);
        model.loss(&pass, target.view())
    }

    fn nudge(model: &mut SequenceClassifier, tensor: usize, element: usize, delta: f64) {
        let mut params = model.parameters_mut();
        if let Some(value) = params[tensor].iter_mut().nth(element) {
            *value += delta;
        }
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = small_model(0.2);
        let probs = model.predict_proba(array![[0.1], [0.5], [0.9]].view()).unwrap();
        assert_eq!(probs.len(), 3);
        assert!((probs.sum() - 1.0).abs() < 1e-9);
        assert!(probs.iter().all(|&p| p > 0.0));
    }

    #[test]
    fn test_rejects_wrong_feature_count() {
        let model = small_model(0.0);
        let result = model.predict_proba(array![[0.1, 0.2], [0.3, 0.4]].view());
        assert!(matches!(result, Err(ModelError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_same_seed_same_weights() {
        assert_eq!(small_model(0.0), small_model(0.0));
    }

    #[test]
    fn test_gradient_layout_matches_parameters() {
        let mut model = small_model(0.0);
        let pass = model.forward_pass(array![[0.3], [0.6]].view(), None);
        let grads = model.backward(&pass, array![0.0, 1.0, 0.0].view());
        let params = model.parameters_mut();

        assert_eq!(grads.len(), params.len());
        for (g, p) in grads.iter().zip(params.iter()) {
            assert_eq!(g.shape(), p.shape());
        }
    }

    #[test]
    fn test_backward_matches_finite_differences() {
        let mut model = small_model(0.0);
        let x = array![[0.1], [0.8], [0.35], [0.6]];
        let target = array![0.0, 0.0, 1.0];

        let pass = model.forward_pass(x.view(), None);
        let grads = model.backward(&pass, target.view());

        let eps = 1e-6;
        // (tensor, element) samples across every layer kind
        let checks = [
            (0, 3),
            (1, 10),
            (2, 5),
            (3, 7),
            (4, 20),
            (5, 2),
            (6, 4),
            (7, 1),
            (8, 9),
            (9, 2),
        ];
        for &(tensor, element) in &checks {
            nudge(&mut model, tensor, element, eps);
            let plus = sample_loss(&model, &x, &target);
            nudge(&mut model, tensor, element, -2.0 * eps);
            let minus = sample_loss(&model, &x, &target);
            nudge(&mut model, tensor, element, eps);

            let numeric = (plus - minus) / (2.0 * eps);
            let analytic = grads[tensor].iter().nth(element).copied().unwrap_or(f64::NAN);
            assert!(
                (analytic - numeric).abs() < 1e-5 * (1.0 + numeric.abs()),
                "tensor {} element {}: analytic {} vs numeric {}",
                tensor,
                element,
                analytic,
                numeric
            );
        }
    }

    #[test]
    fn test_dropout_only_with_rng() {
        let model = small_model(0.5);
        let x = array![[0.2], [0.4], [0.6]];

        let eval_a = model.forward_pass(x.view(), None).probabilities;
        let eval_b = model.forward_pass(x.view(), None).probabilities;
        assert_eq!(eval_a, eval_b);

        let mut rng = StdRng::seed_from_u64(1);
        let pass = model.forward_pass(x.view(), Some(&mut rng));
        assert!(pass.dropout_masks.iter().all(Option::is_some));
    }

    #[test]
    fn test_validate_detects_broken_structure() {
        let model = small_model(0.0);
        assert!(model.validate().is_ok());

        let mut no_lstm = model.clone();
        no_lstm.recurrent.clear();
        assert!(no_lstm.validate().is_err());

        let mut wrong_width = model.clone();
        wrong_width.input_features = 2;
        assert!(wrong_width.validate().is_err());
    }

    #[test]
    fn test_summary_lists_parameters() {
        let model = SequenceClassifier::new(ModelConfig::default(), 1, 3, 0).unwrap();
        let summary = model.summary(3);
        assert!(summary.contains("lstm_1 (LSTM)"));
        assert!(summary.contains("16896"));
        assert!(summary.contains(&format!("Total params: {}", model.parameter_count())));
    }
}
