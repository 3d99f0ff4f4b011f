//! Fully connected layers and inverted dropout.

use super::math::{glorot_uniform, outer};
use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Relu,
    /// Identity; the softmax output is applied by the loss
    Linear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// `[outputs, inputs]`
    pub(crate) weights: Array2<f64>,
    pub(crate) bias: Array1<f64>,
    activation: Activation,
}

#[derive(Debug, Clone)]
pub struct DenseCache {
    input: Array1<f64>,
    pre_activation: Array1<f64>,
}

#[derive(Debug, Clone)]
pub struct DenseGradients {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

impl DenseLayer {
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        inputs: usize,
        outputs: usize,
        activation: Activation,
    ) -> Self {
        Self {
            weights: glorot_uniform(rng, outputs, inputs),
            bias: Array1::zeros(outputs),
            activation,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    pub fn forward(&self, input: ArrayView1<'_, f64>) -> (Array1<f64>, DenseCache) {
        let pre_activation = self.weights.dot(&input) + &self.bias;
        let output = match self.activation {
            Activation::Relu => pre_activation.mapv(|v| v.max(0.0)),
            Activation::Linear => pre_activation.clone(),
        };
        let cache = DenseCache {
            input: input.to_owned(),
            pre_activation,
        };
        (output, cache)
    }

    /// Returns the gradient w.r.t. the layer input and the parameter gradients.
    pub fn backward(
        &self,
        cache: &DenseCache,
        d_output: ArrayView1<'_, f64>,
    ) -> (Array1<f64>, DenseGradients) {
        let d_pre = match self.activation {
            Activation::Relu => {
                let mask = cache.pre_activation.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
                &d_output * &mask
            }
            Activation::Linear => d_output.to_owned(),
        };

        let grads = DenseGradients {
            weights: outer(d_pre.view(), cache.input.view()),
            bias: d_pre.clone(),
        };
        let d_input = self.weights.t().dot(&d_pre);
        (d_input, grads)
    }
}

/// Inverted dropout mask: kept units are scaled by `1 / (1 - rate)` so
/// inference needs no rescaling.
pub(crate) fn dropout_mask<R: Rng + ?Sized>(rng: &mut R, shape: (usize, usize), rate: f64) -> Array2<f64> {
    let keep = 1.0 - rate;
    Array2::from_shape_fn(shape, |_| {
        if rng.random::<f64>() < keep {
            1.0 / keep
        } else {
            0.0
        }
    })
}
