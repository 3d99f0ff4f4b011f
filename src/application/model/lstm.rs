//! LSTM layer with back propagation through time.
//!
//! Gate pre-activations are packed as `[input, forget, candidate, output]`
//! blocks of `units` rows each:
//!
//! ```text
//! z = W_x·x_t + W_h·h_{t-1} + b
//! i = σ(z_i)   f = σ(z_f)   g = tanh(z_g)   o = σ(z_o)
//! c_t = f ⊙ c_{t-1} + i ⊙ g
//! h_t = o ⊙ tanh(c_t)
//! ```

use super::math::{glorot_uniform, outer, sigmoid};
use ndarray::{Array1, Array2, ArrayView2, s};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmLayer {
    input_size: usize,
    units: usize,
    /// `[4 * units, input_size]`
    pub(crate) w_x: Array2<f64>,
    /// `[4 * units, units]`
    pub(crate) w_h: Array2<f64>,
    /// `[4 * units]`
    pub(crate) bias: Array1<f64>,
}

/// Per-timestep activations kept for the backward pass
#[derive(Debug, Clone)]
struct StepCache {
    x: Array1<f64>,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    i: Array1<f64>,
    f: Array1<f64>,
    g: Array1<f64>,
    o: Array1<f64>,
    tanh_c: Array1<f64>,
}

#[derive(Debug, Clone)]
pub struct LstmCache {
    steps: Vec<StepCache>,
}

#[derive(Debug, Clone)]
pub struct LstmGradients {
    pub w_x: Array2<f64>,
    pub w_h: Array2<f64>,
    pub bias: Array1<f64>,
}

impl LstmLayer {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, input_size: usize, units: usize) -> Self {
        let mut bias = Array1::zeros(4 * units);
        bias.slice_mut(s![units..2 * units]).fill(1.0);

        Self {
            input_size,
            units,
            w_x: glorot_uniform(rng, 4 * units, input_size),
            w_h: glorot_uniform(rng, 4 * units, units),
            bias,
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn parameter_count(&self) -> usize {
        self.w_x.len() + self.w_h.len() + self.bias.len()
    }

    /// Runs the layer over `[timesteps, input_size]` and returns every hidden
    /// state as `[timesteps, units]`.
    pub fn forward(&self, inputs: ArrayView2<'_, f64>) -> (Array2<f64>, LstmCache) {
        let n = self.units;
        let timesteps = inputs.nrows();
        let mut hidden = Array2::zeros((timesteps, n));
        let mut steps = Vec::with_capacity(timesteps);

        let mut h = Array1::<f64>::zeros(n);
        let mut c = Array1::<f64>::zeros(n);

        for t in 0..timesteps {
            let x = inputs.row(t).to_owned();
            let z = self.w_x.dot(&x) + &self.w_h.dot(&h) + &self.bias;

            let i = z.slice(s![0..n]).mapv(sigmoid);
            let f = z.slice(s![n..2 * n]).mapv(sigmoid);
            let g = z.slice(s![2 * n..3 * n]).mapv(f64::tanh);
            let o = z.slice(s![3 * n..4 * n]).mapv(sigmoid);

            let c_next = &f * &c + &(&i * &g);
            let tanh_c = c_next.mapv(f64::tanh);
            let h_next = &o * &tanh_c;

            hidden.row_mut(t).assign(&h_next);
            steps.push(StepCache {
                x,
                h_prev: h,
                c_prev: c,
                i,
                f,
                g,
                o,
                tanh_c,
            });

            h = h_next;
            c = c_next;
        }

        (hidden, LstmCache { steps })
    }

    /// Back propagation through time.
    ///
    /// `d_hidden` is the loss gradient w.r.t. every returned hidden state
    /// (`[timesteps, units]`, zero rows where a state was not used). Returns the
    /// gradient w.r.t. the inputs and the parameter gradients.
    pub fn backward(
        &self,
        cache: &LstmCache,
        d_hidden: ArrayView2<'_, f64>,
    ) -> (Array2<f64>, LstmGradients) {
        let n = self.units;
        let timesteps = cache.steps.len();

        let mut grads = LstmGradients {
            w_x: Array2::zeros(self.w_x.raw_dim()),
            w_h: Array2::zeros(self.w_h.raw_dim()),
            bias: Array1::zeros(self.bias.raw_dim()),
        };
        let mut d_inputs = Array2::zeros((timesteps, self.input_size));

        let mut dh_next = Array1::<f64>::zeros(n);
        let mut dc_next = Array1::<f64>::zeros(n);

        for t in (0..timesteps).rev() {
            let step = &cache.steps[t];
            let dh = &d_hidden.row(t) + &dh_next;

            let d_o = &dh * &step.tanh_c;
            let dc = &dc_next + &(&dh * &step.o * &step.tanh_c.mapv(|v| 1.0 - v * v));
            let d_i = &dc * &step.g;
            let d_g = &dc * &step.i;
            let d_f = &dc * &step.c_prev;
            dc_next = &dc * &step.f;

            let mut dz = Array1::<f64>::zeros(4 * n);
            dz.slice_mut(s![0..n])
                .assign(&(&d_i * &step.i.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![n..2 * n])
                .assign(&(&d_f * &step.f.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![2 * n..3 * n])
                .assign(&(&d_g * &step.g.mapv(|v| 1.0 - v * v)));
            dz.slice_mut(s![3 * n..4 * n])
                .assign(&(&d_o * &step.o.mapv(|v| v * (1.0 - v))));

            grads.w_x += &outer(dz.view(), step.x.view());
            grads.w_h += &outer(dz.view(), step.h_prev.view());
            grads.bias += &dz;

            d_inputs.row_mut(t).assign(&self.w_x.t().dot(&dz));
            dh_next = self.w_h.t().dot(&dz);
        }

        (d_inputs, grads)
    }
}
