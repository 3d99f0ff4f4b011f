//! Adam optimizer over a flat list of parameter tensors.

use ndarray::{ArrayD, ArrayViewMutD, Zip};

const BETA_1: f64 = 0.9;
const BETA_2: f64 = 0.999;
const EPSILON: f64 = 1e-7;

#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    step: i32,
    first_moment: Vec<ArrayD<f64>>,
    second_moment: Vec<ArrayD<f64>>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            step: 0,
            first_moment: Vec::new(),
            second_moment: Vec::new(),
        }
    }

    /// Applies one update. `params` and `grads` must list tensors in the same
    /// order on every call.
    pub fn step(&mut self, params: Vec<ArrayViewMutD<'_, f64>>, grads: &[ArrayD<f64>]) {
        debug_assert_eq!(params.len(), grads.len());

        if self.first_moment.is_empty() {
            self.first_moment = grads.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
            self.second_moment = grads.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
        }

        self.step += 1;
        let bias_correction =
            (1.0 - BETA_2.powi(self.step)).sqrt() / (1.0 - BETA_1.powi(self.step));
        let lr_t = self.learning_rate * bias_correction;

        for (((mut param, grad), m), v) in params
            .into_iter()
            .zip(grads)
            .zip(self.first_moment.iter_mut())
            .zip(self.second_moment.iter_mut())
        {
            Zip::from(&mut param)
                .and(m)
                .and(v)
                .and(grad)
                .for_each(|p, m, v, &g| {
                    *m = BETA_1 * *m + (1.0 - BETA_1) * g;
                    *v = BETA_2 * *v + (1.0 - BETA_2) * g * g;
                    *p -= lr_t * *m / (v.sqrt() + EPSILON);
                });
        }
    }
}

/// Rescales gradients in place so their global L2 norm is at most `max_norm`.
/// Returns the norm before clipping.
pub fn clip_by_global_norm(grads: &mut [ArrayD<f64>], max_norm: f64) -> f64 {
    let norm = grads
        .iter()
        .map(|g| g.iter().map(|v| v * v).sum::<f64>())
        .sum::<f64>()
        .sqrt();
    if norm > max_norm && norm > 0.0 {
        let scale = max_norm / norm;
        for g in grads.iter_mut() {
            g.mapv_inplace(|v| v * scale);
        }
    }
    norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, array};

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        let mut weights = array![1.0, -1.0];
        let grads = vec![array![0.5, -2.0].into_dyn()];
        let mut adam = Adam::new(0.1);

        adam.step(vec![weights.view_mut().into_dyn()], &grads);

        // bias-corrected first step is lr * sign(g)
        assert!((weights[0] - 0.9).abs() < 1e-6);
        assert!((weights[1] + 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_minimises_quadratic() {
        let mut x = Array1::from_elem(1, 5.0);
        let mut adam = Adam::new(0.1);
        for _ in 0..500 {
            let grads = vec![x.mapv(|v| 2.0 * v).into_dyn()];
            adam.step(vec![x.view_mut().into_dyn()], &grads);
        }
        assert!(x[0].abs() < 0.1);
    }

    #[test]
    fn test_clip_by_global_norm() {
        let mut grads = vec![array![3.0].into_dyn(), array![4.0].into_dyn()];
        let norm = clip_by_global_norm(&mut grads, 1.0);
        assert!((norm - 5.0).abs() < 1e-12);
        assert!((grads[0].sum() - 0.6).abs() < 1e-12);
        assert!((grads[1].sum() - 0.8).abs() < 1e-12);
    }
}
