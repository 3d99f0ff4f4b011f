use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::Rng;

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Numerically stable softmax
pub(crate) fn softmax(logits: &Array1<f64>) -> Array1<f64> {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

/// `a ⊗ b` as a `[a.len(), b.len()]` matrix
pub(crate) fn outer(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> Array2<f64> {
    let column = a.insert_axis(Axis(1));
    let row = b.insert_axis(Axis(0));
    column.dot(&row)
}

/// Glorot/Xavier uniform initialization for a `[fan_out, fan_in]` kernel
pub(crate) fn glorot_uniform<R: Rng + ?Sized>(
    rng: &mut R,
    fan_out: usize,
    fan_in: usize,
) -> Array2<f64> {
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
    Array2::from_shape_fn((fan_out, fan_in), |_| rng.random_range(-limit..limit))
}

pub(crate) fn argmax(values: ArrayView1<'_, f64>) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, best_value), (i, &v)| {
            if v > best_value { (i, v) } else { (best, best_value) }
        })
        .0
}
