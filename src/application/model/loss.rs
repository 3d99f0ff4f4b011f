use ndarray::{Array1, ArrayView1};

/// Probabilities are clamped away from 0 before taking the log
const PROBABILITY_FLOOR: f64 = 1e-7;

/// Categorical cross entropy between softmax output and a one-hot target
pub fn categorical_cross_entropy(probs: ArrayView1<'_, f64>, target: ArrayView1<'_, f64>) -> f64 {
    -probs
        .iter()
        .zip(target.iter())
        .map(|(&p, &y)| y * p.clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR).ln())
        .sum::<f64>()
}

/// Gradient of the cross entropy w.r.t. the pre-softmax logits
pub fn softmax_cross_entropy_grad(
    probs: ArrayView1<'_, f64>,
    target: ArrayView1<'_, f64>,
) -> Array1<f64> {
    &probs - &target
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cross_entropy_of_confident_correct_prediction() {
        let loss = categorical_cross_entropy(array![0.98, 0.01, 0.01].view(), array![1.0, 0.0, 0.0].view());
        assert!((loss - (-(0.98f64).ln())).abs() < 1e-12);
    }

    #[test]
    fn test_cross_entropy_is_finite_for_zero_probability() {
        let loss = categorical_cross_entropy(array![0.0, 1.0].view(), array![1.0, 0.0].view());
        assert!(loss.is_finite());
        assert!(loss > 10.0);
    }

    #[test]
    fn test_gradient() {
        let grad = softmax_cross_entropy_grad(array![0.2, 0.5, 0.3].view(), array![0.0, 1.0, 0.0].view());
        assert!((grad[1] + 0.5).abs() < 1e-12);
        assert!((grad.sum()).abs() < 1e-12);
    }
}
