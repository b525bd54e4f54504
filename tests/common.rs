/// Shared fixtures for the integration tests.
use ndarray::{Array1, Array2};

/// Single-channel trajectory visiting position `t` at time bin `t`
#[allow(unused)]
pub fn line_trajectory(n: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, 1), |(t, _)| t as f64)
}

#[allow(unused)]
pub fn integer_bins(n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |b| b as f64)
}

#[allow(unused)]
pub fn argmax(values: &Array1<f64>) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0
}

/// Largest value divided by the total, a scale-free measure of how peaked a curve is
#[allow(unused)]
pub fn peak_to_mass(values: &Array1<f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, |m, &v| m.max(v)) / values.sum()
}
