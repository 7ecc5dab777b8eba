//! Negative mean conditional log-likelihood and its gradient.
//!
//! For one data point with matrix `F` (features × outcomes) and true column
//! `i*`:
//!
//! ```text
//! lin    = wᵀF
//! explin = exp(lin - max(lin))
//! z      = Σ explin
//! obj_n  = lin[i*] - max(lin) - ln z
//! grad_n = F[:, i*] - F·explin / z
//! ```
//!
//! and over `N` points `objective = -Σ obj_n / N`, `gradient = -Σ grad_n / N`.
//! Subtracting `max(lin)` leaves every quantity unchanged and keeps `exp`
//! finite for large weights. The L1 penalty is not part of this value.
//!
//! Sums over data points run as a rayon `fold`/`reduce` with per-worker
//! accumulators.
use crate::pulse::{
    core::matrix::FeatureMatrix,
    errors::{PulseError, PulseResult},
};
use ndarray::{Array1, ArrayView2};
use rayon::prelude::*;

/// Softmax over outcomes of `wᵀF`.
pub fn outcome_probabilities(weights: &Array1<f64>, values: ArrayView2<'_, f64>) -> Array1<f64> {
    let (mut explin, _, z) = shifted_exp(weights, values);
    if z > 0.0 {
        explin /= z;
    }
    explin
}

/// `(exp(lin - max), max, z)` for one matrix.
fn shifted_exp(weights: &Array1<f64>, values: ArrayView2<'_, f64>) -> (Array1<f64>, f64, f64) {
    let lin = values.t().dot(weights);
    let max = lin.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let shift = if max.is_finite() { max } else { 0.0 };
    let explin = lin.mapv(|l| (l - shift).exp());
    let z = explin.sum();
    (explin, shift, z)
}

fn point_log_likelihood(weights: &Array1<f64>, m: &FeatureMatrix) -> f64 {
    let lin_star = m.values.column(m.true_outcome).dot(weights);
    let (_, shift, z) = shifted_exp(weights, m.values.view());
    lin_star - shift - z.ln()
}

fn point_gradient(weights: &Array1<f64>, m: &FeatureMatrix) -> (f64, Array1<f64>) {
    let (explin, shift, z) = shifted_exp(weights, m.values.view());
    let column = m.values.column(m.true_outcome);
    let obj = column.dot(weights) - shift - z.ln();
    let grad = &column - &(m.values.dot(&explin) / z);
    (obj, grad)
}

fn check_shapes(weights: &Array1<f64>, matrices: &[FeatureMatrix]) -> PulseResult<()> {
    for (index, m) in matrices.iter().enumerate() {
        if m.n_features() != weights.len() || m.true_outcome >= m.n_outcomes() {
            return Err(PulseError::MatrixShapeMismatch {
                index,
                expected: (weights.len(), m.n_outcomes().max(m.true_outcome + 1)),
                actual: m.values.dim(),
            });
        }
    }
    Ok(())
}

fn finite(value: f64) -> PulseResult<f64> {
    if value.is_finite() { Ok(value) } else { Err(PulseError::NonFiniteObjective { value }) }
}

/// `-Σ obj_n / N`; `0.0` for no data.
///
/// # Errors
/// - [`PulseError::MatrixShapeMismatch`] if a matrix has the wrong number of
///   rows or an out-of-range true column.
/// - [`PulseError::NonFiniteObjective`] if the sum is NaN/±inf.
pub fn objective(weights: &Array1<f64>, matrices: &[FeatureMatrix]) -> PulseResult<f64> {
    check_shapes(weights, matrices)?;
    if matrices.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = matrices.par_iter().map(|m| point_log_likelihood(weights, m)).sum();
    finite(-sum / matrices.len() as f64)
}

/// Objective together with its gradient.
///
/// # Errors
/// Same as [`objective`].
pub fn objective_and_gradient(
    weights: &Array1<f64>, matrices: &[FeatureMatrix],
) -> PulseResult<(f64, Array1<f64>)> {
    check_shapes(weights, matrices)?;
    let dim = weights.len();
    if matrices.is_empty() {
        return Ok((0.0, Array1::zeros(dim)));
    }
    let (sum_obj, sum_grad) = matrices
        .par_iter()
        .fold(
            || (0.0, Array1::<f64>::zeros(dim)),
            |(acc_obj, mut acc_grad), m| {
                let (obj, grad) = point_gradient(weights, m);
                acc_grad += &grad;
                (acc_obj + obj, acc_grad)
            },
        )
        .reduce(
            || (0.0, Array1::<f64>::zeros(dim)),
            |(o1, mut g1), (o2, g2)| {
                g1 += &g2;
                (o1 + o2, g1)
            },
        );
    let n = matrices.len() as f64;
    Ok((finite(-sum_obj / n)?, sum_grad / -n))
}
