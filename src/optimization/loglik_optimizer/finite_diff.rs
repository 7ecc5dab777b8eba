//! loglik_optimizer::finite_diff — finite-difference gradients and checks.
//!
//! Purpose
//! -------
//! Approximate gradients numerically, either as a fallback when an objective
//! has no analytic gradient ([`run_fd_diff`]) or to audit an analytic one
//! ([`check_gradient`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Errors raised by the objective inside an FD closure are parked in a
//!   shared `RefCell` and surfaced after differencing; the returned gradient
//!   is never built from a failed evaluation.
//! - [`check_gradient`] uses symmetric differences with a caller-chosen step
//!   so it can be compared against the analytic gradient coordinate by
//!   coordinate.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta, validation::validate_grad},
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient of `func` at `theta`.
///
/// # Errors
/// - The first error recorded in `closure_err` while differencing.
/// - [`OptError::InvalidGradient`] if the result has non-finite entries.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Per-coordinate comparison of an analytic and a numerical gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientCheck {
    pub analytic: Grad,
    pub numerical: Grad,
    /// Indices whose absolute difference exceeds the tolerance.
    pub mismatches: Vec<usize>,
    pub max_abs_diff: f64,
}

impl GradientCheck {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Compare `analytic` with symmetric differences `(f(θ+h·eᵢ) − f(θ−h·eᵢ)) / 2h`.
///
/// # Errors
/// - [`OptError::InvalidParameter`] for a non-positive or non-finite `step`.
/// - [`OptError::GradientDimMismatch`] if `analytic` has the wrong length.
/// - Any error returned by `func`.
pub fn check_gradient<G>(
    theta: &Theta, analytic: Grad, func: G, step: f64, tolerance: f64,
) -> OptResult<GradientCheck>
where
    G: Fn(&Theta) -> OptResult<f64>,
{
    if !(step.is_finite() && step > 0.0) {
        return Err(OptError::InvalidParameter {
            text: format!("Finite-difference step must be positive and finite, got {step}."),
        });
    }
    if analytic.len() != theta.len() {
        return Err(OptError::GradientDimMismatch {
            expected: theta.len(),
            found: analytic.len(),
        });
    }

    let mut numerical = Grad::zeros(theta.len());
    let mut probe = theta.clone();
    for i in 0..theta.len() {
        let base = probe[i];
        probe[i] = base + step;
        let upper = func(&probe)?;
        probe[i] = base - step;
        let lower = func(&probe)?;
        probe[i] = base;
        numerical[i] = (upper - lower) / (2.0 * step);
    }

    let mut mismatches = Vec::new();
    let mut max_abs_diff = 0.0_f64;
    for (i, (a, n)) in analytic.iter().zip(numerical.iter()).enumerate() {
        let diff = (a - n).abs();
        if diff.is_nan() || diff > tolerance {
            mismatches.push(i);
        }
        max_abs_diff = max_abs_diff.max(diff);
    }

    Ok(GradientCheck { analytic, numerical, mismatches, max_abs_diff })
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::ArgminError;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Forward differences of a smooth function give a finite gradient of
    // the right length.
    //
    // Given
    // -----
    // - f(θ) = θ·θ at θ = [0, 1].
    //
    // Expect
    // ------
    // - A length-2 gradient close to [0, 2].
    fn run_fd_diff_quadratic_returns_valid_gradient() {
        let theta = array![0.0, 1.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);

        let grad = run_fd_diff(&theta, &|x: &Theta| x.dot(x), &closure_err)
            .expect("quadratic gradient should be computed");

        assert_eq!(grad.len(), 2);
        assert!((grad[1] - 2.0).abs() < 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // An error recorded by the closure wins over the numerical result.
    //
    // Given
    // -----
    // - A closure that always records `NotImplemented` and returns NaN.
    //
    // Expect
    // ------
    // - `run_fd_diff` returns the mapped argmin error.
    fn run_fd_diff_closure_error_is_propagated() {
        let theta = array![1.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            closure_err.replace(Some(ArgminError::NotImplemented { text: "fd".into() }.into()));
            f64::NAN
        };

        let err = run_fd_diff(&theta, &f, &closure_err).expect_err("closure error must surface");

        assert!(matches!(err, OptError::NotImplemented { .. }));
    }

    #[test]
    // Purpose
    // -------
    // A correct analytic gradient passes the symmetric-difference check and
    // a wrong one is flagged at the right coordinate.
    //
    // Given
    // -----
    // - f(θ) = θ₀² + 3θ₁ at θ = [1, 2]; true gradient [2, 3].
    //
    // Expect
    // ------
    // - [2, 3] passes; [2, 4] fails with mismatch at index 1.
    fn check_gradient_flags_wrong_coordinates() {
        let theta = array![1.0, 2.0];
        let f = |t: &Theta| -> OptResult<f64> { Ok(t[0] * t[0] + 3.0 * t[1]) };

        let good = check_gradient(&theta, array![2.0, 3.0], f, 1e-5, 1e-6).expect("check runs");
        let bad = check_gradient(&theta, array![2.0, 4.0], f, 1e-5, 1e-6).expect("check runs");

        assert!(good.passed());
        assert_eq!(bad.mismatches, vec![1]);
        assert!((bad.max_abs_diff - 1.0).abs() < 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // Invalid steps are rejected up front.
    //
    // Given
    // -----
    // - step = 0.
    //
    // Expect
    // ------
    // - `InvalidParameter`.
    fn check_gradient_rejects_zero_step() {
        let f = |_: &Theta| -> OptResult<f64> { Ok(0.0) };

        let result = check_gradient(&array![0.0], array![0.0], f, 0.0, 1e-6);

        assert!(matches!(result, Err(OptError::InvalidParameter { .. })));
    }
}
