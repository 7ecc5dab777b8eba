//! Validation helpers shared by the optimizer configuration and outcome types.
//!
//! Each helper returns the first offending value wrapped in a dedicated
//! [`OptError`] variant, so higher layers can report precise diagnostics.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta},
};

/// Validate the optional gradient-norm tolerance.
///
/// `None` disables the stopping rule; `Some` must be finite and strictly
/// positive.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional cost-change tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate an L1 penalty coefficient.
///
/// Zero is allowed and means "no penalty"; the solver then runs plain L-BFGS.
///
/// # Errors
/// Returns [`OptError::InvalidL1Penalty`] for negative or non-finite values.
pub fn verify_l1_penalty(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::InvalidL1Penalty { value, reason: "Penalty must be finite." });
    }
    if value < 0.0 {
        return Err(OptError::InvalidL1Penalty { value, reason: "Penalty must be non-negative." });
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] for the first non-finite element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated weight vector.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Weight estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

/// Validate that a scalar log-likelihood value is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Zero is a legal L1 coefficient (plain L-BFGS), negatives are not.
    //
    // Given
    // -----
    // - Penalties 0.0, 0.5, -1e-3 and NaN.
    //
    // Expect
    // ------
    // - The first two pass; the last two return `InvalidL1Penalty`.
    fn verify_l1_penalty_accepts_zero_and_rejects_negative() {
        assert!(verify_l1_penalty(0.0).is_ok());
        assert!(verify_l1_penalty(0.5).is_ok());
        assert!(matches!(verify_l1_penalty(-1e-3), Err(OptError::InvalidL1Penalty { .. })));
        assert!(matches!(verify_l1_penalty(f64::NAN), Err(OptError::InvalidL1Penalty { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Gradient validation reports the first offending entry.
    //
    // Given
    // -----
    // - A gradient with a NaN at index 1 and an infinity at index 2.
    //
    // Expect
    // ------
    // - `InvalidGradient { index: 1, .. }`.
    fn validate_grad_reports_first_non_finite_entry() {
        let grad = array![0.0, f64::NAN, f64::INFINITY];

        let result = validate_grad(&grad, 3);

        assert!(matches!(result, Err(OptError::InvalidGradient { index: 1, .. })));
    }

    #[test]
    // Purpose
    // -------
    // Dimension mismatches are caught before finiteness checks.
    //
    // Given
    // -----
    // - A length-2 gradient validated against dimension 3.
    //
    // Expect
    // ------
    // - `GradientDimMismatch { expected: 3, found: 2 }`.
    fn validate_grad_rejects_wrong_dimension() {
        let grad = array![0.0, 1.0];

        let result = validate_grad(&grad, 3);

        assert_eq!(result, Err(OptError::GradientDimMismatch { expected: 3, found: 2 }));
    }

    #[test]
    // Purpose
    // -------
    // A missing estimate is distinguished from a non-finite one.
    //
    // Given
    // -----
    // - `None` and `Some([1.0, inf])`.
    //
    // Expect
    // ------
    // - `MissingThetaHat` and `InvalidThetaHat { index: 1, .. }` respectively.
    fn validate_theta_hat_distinguishes_missing_and_non_finite() {
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
        assert!(matches!(
            validate_theta_hat(Some(array![1.0, f64::INFINITY])),
            Err(OptError::InvalidThetaHat { index: 1, .. })
        ));
    }
}
