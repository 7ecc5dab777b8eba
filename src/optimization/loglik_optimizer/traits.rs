//! Public API surface for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait implemented by objectives.
//! - [`MLEOptions`] and [`Tolerances`]: solver configuration, including the
//!   L1 coefficient handed to argmin's orthant-wise L-BFGS.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`OptimOutcome`]: normalized result returned by `maximize`.
//!
//! Convention: we *maximize* `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`. Analytic
//! gradients are gradients of `ℓ`; the adapter flips the sign.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{
            validate_theta_hat, validate_value, verify_l1_penalty, verify_tol_cost,
            verify_tol_grad,
        },
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Objective interface consumed by [`maximize`](super::maximize).
///
/// - `value(&Theta, &Data)`: evaluate `ℓ(θ)`.
/// - `check(&Theta, &Data)`: reject obviously invalid `θ`/`data` pairs;
///   called once before the solver starts.
/// - `grad(&Theta, &Data)`: optional analytic `∇ℓ(θ)`. Without it the
///   adapter falls back to finite differences of the cost.
///
/// The L1 penalty is never part of `value`; it is applied by the solver.
pub trait LogLikelihood {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing is case-insensitive (`"MoreThuente"`, `"hagerzhang"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearcher {
    #[default]
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols`: numerical tolerances and iteration limits.
/// - `line_searcher`: line search used by L-BFGS.
/// - `verbose`: attach argmin's slog observer (behind `obs_slog`).
/// - `lbfgs_mem`: history size; `None` uses [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM).
/// - `l1_penalty`: coefficient `λ ≥ 0` of `λ‖θ‖₁`. When positive the solver
///   switches to orthant-wise steps so weights can land on exactly zero.
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
    pub l1_penalty: f64,
}

impl MLEOptions {
    /// Create solver options without an L1 penalty.
    ///
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, verbose: false, lbfgs_mem, l1_penalty: 0.0 })
    }

    /// Set the L1 coefficient.
    ///
    /// # Errors
    /// [`OptError::InvalidL1Penalty`] for negative or non-finite values.
    pub fn with_l1_penalty(mut self, l1_penalty: f64) -> OptResult<Self> {
        verify_l1_penalty(l1_penalty)?;
        self.l1_penalty = l1_penalty;
        Ok(self)
    }

    /// Toggle the solver observer.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-5), tol_cost: None, max_iter: None },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
            l1_penalty: 0.0,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: stop when the gradient norm falls below this threshold.
/// - `tol_cost`: stop when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations; `None` is unbounded.
///
/// At least one of the three must be provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == Some(0)`.
    /// - [`OptError::InvalidParameter`] if all three are `None`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::InvalidParameter {
                text: "At least one stopping rule must be provided.".to_string(),
            });
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result returned by `maximize`.
///
/// - `theta_hat`: best weights found.
/// - `value`: `-c(θ̂)` as tracked by the solver. With an active L1 penalty
///   this includes `-λ‖θ̂‖₁`.
/// - `converged`: the solver reached a terminating status.
/// - `status`: human-readable termination status.
/// - `iterations`, `fn_evals`: argmin counters.
/// - `grad_norm`: norm of the last available gradient, if any.
/// - `solver_error`: set when the run aborted and `theta_hat` is the best
///   trial point recorded by the adapter instead of the solver's state.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
    pub solver_error: Option<OptError>,
}

impl OptimOutcome {
    /// Build a validated outcome from raw solver state.
    ///
    /// # Errors
    /// Propagates validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus,
        iterations: u64, fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            other => (true, format!("{other:?}")),
        };
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm,
            solver_error: None,
        })
    }

    /// Build an outcome for a run that aborted with `err`.
    ///
    /// `theta_hat` is whatever point the caller chose to keep (best trial
    /// point or the initial weights) and `value` its log-likelihood.
    pub fn recovered(theta_hat: Theta, value: f64, err: OptError) -> Self {
        Self {
            theta_hat,
            value,
            converged: false,
            status: format!("Aborted: {err}"),
            iterations: 0,
            fn_evals: FnEvalMap::new(),
            grad_norm: None,
            solver_error: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Line-search names parse case-insensitively and reject unknown names.
    //
    // Given
    // -----
    // - "morethuente", "HAGERZHANG", and "armijo".
    //
    // Expect
    // ------
    // - The first two parse; the third yields `InvalidLineSearch`.
    fn line_searcher_from_str_is_case_insensitive() {
        assert_eq!("morethuente".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert_eq!("HAGERZHANG".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert!(matches!(
            "armijo".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Tolerances require at least one stopping rule and a positive cap.
    //
    // Given
    // -----
    // - All-`None` tolerances and `max_iter = Some(0)`.
    //
    // Expect
    // ------
    // - Both constructions fail.
    fn tolerances_reject_empty_and_zero_cap() {
        assert!(Tolerances::new(None, None, None).is_err());
        assert!(matches!(
            Tolerances::new(Some(1e-5), None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
        assert!(Tolerances::new(Some(1e-5), None, None).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // The L1 builder validates and stores the coefficient.
    //
    // Given
    // -----
    // - Default-like options, then `with_l1_penalty(0.01)` and `(-1.0)`.
    //
    // Expect
    // ------
    // - The first stores 0.01; the second fails.
    fn mle_options_with_l1_penalty_validates() {
        let tols = Tolerances::new(Some(1e-5), None, Some(10)).expect("valid tolerances");
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, None).expect("valid options");

        let penalized = opts.clone().with_l1_penalty(0.01).expect("positive penalty is valid");

        assert_eq!(penalized.l1_penalty, 0.01);
        assert!(opts.with_l1_penalty(-1.0).is_err());
    }

    #[test]
    // Purpose
    // -------
    // A recovered outcome is never reported as converged and keeps the
    // error that caused the abort.
    //
    // Given
    // -----
    // - `recovered` built from a backend error.
    //
    // Expect
    // ------
    // - `converged == false` and `solver_error` is set.
    fn recovered_outcome_records_error() {
        let err = OptError::BackendError { text: "line search failed".to_string() };

        let outcome = OptimOutcome::recovered(array![0.0, 1.0], -0.5, err.clone());

        assert!(!outcome.converged);
        assert_eq!(outcome.solver_error, Some(err));
        assert_eq!(outcome.theta_hat, array![0.0, 1.0]);
    }
}
