//! Adapter that exposes a user `LogLikelihood` as an `argmin` problem.
//!
//! The solver minimizes `c(θ) = -ℓ(θ)`; analytic gradients are negated
//! accordingly, and missing gradients are replaced by finite differences of
//! the cost. Every successful cost evaluation is also offered to a shared
//! [`TrialTracker`], which remembers the point with the lowest *penalized*
//! cost `c(θ) + λ‖θ‖₁`. If argmin aborts mid-run the runner falls back to
//! that point instead of losing the whole optimization.
use std::{cell::RefCell, sync::Arc};

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::run_fd_diff,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;
use parking_lot::Mutex;

/// Best trial point seen so far, in penalized-cost terms.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialPoint {
    pub theta: Theta,
    /// Unpenalized cost `-ℓ(θ)`.
    pub cost: Cost,
    /// `cost + λ‖θ‖₁`.
    pub penalized_cost: Cost,
}

/// Shared, thread-safe record of the best trial point.
///
/// Cloning shares the underlying slot, so the runner can keep a handle while
/// the adapter itself is moved into the executor.
#[derive(Debug, Clone, Default)]
pub struct TrialTracker {
    best: Arc<Mutex<Option<TrialPoint>>>,
}

impl TrialTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `theta` if its penalized cost beats the current best.
    pub fn offer(&self, theta: &Theta, cost: Cost, l1_penalty: f64) {
        let penalized_cost = cost + l1_penalty * theta.iter().map(|w| w.abs()).sum::<f64>();
        let mut slot = self.best.lock();
        let better = match slot.as_ref() {
            Some(best) => penalized_cost < best.penalized_cost,
            None => true,
        };
        if better {
            *slot = Some(TrialPoint { theta: theta.clone(), cost, penalized_cost });
        }
    }

    /// Current best trial point, if any evaluation succeeded.
    pub fn best(&self) -> Option<TrialPoint> {
        self.best.lock().clone()
    }
}

/// Bridges a user `LogLikelihood` to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns `-ℓ(θ)`.
/// - `Gradient::gradient` returns `-∇ℓ(θ)` or a finite-difference gradient
///   of the cost.
///
/// `l1_penalty` is only used to rank trial points; the penalty itself is
/// applied by the solver.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
    pub l1_penalty: f64,
    pub tracker: TrialTracker,
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        self.tracker.offer(theta, -output, self.l1_penalty);
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Gradient of the cost at `θ`.
    ///
    /// Central differences are tried first when no analytic gradient exists.
    /// If the cost closure failed at any probe point, or the result is not a
    /// valid gradient, the computation is retried with forward differences.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                // The FD closure must return f64, so errors are parked here.
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let fd_grad = theta.central_diff(&cost_func);
                if closure_err.borrow().is_none() && validate_grad(&fd_grad, dim).is_ok() {
                    return Ok(fd_grad);
                }
                Ok(run_fd_diff(theta, &cost_func, &closure_err)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    /// Construct an adapter with no L1 penalty and a fresh tracker.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data, l1_penalty: 0.0, tracker: TrialTracker::new() }
    }

    /// Rank trial points by `c(θ) + λ‖θ‖₁`.
    pub fn with_l1_penalty(mut self, l1_penalty: f64) -> Self {
        self.l1_penalty = l1_penalty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use ndarray::array;

    /// ℓ(θ) = -‖θ - 1‖², with an analytic gradient.
    struct Bowl;

    impl LogLikelihood for Bowl {
        type Data = ();
        fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
            Ok(-theta.mapv(|x| (x - 1.0) * (x - 1.0)).sum())
        }
        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            Ok(theta.mapv(|x| -2.0 * (x - 1.0)))
        }
    }

    /// Same bowl without an analytic gradient.
    struct BowlNoGrad;

    impl LogLikelihood for BowlNoGrad {
        type Data = ();
        fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
            Bowl.value(theta, &())
        }
        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Cost and analytic gradient are the negated log-likelihood quantities.
    //
    // Given
    // -----
    // - `Bowl` at θ = [0, 2].
    //
    // Expect
    // ------
    // - cost = 2, gradient = [-2, 2].
    fn adapter_negates_value_and_gradient() {
        let adapter = ArgMinAdapter::new(&Bowl, &());
        let theta = array![0.0, 2.0];

        let cost = adapter.cost(&theta).expect("cost should evaluate");
        let grad = adapter.gradient(&theta).expect("gradient should evaluate");

        assert_eq!(cost, 2.0);
        assert_eq!(grad, array![-2.0, 2.0]);
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient the adapter differentiates the cost.
    //
    // Given
    // -----
    // - `BowlNoGrad` at θ = [0, 2].
    //
    // Expect
    // ------
    // - The FD gradient is close to [-2, 2].
    fn adapter_falls_back_to_finite_differences() {
        let adapter = ArgMinAdapter::new(&BowlNoGrad, &());

        let grad = adapter.gradient(&array![0.0, 2.0]).expect("FD gradient should evaluate");

        assert!((grad[0] + 2.0).abs() < 1e-5);
        assert!((grad[1] - 2.0).abs() < 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // The tracker keeps the trial point with the lowest penalized cost and
    // is shared across adapter clones.
    //
    // Given
    // -----
    // - λ = 1, evaluations at [1, 1] (cost 0, penalty 2) and [0.5, 0.5]
    //   (cost 0.5, penalty 1).
    //
    // Expect
    // ------
    // - The second point wins (1.5 < 2.0) and is visible through a clone.
    fn tracker_keeps_lowest_penalized_cost() {
        let adapter = ArgMinAdapter::new(&Bowl, &()).with_l1_penalty(1.0);
        let handle = adapter.tracker.clone();

        adapter.cost(&array![1.0, 1.0]).expect("cost should evaluate");
        adapter.cost(&array![0.5, 0.5]).expect("cost should evaluate");

        let best = handle.best().expect("tracker should hold a point");
        assert_eq!(best.theta, array![0.5, 0.5]);
        assert!((best.penalized_cost - 1.5).abs() < 1e-12);
    }
}
