//! loglik_optimizer::run — execute an L-BFGS solver and normalize the result.
//!
//! Purpose
//! -------
//! Drive an argmin [`Executor`] from an initial guess to an [`OptimOutcome`],
//! applying iteration limits and the optional slog observer.
//!
//! Key behaviors
//! -------------
//! - `max_iter = None` leaves the executor unbounded; the solver then stops
//!   on its own tolerances.
//! - A run that aborts inside argmin (line-search failure, numerical
//!   breakdown) is not fatal: the outcome carries the best trial point the
//!   adapter recorded, or the initial weights if nothing was evaluated, and
//!   the error is kept in `solver_error`.
//! - Errors raised by the objective itself ([`OptError::ObjectiveFailed`])
//!   are propagated; they indicate a broken model rather than a hard
//!   optimization problem.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin_math::ArgminL2Norm;

/// Run `solver` on `problem` starting from `theta0`.
///
/// # Errors
/// - [`OptError::ObjectiveFailed`] raised by the objective during the run.
/// - Validation errors on the final state (`MissingThetaHat`, non-finite
///   values).
/// - Errors evaluating `ℓ(θ₀)` when a failed run has no trial point to fall
///   back to.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    if opts.verbose {
        log_initial_state(&theta0, &problem);
    }
    let tracker = problem.tracker.clone();
    let (f, data) = (problem.f, problem.data);
    let start = theta0.clone();

    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = match optimizer.run() {
        Ok(res) => res.state().clone(),
        Err(err) => {
            let err = OptError::from(err);
            if matches!(err, OptError::ObjectiveFailed { .. }) {
                return Err(err);
            }
            tracing::warn!(error = %err, "solver aborted; keeping best trial point");
            return match tracker.best() {
                Some(point) => Ok(OptimOutcome::recovered(point.theta, -point.cost, err)),
                None => {
                    let value = f.value(&start, data)?;
                    Ok(OptimOutcome::recovered(start, value, err))
                }
            };
        }
    };

    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}

fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>)
where
    F: LogLikelihood,
{
    let ll0 = problem.cost(theta0).map(|c| -c).ok();
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    tracing::debug!(loglik = ?ll0, grad_norm = ?g0n, dim = theta0.len(), "initial state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::{
        builders::build_optimizer_more_thuente,
        traits::{LineSearcher, Tolerances},
    };
    use ndarray::array;

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

    struct Broken;

    impl LogLikelihood for Broken {
        type Data = ();
        fn value(&self, _: &Theta, _: &()) -> OptResult<f64> {
            Err(OptError::ObjectiveFailed { text: "feature matrix missing".into() })
        }
        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // An unbounded run on a smooth bowl converges to its maximizer.
    //
    // Given
    // -----
    // - ℓ(θ) = -‖θ - 1‖², θ₀ = [0, 0], no iteration cap.
    //
    // Expect
    // ------
    // - θ̂ ≈ [1, 1] and `solver_error` is `None`.
    fn run_lbfgs_converges_on_bowl() {
        let tols = Tolerances::new(Some(1e-8), None, None).expect("valid tolerances");
        let opts = MLEOptions::new(tols, LineSearcher::MoreThuente, None).expect("valid options");
        let solver = build_optimizer_more_thuente(&opts).expect("solver builds");

        let outcome = run_lbfgs(array![0.0, 0.0], &opts, ArgMinAdapter::new(&Bowl, &()), solver)
            .expect("run succeeds");

        assert!(outcome.solver_error.is_none());
        assert!((outcome.theta_hat[0] - 1.0).abs() < 1e-5);
        assert!((outcome.theta_hat[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Objective failures are not swallowed by the recovery path.
    //
    // Given
    // -----
    // - An objective whose every evaluation fails with `ObjectiveFailed`.
    //
    // Expect
    // ------
    // - `run_lbfgs` returns that error.
    fn run_lbfgs_propagates_objective_failures() {
        let opts = MLEOptions::default();
        let solver = build_optimizer_more_thuente(&opts).expect("solver builds");

        let result = run_lbfgs(array![0.0], &opts, ArgMinAdapter::new(&Broken, &()), solver);

        assert!(matches!(result, Err(OptError::ObjectiveFailed { .. })));
    }
}
