//! loglik_optimizer::api — the `maximize` entrypoint.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Maximize `f` over `θ` starting at `theta0`.
///
/// Runs L-BFGS with the line search chosen in `opts`; a positive
/// `opts.l1_penalty` maximizes `ℓ(θ) − λ‖θ‖₁` instead.
///
/// # Errors
/// - Anything returned by [`LogLikelihood::check`].
/// - Invalid solver configuration.
/// - Objective failures raised during the run (see [`run_lbfgs`]).
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data).with_l1_penalty(opts.l1_penalty);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}
