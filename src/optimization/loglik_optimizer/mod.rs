//! loglik_optimizer — argmin-powered log-likelihood maximization.
//!
//! Purpose
//! -------
//! Callers implement [`LogLikelihood`] and invoke [`maximize`] to run L-BFGS
//! with a configurable line search, tolerances, optional L1 penalty and
//! finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] exposes `c(θ) = -ℓ(θ)` to argmin and records
//!   the best trial point seen.
//! - [`builders`] constructs the solver; a positive L1 coefficient switches
//!   it to orthant-wise steps.
//! - [`run::run_lbfgs`] executes it and normalizes the result into an
//!   [`OptimOutcome`], recovering from aborted runs.
//! - [`finite_diff`] supplies FD gradients and [`finite_diff::check_gradient`]
//!   for auditing analytic ones.
//!
//! Invariants & assumptions
//! ------------------------
//! - User code implements `ℓ(θ)` and `∇ℓ(θ)`, never the cost.
//! - [`LogLikelihood::value`] and [`LogLikelihood::grad`] report invalid
//!   inputs as [`OptError`](crate::optimization::errors::OptError) values,
//!   not panics.
//! - The L1 penalty lives only in the solver; `value` is always the
//!   unpenalized log-likelihood.
//!
//! Testing notes
//! -------------
//! - Submodules cover sign conventions, solver construction, recovery,
//!   finite differences, validation and configuration invariants.
//! - `tests/` exercises `maximize` through the feature-matrix objective.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::finite_diff::{GradientCheck, check_gradient};
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

pub mod prelude {
    pub use super::{
        GradientCheck, LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Theta, Tolerances,
        check_gradient, maximize,
    };
}
