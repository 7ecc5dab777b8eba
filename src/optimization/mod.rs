//! optimization — argmin-backed likelihood maximization and its error surface.
//!
//! Purpose
//! -------
//! Provide the solver layer used to fit feature weights: a generic
//! log-likelihood interface, an adapter that exposes it to argmin's L-BFGS
//! (optionally orthant-wise, for L1 penalties), and a single error enum for
//! everything that can go wrong while configuring or running the solver.
//!
//! Key behaviors
//! -------------
//! - Maximize a user log-likelihood `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`
//!   (`loglik_optimizer`).
//! - Apply an L1 penalty `λ‖θ‖₁` inside the solver rather than inside the
//!   user objective, so weights can reach exactly zero.
//! - Treat solver non-convergence as informational: a run always yields the
//!   best weights it saw.
//! - Normalize configuration issues, numerical failures, and backend errors
//!   into [`errors::OptError`].
//!
//! Conventions
//! -----------
//! - Parameters and gradients are `ndarray::Array1<f64>` (`Theta`, `Grad`).
//! - Public entrypoints that can fail return `OptResult<T>`; raw argmin
//!   errors never cross this module boundary.
//!
//! Testing notes
//! -------------
//! - Submodules test solver construction, sign conventions, validation, and
//!   the finite-difference gradient check on toy objectives.
//! - The model layer exercises the full path on feature-matrix objectives.

pub mod errors;
pub mod loglik_optimizer;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_pulse::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
}
