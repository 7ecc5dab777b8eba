//! models — PULSE model types built on `pulse::core`.
//!
//! Purpose
//! -------
//! Expose the user-facing model surface: [`TemporallyExtendedModel`], which
//! owns data, feature set and cached matrices and runs the induction loop,
//! and [`SequenceLearner`], a step-by-step facade for agents.
//!
//! Key behaviors
//! -------------
//! - [`TemporallyExtendedModel`] implements [`LogLikelihood`] over its
//!   per-step feature matrices and is fitted with the shared L-BFGS
//!   `maximize` entry point.
//! - `optimize` alternates expand → optimize weights → shrink and logs one
//!   `info` line per outer iteration.
//! - `prediction` / `outcome_distribution` score the last step of any
//!   sequence, extending the outcome space with unseen values.
//!
//! Invariants & assumptions
//! ------------------------
//! - Feature matrices are rebuilt lazily whenever the data or the feature
//!   set changed; the weight vector handed to the solver always matches
//!   the current feature-set order.
//! - A model instance is single-owner; parallelism is internal (rayon).
//!
//! Downstream usage
//! ----------------
//! - Configure with the chainable `set_*` methods or a [`PulseOptions`]
//!   value, call `set_data`, then `optimize`.
//! - For streaming use, push steps into a [`SequenceLearner`] and call `fit`.
//!
//! [`LogLikelihood`]: crate::optimization::loglik_optimizer::LogLikelihood
//! [`PulseOptions`]: crate::pulse::core::options::PulseOptions

pub mod learner;
pub mod tem;

pub use self::learner::SequenceLearner;
pub use self::tem::{OutcomeProbability, TemporallyExtendedModel};

pub mod prelude {
    pub use super::learner::SequenceLearner;
    pub use super::tem::TemporallyExtendedModel;
}
