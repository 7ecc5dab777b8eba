//! pulse — temporally extended CRF models learned by feature induction.
//!
//! Purpose
//! -------
//! Learn a predictive model `P(o_t, r_t | history, a_t)` over discrete
//! action/observation/reward sequences. The model is a conditional
//! log-linear model whose features are conjunctions of past and present
//! variable values. Its structure is discovered by alternating expansion,
//! L1-regularized maximum likelihood, and removal of zero-weight features.
//!
//! Key behaviors
//! -------------
//! - [`core`]: data, features, outcome space, feature matrices, objective,
//!   induction steps, and options.
//! - [`models`]: [`TemporallyExtendedModel`] and the streaming
//!   [`SequenceLearner`].
//! - [`sim`]: a seeded 2×2 grid world whose reward needs two steps of
//!   history, used by tests and demos.
//! - [`errors`]: [`PulseError`] and the [`PulseResult`] alias.
//!
//! Conventions
//! -----------
//! - Time offsets are `<= 0` relative to the predicted step.
//! - Likelihoods reported to callers are `exp(-objective)`, the geometric
//!   mean per-step probability of the training data.
//! - Logging goes through `tracing`; nothing here installs a subscriber.
//!
//! Downstream usage
//! ----------------
//! ```ignore
//! use rust_pulse::pulse::prelude::*;
//!
//! let data = GridWorld::new(0).generate(500);
//! let mut model = TemporallyExtendedModel::new();
//! model
//!     .set_data(&data)
//!     .set_regularization(1e-3)
//!     .set_maximum_horizon(MaximumHorizon::Finite(2))
//!     .set_max_outer_loop_iterations(2);
//! let likelihood = model.optimize()?;
//! ```

pub mod core;
pub mod errors;
pub mod models;
pub mod sim;

pub use self::errors::{PulseError, PulseResult};
pub use self::models::{SequenceLearner, TemporallyExtendedModel};

pub mod prelude {
    pub use super::core::{DataPoint, LikelihoodStop, MaximumHorizon, PulseOptions};
    pub use super::errors::{PulseError, PulseResult};
    pub use super::models::{OutcomeProbability, SequenceLearner, TemporallyExtendedModel};
    pub use super::sim::GridWorld;
}
