//! core — PULSE data, features, feature matrices, objective, and induction.
//!
//! Purpose
//! -------
//! Collect the building blocks of a temporally extended CRF model: sequence
//! data and its distinct values, the feature vocabulary, the outcome space,
//! per-step feature matrices, the likelihood objective, and the structural
//! expand/shrink steps. The model layer (`pulse::models`) wires these into
//! the induction loop.
//!
//! Key behaviors
//! -------------
//! - [`DataPoint`] / [`DistinctValues`]: raw sequence data and the values
//!   that seed features and outcomes.
//! - [`BasisFeature`], [`Feature`], [`FeatureSet`]: conjunctive predicates
//!   over relative time, with deterministic ordering.
//! - [`OutcomeSpace`]: observation × reward outcomes, observation-major.
//! - [`build_matrices`]: rayon-parallel indicator matrices, one per step.
//! - [`objective_and_gradient`]: mean negative log-likelihood and gradient,
//!   reduced in parallel.
//! - [`expand`] / [`shrink`]: feature induction.
//! - [`PulseOptions`]: configuration and translation to solver options.
//!
//! Invariants & assumptions
//! ------------------------
//! - Feature-set iteration order defines matrix rows and weight
//!   coordinates; any structural change invalidates existing matrices.
//! - Missing history makes features false; it is never an error.
//! - Nothing in this module mutates shared state during parallel phases
//!   except the [`ProgressCounter`].
//!
//! Conventions
//! -----------
//! - Time offsets are `<= 0`; `0` is the predicted step.
//! - Indexing is 0-based. Outcome `k` is
//!   `(observations[k / n_rewards], rewards[k % n_rewards])`.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its invariants on small fixtures.
//! - End-to-end behavior on the synthetic grid world is covered in `tests/`.

pub mod data;
pub mod features;
pub mod induction;
pub mod matrix;
pub mod objective;
pub mod options;
pub mod outcomes;
pub mod progress;

pub use self::data::{DataPoint, DistinctValues};
pub use self::features::{BasisFeature, Feature, FeatureKind, FeatureSet};
pub use self::induction::{expand, expansion_bound, seed, shrink};
pub use self::matrix::{FeatureMatrix, build_matrices, build_matrix};
pub use self::objective::{objective, objective_and_gradient, outcome_probabilities};
pub use self::options::{LikelihoodStop, MaximumHorizon, PulseOptions};
pub use self::outcomes::OutcomeSpace;
pub use self::progress::ProgressCounter;
