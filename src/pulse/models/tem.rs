//! Temporally extended CRF model learned by PULSE.
//!
//! This module wires the core building blocks into the induction loop:
//!
//! ```text
//! repeat { expand → optimize weights → shrink } until the likelihood stalls
//! ```
//!
//! and implements [`LogLikelihood`] over the per-step feature matrices so the
//! weights can be fitted with the argmin-backed [`maximize`].
//!
//! Key ideas:
//! - `ℓ(w)` is the *mean* conditional log-likelihood of the training data; the
//!   L1 penalty is applied by the solver (orthant-wise L-BFGS), which lets
//!   weights become exactly zero so that [`shrink`] can remove them.
//! - Feature matrices are cached and rebuilt only when the feature set or the
//!   data changed.
//! - Predictions rebuild a single matrix for the last step of the supplied
//!   sequence and read off the softmax probability of the real outcome.
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            GradientCheck, Grad, LineSearcher, LogLikelihood, OptimOutcome, Theta,
            check_gradient, maximize,
        },
    },
    pulse::{
        core::{
            data::{DataPoint, DistinctValues},
            features::FeatureSet,
            induction::{expand, shrink},
            matrix::{FeatureMatrix, build_matrices, build_matrix},
            objective::{objective, objective_and_gradient, outcome_probabilities},
            options::{LikelihoodStop, MaximumHorizon, PulseOptions},
            outcomes::OutcomeSpace,
            progress::ProgressCounter,
        },
        errors::{PulseError, PulseResult},
    },
};
use ndarray::Array1;
use tracing::{debug, info, trace, warn};

/// Probability of one outcome under the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeProbability {
    pub observation: i32,
    pub reward: f64,
    pub probability: f64,
}

/// PULSE model: training data, learned feature set, and cached matrices.
///
/// After [`optimize`](Self::optimize) or
/// [`optimize_weights`](Self::optimize_weights), [`results`](Self::results)
/// holds the last solver outcome.
#[derive(Debug, Clone, Default)]
pub struct TemporallyExtendedModel {
    options: PulseOptions,
    data: Vec<DataPoint>,
    values: DistinctValues,
    outcomes: OutcomeSpace,
    feature_set: FeatureSet,
    matrices: Vec<FeatureMatrix>,
    matrices_stale: bool,
    results: Option<OptimOutcome>,
}

impl TemporallyExtendedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PulseOptions) -> Self {
        Self { options, ..Self::default() }
    }

    // ---- Configuration ----

    pub fn options(&self) -> &PulseOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut PulseOptions {
        &mut self.options
    }

    pub fn set_regularization(&mut self, value: f64) -> &mut Self {
        self.options.regularization = value;
        self
    }

    pub fn set_horizon_extension(&mut self, value: usize) -> &mut Self {
        self.options.horizon_extension = value;
        self
    }

    pub fn set_maximum_horizon(&mut self, value: MaximumHorizon) -> &mut Self {
        self.options.maximum_horizon = value;
        self
    }

    pub fn set_gradient_threshold(&mut self, value: f64) -> &mut Self {
        self.options.gradient_threshold = value;
        self
    }

    pub fn set_parameter_threshold(&mut self, value: f64) -> &mut Self {
        self.options.parameter_threshold = value;
        self
    }

    pub fn set_max_inner_loop_iterations(&mut self, value: usize) -> &mut Self {
        self.options.max_inner_loop_iterations = value;
        self
    }

    pub fn set_max_outer_loop_iterations(&mut self, value: usize) -> &mut Self {
        self.options.max_outer_loop_iterations = value;
        self
    }

    pub fn set_likelihood_threshold(&mut self, value: f64) -> &mut Self {
        self.options.likelihood_threshold = value;
        self
    }

    pub fn set_likelihood_stop(&mut self, value: LikelihoodStop) -> &mut Self {
        self.options.likelihood_stop = value;
        self
    }

    pub fn set_line_searcher(&mut self, value: LineSearcher) -> &mut Self {
        self.options.line_searcher = value;
        self
    }

    pub fn set_lbfgs_mem(&mut self, value: Option<usize>) -> &mut Self {
        self.options.lbfgs_mem = value;
        self
    }

    pub fn set_verbose(&mut self, value: bool) -> &mut Self {
        self.options.verbose = value;
        self
    }

    /// Replace the training data and rebuild the distinct values.
    ///
    /// The learned feature set is kept, so induction can continue on new data.
    pub fn set_data(&mut self, data: &[DataPoint]) -> &mut Self {
        self.values = DistinctValues::from_data(data);
        self.outcomes = OutcomeSpace::from_values(&self.values);
        debug!(
            points = data.len(),
            actions = self.values.actions.len(),
            observations = self.values.observations.len(),
            rewards = self.values.rewards.len(),
            "set data"
        );
        self.data = data.to_vec();
        self.matrices_stale = true;
        self
    }

    // ---- Accessors ----

    pub fn data(&self) -> &[DataPoint] {
        &self.data
    }

    pub fn distinct_values(&self) -> &DistinctValues {
        &self.values
    }

    pub fn outcome_space(&self) -> &OutcomeSpace {
        &self.outcomes
    }

    pub fn feature_set(&self) -> &FeatureSet {
        &self.feature_set
    }

    pub fn results(&self) -> Option<&OptimOutcome> {
        self.results.as_ref()
    }

    /// Feature matrices for the current data and feature set.
    ///
    /// # Errors
    /// [`PulseError::MissingOutcome`] if a data point has no outcome column.
    pub fn feature_matrices(&mut self) -> PulseResult<&[FeatureMatrix]> {
        self.refresh_matrices()?;
        Ok(&self.matrices)
    }

    // ---- Induction ----

    /// Run the expand → optimize → shrink loop and return the final
    /// likelihood `exp(-objective)`.
    ///
    /// Stops after `max_outer_loop_iterations` (if non-zero), when the
    /// likelihood improvement falls below the threshold, or when expansion
    /// no longer adds features.
    ///
    /// # Errors
    /// Invalid options, missing outcome columns, or objective failures.
    pub fn optimize(&mut self) -> PulseResult<f64> {
        self.options.validate()?;
        let max_outer = self.options.max_outer_loop_iterations;
        let mut likelihood = 0.0;
        let mut iteration = 0usize;
        loop {
            if max_outer > 0 && iteration >= max_outer {
                break;
            }
            let added = self.expand_feature_set()?;
            let new_likelihood = self.optimize_weights()?;
            let removed = self.shrink_feature_set();
            info!(
                iteration,
                likelihood = new_likelihood,
                features = self.feature_set.len(),
                added,
                removed,
                "outer iteration"
            );

            let stop = added == 0
                || self.options.likelihood_stop.should_stop(
                    likelihood,
                    new_likelihood,
                    self.options.likelihood_threshold,
                );
            likelihood = new_likelihood;
            iteration += 1;
            if stop {
                break;
            }
        }
        Ok(likelihood)
    }

    /// Expand the feature set once; returns the number of added features.
    ///
    /// # Errors
    /// Propagates feature construction errors.
    pub fn expand_feature_set(&mut self) -> PulseResult<usize> {
        let before = self.feature_set.len();
        self.feature_set = expand(
            &self.feature_set,
            &self.values,
            self.options.horizon_extension,
            self.options.maximum_horizon,
        )?;
        self.matrices_stale = true;
        let after = self.feature_set.len();
        debug!(before, after, "expanded feature set");
        trace!("feature set after expansion:\n{}", self.feature_set);
        Ok(after.saturating_sub(before))
    }

    /// Remove zero-weight features; returns how many were removed.
    pub fn shrink_feature_set(&mut self) -> usize {
        let before = self.feature_set.len();
        self.feature_set = shrink(std::mem::take(&mut self.feature_set));
        let after = self.feature_set.len();
        if after != before {
            self.matrices_stale = true;
        }
        debug!(before, after, "shrunk feature set");
        trace!("feature set after shrinking:\n{}", self.feature_set);
        before - after
    }

    /// Fit the weights of the current feature set without changing its
    /// structure, and return `exp(-objective)` at the fitted weights.
    ///
    /// With no data or no features the solver is skipped and `1.0` returned.
    ///
    /// # Errors
    /// Invalid options, missing outcome columns, or objective failures. Solver
    /// non-convergence is not an error.
    pub fn optimize_weights(&mut self) -> PulseResult<f64> {
        self.refresh_matrices()?;
        if self.feature_set.is_empty() || self.data.is_empty() {
            debug!("nothing to optimize");
            return Ok(1.0);
        }
        let opts = self.options.mle_opts()?;
        let theta0 = self.feature_set.weights();
        let outcome = maximize(&*self, theta0, &self.matrices, &opts)?;
        debug!(
            status = %outcome.status,
            converged = outcome.converged,
            recovered = outcome.solver_error.is_some(),
            iterations = outcome.iterations,
            grad_norm = ?outcome.grad_norm,
            "weight optimization finished"
        );
        self.feature_set.set_weights(&outcome.theta_hat)?;
        let value = objective(&outcome.theta_hat, &self.matrices)?;
        self.results = Some(outcome);
        let likelihood = (-value).exp();
        debug!(likelihood, "optimized feature weights");
        Ok(likelihood)
    }

    /// Compare the analytic objective gradient with symmetric differences at
    /// the current weights.
    ///
    /// A coordinate passes if it agrees within `tolerance`, or within
    /// `tolerance` relative to the objective value when that is larger.
    ///
    /// # Errors
    /// Invalid `step`, missing outcome columns, or objective failures.
    pub fn check_derivatives(&mut self, step: f64, tolerance: f64) -> PulseResult<GradientCheck> {
        self.refresh_matrices()?;
        let weights = self.feature_set.weights();
        let (value, analytic) = objective_and_gradient(&weights, &self.matrices)?;
        let tolerance = tolerance.max(tolerance * value.abs());
        let matrices = &self.matrices;
        let report = check_gradient(
            &weights,
            analytic,
            |w: &Theta| objective(w, matrices).map_err(OptError::from),
            step,
            tolerance,
        )?;
        if !report.passed() {
            warn!(
                mismatches = report.mismatches.len(),
                max_abs_diff = report.max_abs_diff,
                "analytic gradient disagrees with finite differences"
            );
        }
        Ok(report)
    }

    // ---- Prediction ----

    /// `P(o_T, r_T | history, a_T)` for the last point `T` of `data`.
    ///
    /// # Errors
    /// [`PulseError::EmptySequence`] for empty input.
    pub fn prediction(&self, data: &[DataPoint]) -> PulseResult<f64> {
        let (_, matrix, probabilities) = self.predict_last(data)?;
        Ok(probabilities[matrix.true_outcome])
    }

    /// Full predictive distribution for the last point of `data`.
    ///
    /// The observation and reward of that point are only used to extend the
    /// outcome space when they were never seen in training.
    ///
    /// # Errors
    /// [`PulseError::EmptySequence`] for empty input.
    pub fn outcome_distribution(&self, data: &[DataPoint]) -> PulseResult<Vec<OutcomeProbability>> {
        let (outcomes, _, probabilities) = self.predict_last(data)?;
        Ok(outcomes
            .iter()
            .zip(probabilities.iter())
            .map(|((observation, reward), &probability)| OutcomeProbability {
                observation,
                reward,
                probability,
            })
            .collect())
    }

    fn predict_last(
        &self, data: &[DataPoint],
    ) -> PulseResult<(OutcomeSpace, FeatureMatrix, Array1<f64>)> {
        let last = data.last().ok_or(PulseError::EmptySequence)?;
        let outcomes = self.outcomes.extended_with(last);
        let matrix = build_matrix(&self.feature_set, &outcomes, data, data.len() - 1)?;
        let probabilities =
            outcome_probabilities(&self.feature_set.weights(), matrix.values.view());
        Ok((outcomes, matrix, probabilities))
    }

    fn refresh_matrices(&mut self) -> PulseResult<()> {
        if !self.matrices_stale && self.matrices.len() == self.data.len() {
            return Ok(());
        }
        let progress = ProgressCounter::new(self.data.len() as u64);
        self.matrices = build_matrices(&self.feature_set, &self.outcomes, &self.data, &progress)?;
        self.matrices_stale = false;
        debug!(
            matrices = self.matrices.len(),
            features = self.feature_set.len(),
            outcomes = self.outcomes.len(),
            built = progress.get(),
            "rebuilt feature matrices"
        );
        Ok(())
    }
}

impl LogLikelihood for TemporallyExtendedModel {
    type Data = Vec<FeatureMatrix>;

    /// Mean conditional log-likelihood `-objective(w)`.
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<f64> {
        Ok(-objective(theta, data)?)
    }

    /// Weight length must match the feature set.
    fn check(&self, theta: &Theta, _data: &Self::Data) -> OptResult<()> {
        if theta.len() != self.feature_set.len() {
            return Err(OptError::ThetaLengthMismatch {
                expected: self.feature_set.len(),
                actual: theta.len(),
            });
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        let (_, gradient) = objective_and_gradient(theta, data)?;
        Ok(-gradient)
    }
}
