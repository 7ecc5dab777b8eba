//! PULSE options — configuration for feature induction and weight fitting.
//!
//! Purpose
//! -------
//! Collect every knob of the expand → optimize → shrink procedure in one
//! place and translate the solver-facing part into [`MLEOptions`].
//!
//! Key behaviors
//! -------------
//! - [`MaximumHorizon`] bounds how far back features may look; the integer
//!   form `-1` means "no bound".
//! - [`LikelihoodStop`] selects how the outer loop measures improvement.
//! - [`PulseOptions::mle_opts`] validates the options and builds the argmin
//!   configuration (tolerances, line search, L-BFGS memory, L1 coefficient).
//!
//! Conventions
//! -----------
//! - Iteration limits of `0` mean "unbounded".
//! - `regularization` is the L1 coefficient on the *mean* negative
//!   log-likelihood, so its scale does not depend on the amount of data.
//! - `parameter_threshold` is stored for callers but not consulted by the
//!   solver.
//!
//! Testing notes
//! -------------
//! - Unit tests cover defaults, horizon parsing, stop rules, and the
//!   translation into `MLEOptions`.
use crate::{
    optimization::loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
    pulse::errors::{PulseError, PulseResult},
};

/// How many steps into the past features may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaximumHorizon {
    Finite(usize),
    #[default]
    Infinite,
}

impl MaximumHorizon {
    /// Parse the integer convention: `-1` is infinite, `n >= 0` is finite.
    ///
    /// # Errors
    /// [`PulseError::InvalidHorizon`] for values below `-1`.
    pub fn from_raw(raw: i64) -> PulseResult<Self> {
        match raw {
            -1 => Ok(MaximumHorizon::Infinite),
            n if n >= 0 => Ok(MaximumHorizon::Finite(n as usize)),
            value => Err(PulseError::InvalidHorizon { value }),
        }
    }

    pub fn to_raw(self) -> i64 {
        match self {
            MaximumHorizon::Finite(n) => n as i64,
            MaximumHorizon::Infinite => -1,
        }
    }
}

/// Early-stopping rule for the outer induction loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LikelihoodStop {
    /// Stop when `new - old < threshold`.
    #[default]
    Absolute,
    /// Stop when `(new - old) / old < threshold`. An `old` of zero counts as
    /// unbounded improvement.
    Relative,
}

impl LikelihoodStop {
    pub fn should_stop(self, old: f64, new: f64, threshold: f64) -> bool {
        match self {
            LikelihoodStop::Absolute => new - old < threshold,
            LikelihoodStop::Relative => {
                if old == 0.0 {
                    return false;
                }
                (new - old) / old < threshold
            }
        }
    }
}

/// Full configuration of a PULSE model.
///
/// Fields
/// ------
/// - `regularization`: L1 coefficient `λ ≥ 0`.
/// - `horizon_extension`: how many steps each expansion reaches further back.
/// - `maximum_horizon`: hard bound on the look-back.
/// - `gradient_threshold`: L-BFGS gradient-norm tolerance (`> 0`).
/// - `parameter_threshold`: reserved.
/// - `max_inner_loop_iterations`: L-BFGS iteration cap, `0` for none.
/// - `max_outer_loop_iterations`: induction iteration cap, `0` for none.
/// - `likelihood_threshold` / `likelihood_stop`: outer-loop stopping rule.
/// - `line_searcher`, `lbfgs_mem`, `verbose`: passed through to the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseOptions {
    pub regularization: f64,
    pub horizon_extension: usize,
    pub maximum_horizon: MaximumHorizon,
    pub gradient_threshold: f64,
    pub parameter_threshold: f64,
    pub max_inner_loop_iterations: usize,
    pub max_outer_loop_iterations: usize,
    pub likelihood_threshold: f64,
    pub likelihood_stop: LikelihoodStop,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
    pub verbose: bool,
}

impl Default for PulseOptions {
    fn default() -> Self {
        Self {
            regularization: 0.0,
            horizon_extension: 1,
            maximum_horizon: MaximumHorizon::Infinite,
            gradient_threshold: 1e-5,
            parameter_threshold: 1e-5,
            max_inner_loop_iterations: 0,
            max_outer_loop_iterations: 0,
            likelihood_threshold: 0.0,
            likelihood_stop: LikelihoodStop::Absolute,
            line_searcher: LineSearcher::MoreThuente,
            lbfgs_mem: None,
            verbose: false,
        }
    }
}

impl PulseOptions {
    /// Check value ranges that the setters do not enforce.
    ///
    /// # Errors
    /// - [`PulseError::InvalidRegularization`] for negative/non-finite `λ`.
    /// - [`PulseError::InvalidThreshold`] for a non-positive gradient
    ///   threshold, or a negative / non-finite parameter threshold, or a
    ///   non-finite likelihood threshold.
    pub fn validate(&self) -> PulseResult<()> {
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(PulseError::InvalidRegularization { value: self.regularization });
        }
        if !self.gradient_threshold.is_finite() || self.gradient_threshold <= 0.0 {
            return Err(PulseError::InvalidThreshold {
                name: "gradient threshold",
                value: self.gradient_threshold,
                reason: "Must be finite and > 0.",
            });
        }
        if !self.parameter_threshold.is_finite() || self.parameter_threshold < 0.0 {
            return Err(PulseError::InvalidThreshold {
                name: "parameter threshold",
                value: self.parameter_threshold,
                reason: "Must be finite and >= 0.",
            });
        }
        if !self.likelihood_threshold.is_finite() {
            return Err(PulseError::InvalidThreshold {
                name: "likelihood threshold",
                value: self.likelihood_threshold,
                reason: "Must be finite.",
            });
        }
        Ok(())
    }

    /// Solver configuration derived from these options.
    ///
    /// # Errors
    /// Anything reported by [`PulseOptions::validate`], plus solver-side
    /// validation (e.g. `lbfgs_mem == Some(0)`).
    pub fn mle_opts(&self) -> PulseResult<MLEOptions> {
        self.validate()?;
        let max_iter =
            (self.max_inner_loop_iterations > 0).then_some(self.max_inner_loop_iterations);
        let tols = Tolerances::new(Some(self.gradient_threshold), None, max_iter)?;
        let opts = MLEOptions::new(tols, self.line_searcher, self.lbfgs_mem)?
            .with_l1_penalty(self.regularization)?
            .with_verbose(self.verbose);
        Ok(opts)
    }
}
