//! rust_pulse — temporally extended CRF models learned by PULSE, with Python
//! bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes a streaming PULSE learner to Python. When the `python-bindings`
//! feature is enabled, this module defines the `PyPulse` class and the
//! `rust_pulse` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`pulse` and `optimization`) as the
//!   public crate surface.
//! - Define a `#[pyclass]` wrapper around [`SequenceLearner`] with
//!   `append`, `clear`, `fit`, and `predict`, configured through keyword
//!   arguments.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, argument conversion, and error mapping.
//! - Python-side configuration is validated by the same checks as Rust-side
//!   configuration ([`PulseOptions::validate`]).
//!
//! Conventions
//! -----------
//! - `maximum_horizon = -1` means "no bound", matching
//!   [`MaximumHorizon::from_raw`].
//! - Iteration limits of `0` mean "unbounded".
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`pulse`] directly and can ignore the
//!   items guarded by `python-bindings`.
//! - Python code constructs `rust_pulse.PyPulse(...)`, feeds it steps, and
//!   calls `fit()` / `predict(...)`.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   `tests/integration_pulse_pipeline.rs`.
//!
//! [`SequenceLearner`]: crate::pulse::models::SequenceLearner
//! [`PulseOptions::validate`]: crate::pulse::core::options::PulseOptions::validate
//! [`MaximumHorizon::from_raw`]: crate::pulse::core::options::MaximumHorizon::from_raw

pub mod optimization;
pub mod pulse;

#[cfg(feature = "python-bindings")]
use pyo3::prelude::*;

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::loglik_optimizer::LineSearcher,
    pulse::{
        core::{
            data::DataPoint,
            options::{LikelihoodStop, MaximumHorizon, PulseOptions},
        },
        errors::PulseError,
        models::SequenceLearner,
    },
};

/// PyPulse — Python-facing wrapper for a streaming PULSE learner.
///
/// Purpose
/// -------
/// Let Python agents record interaction steps, fit a temporally extended
/// model on them, and query predictive probabilities.
///
/// Parameters
/// ----------
/// Constructed from Python via `PyPulse(**kwargs)`:
/// - `regularization`: `f64`, L1 coefficient, default `0.0`.
/// - `horizon_extension`: `usize`, default `1`.
/// - `maximum_horizon`: `i64`, `-1` for unbounded (default).
/// - `gradient_threshold`, `parameter_threshold`: `f64`, default `1e-5`.
/// - `max_inner_loop_iterations`, `max_outer_loop_iterations`: `usize`,
///   `0` for unbounded (default).
/// - `likelihood_threshold`: `f64`, default `0.0`.
/// - `relative_stop`: `bool`, use the relative likelihood stop rule.
/// - `line_searcher`: `"MoreThuente"` (default) or `"HagerZhang"`.
/// - `lbfgs_mem`: optional L-BFGS history length.
///
/// Fields
/// ------
/// - `inner`: [`SequenceLearner`] holding the history and the model.
///
/// Notes
/// -----
/// - Marked `unsendable`; the learner is used from the thread that created
///   it, while rayon parallelism stays internal to `fit`.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_pulse", unsendable)]
pub struct PyPulse {
    pub inner: SequenceLearner,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyPulse {
    #[new]
    #[pyo3(
        signature = (
            regularization = 0.0,
            horizon_extension = 1,
            maximum_horizon = -1,
            gradient_threshold = 1e-5,
            parameter_threshold = 1e-5,
            max_inner_loop_iterations = 0,
            max_outer_loop_iterations = 0,
            likelihood_threshold = 0.0,
            relative_stop = false,
            line_searcher = None,
            lbfgs_mem = None,
        ),
        text_signature = "(regularization=0.0, horizon_extension=1, maximum_horizon=-1, \
                          gradient_threshold=1e-5, parameter_threshold=1e-5, \
                          max_inner_loop_iterations=0, max_outer_loop_iterations=0, \
                          likelihood_threshold=0.0, relative_stop=False, \
                          line_searcher=None, lbfgs_mem=None)"
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        regularization: f64, horizon_extension: usize, maximum_horizon: i64,
        gradient_threshold: f64, parameter_threshold: f64, max_inner_loop_iterations: usize,
        max_outer_loop_iterations: usize, likelihood_threshold: f64, relative_stop: bool,
        line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
    ) -> PyResult<Self> {
        let line_searcher = match line_searcher {
            Some(name) => name.parse::<LineSearcher>().map_err(PulseError::from)?,
            None => LineSearcher::default(),
        };
        let options = PulseOptions {
            regularization,
            horizon_extension,
            maximum_horizon: MaximumHorizon::from_raw(maximum_horizon)?,
            gradient_threshold,
            parameter_threshold,
            max_inner_loop_iterations,
            max_outer_loop_iterations,
            likelihood_threshold,
            likelihood_stop: if relative_stop {
                LikelihoodStop::Relative
            } else {
                LikelihoodStop::Absolute
            },
            line_searcher,
            lbfgs_mem,
            verbose: false,
        };
        options.validate()?;
        Ok(PyPulse { inner: SequenceLearner::with_options(options) })
    }

    /// Record one `(action, observation, reward)` step.
    #[pyo3(text_signature = "(self, action, observation, reward, /)")]
    pub fn append(&mut self, action: i32, observation: i32, reward: f64) {
        self.inner.append(action, observation, reward);
    }

    /// Forget the recorded steps; the learned features are kept.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Fit on the recorded steps and return the likelihood.
    pub fn fit(&mut self, py: Python<'_>) -> PyResult<f64> {
        let inner = &mut self.inner;
        Ok(py.allow_threads(|| inner.fit())?)
    }

    /// Probability of the last step of `sequence` given the steps before it.
    #[pyo3(text_signature = "(self, sequence, /)")]
    pub fn predict(&self, sequence: Vec<(i32, i32, f64)>) -> PyResult<f64> {
        let data: Vec<DataPoint> = sequence.into_iter().map(DataPoint::from).collect();
        Ok(self.inner.prediction(&data)?)
    }

    /// Number of recorded steps.
    pub fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// Human-readable dump of the learned feature set.
    #[getter]
    pub fn feature_set(&self) -> String {
        self.inner.model().feature_set().to_string()
    }
}

/// rust_pulse — PyO3 module initializer for the Python extension.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn rust_pulse(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPulse>()?;
    Ok(())
}
