//! Errors for PULSE models (feature construction, data/outcome invariants,
//! configuration checks, and optimizer failures).
//!
//! [`PulseError`] is the single error surface of the model layer. It
//! implements `Display`/`Error`, wraps [`OptError`] for solver problems, and
//! converts back into [`OptError::ObjectiveFailed`] so failures inside the
//! objective can travel through argmin unchanged.
//!
//! ## Conventions
//! - **Indices are 0-based** and refer to positions in the training or
//!   prediction sequence.
//! - Time offsets are relative to the predicted step and never positive.
//! - Insufficient history is **not** an error; features that reach before
//!   the start of a sequence are simply false.
use crate::optimization::errors::OptError;

/// Result alias for operations that may produce [`PulseError`].
pub type PulseResult<T> = Result<T, PulseError>;

/// Unified error type for PULSE modeling.
#[derive(Debug, Clone, PartialEq)]
pub enum PulseError {
    // ---- Feature construction ----
    /// Basis features may only look at the present or the past.
    PositiveTimeOffset { offset: i32 },

    // ---- Data / outcome invariants ----
    /// Prediction requires at least one data point.
    EmptySequence,

    /// The true (observation, reward) of a data point has no outcome column.
    MissingOutcome { index: usize, observation: i32, reward: f64 },

    /// Data index is outside the sequence.
    IndexOutOfRange { index: usize, len: usize },

    /// Weight vector length differs from the number of features.
    WeightLengthMismatch { expected: usize, actual: usize },

    /// A feature matrix does not match the current feature set / outcome space.
    MatrixShapeMismatch { index: usize, expected: (usize, usize), actual: (usize, usize) },

    /// Objective evaluated to NaN/±inf.
    NonFiniteObjective { value: f64 },

    // ---- Options validation ----
    /// Maximum horizon must be -1 (infinite) or non-negative.
    InvalidHorizon { value: i64 },

    /// Regularization must be finite and ≥ 0.
    InvalidRegularization { value: f64 },

    /// Stopping thresholds must be finite and within their documented range.
    InvalidThreshold { name: &'static str, value: f64, reason: &'static str },

    // ---- Estimation / optimizer ----
    /// Solver configuration or run failed.
    Optimization(OptError),
}

impl std::error::Error for PulseError {}

impl std::fmt::Display for PulseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Feature construction ----
            PulseError::PositiveTimeOffset { offset } => {
                write!(f, "Basis feature time offset must be <= 0; got: {offset}")
            }
            // ---- Data / outcome invariants ----
            PulseError::EmptySequence => {
                write!(f, "Input sequence is empty.")
            }
            PulseError::MissingOutcome { index, observation, reward } => {
                write!(
                    f,
                    "Data point at index {index} has no outcome column for observation {observation} and reward {reward}"
                )
            }
            PulseError::IndexOutOfRange { index, len } => {
                write!(f, "Data index {index} is out of range for a sequence of length {len}.")
            }
            PulseError::WeightLengthMismatch { expected, actual } => {
                write!(f, "Weight length mismatch: expected {expected}, got {actual}")
            }
            PulseError::MatrixShapeMismatch { index, expected, actual } => {
                write!(
                    f,
                    "Feature matrix at index {index} has shape {actual:?}; expected {expected:?}"
                )
            }
            PulseError::NonFiniteObjective { value } => {
                write!(f, "Objective evaluated to a non-finite value: {value}")
            }
            // ---- Options validation ----
            PulseError::InvalidHorizon { value } => {
                write!(f, "Maximum horizon must be -1 (infinite) or >= 0; got: {value}")
            }
            PulseError::InvalidRegularization { value } => {
                write!(f, "Regularization must be finite and >= 0; got: {value}")
            }
            PulseError::InvalidThreshold { name, value, reason } => {
                write!(f, "Invalid {name}: {value}. {reason}")
            }
            // ---- Estimation / optimizer ----
            PulseError::Optimization(err) => {
                write!(f, "Optimizer failed: {err}")
            }
        }
    }
}

impl From<OptError> for PulseError {
    fn from(err: OptError) -> PulseError {
        PulseError::Optimization(err)
    }
}

/// Model failures raised inside the objective surface as
/// [`OptError::ObjectiveFailed`]; wrapped optimizer errors are unwrapped.
impl From<PulseError> for OptError {
    fn from(err: PulseError) -> OptError {
        match err {
            PulseError::Optimization(inner) => inner,
            other => OptError::ObjectiveFailed { text: other.to_string() },
        }
    }
}

/// Convert a [`PulseError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<PulseError> for pyo3::PyErr {
    fn from(err: PulseError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Model errors cross into the optimizer as `ObjectiveFailed`, while
    // wrapped optimizer errors come back out unchanged.
    //
    // Given
    // -----
    // - `MissingOutcome` and `Optimization(MissingThetaHat)`.
    //
    // Expect
    // ------
    // - `ObjectiveFailed` carrying the display text, and `MissingThetaHat`.
    fn pulse_error_round_trips_through_opt_error() {
        let missing = PulseError::MissingOutcome { index: 3, observation: 1, reward: 0.0 };
        let text = missing.to_string();

        let as_opt: OptError = missing.into();
        let unwrapped: OptError = PulseError::Optimization(OptError::MissingThetaHat).into();

        assert_eq!(as_opt, OptError::ObjectiveFailed { text });
        assert_eq!(unwrapped, OptError::MissingThetaHat);
    }
}
