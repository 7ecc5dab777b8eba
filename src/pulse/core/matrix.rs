//! Feature-matrix construction.
//!
//! Purpose
//! -------
//! For a data index `t`, evaluate every feature of a [`FeatureSet`] against
//! every hypothesised outcome of an [`OutcomeSpace`]:
//! `F[f, k] = 1` iff feature `f` holds at `t` when the observation and reward
//! at `t` are replaced by outcome `k`.
//!
//! Key behaviors
//! -------------
//! - A basis feature reaching before the start of the sequence
//!   (`t + offset < 0`) is false. Short histories are valid input.
//! - Actions are part of the conditioning context, so `Action` basis features
//!   always compare the recorded action, including at offset 0.
//! - `Observation` / `Reward` basis features at offset 0 compare the
//!   hypothesised outcome; at earlier offsets they compare recorded history.
//! - Every matrix records the column of the real outcome. A data point whose
//!   outcome is not in the space is an error.
//! - [`build_matrices`] builds one matrix per data index with rayon; only the
//!   progress counter is shared between workers.
use crate::pulse::{
    core::{
        data::{DataPoint, canonical_value},
        features::{BasisFeature, Feature, FeatureKind, FeatureSet},
        outcomes::OutcomeSpace,
        progress::ProgressCounter,
    },
    errors::{PulseError, PulseResult},
};
use ndarray::Array2;
use rayon::prelude::*;
use std::cmp::Ordering;

/// Indicator matrix of shape `(n_features, n_outcomes)` for one data index.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub values: Array2<f64>,
    /// Column of the outcome that actually occurred.
    pub true_outcome: usize,
}

impl FeatureMatrix {
    pub fn n_features(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_outcomes(&self) -> usize {
        self.values.ncols()
    }
}

fn same_value(a: f64, b: f64) -> bool {
    canonical_value(a).total_cmp(&canonical_value(b)) == Ordering::Equal
}

/// Truth value of `basis` at index `t` under hypothesised `outcome`.
///
/// `t` must be a valid index into `data`.
pub fn basis_holds(basis: &BasisFeature, data: &[DataPoint], t: usize, outcome: (i32, f64)) -> bool {
    let Some(idx) = t.checked_add_signed(basis.time_offset() as isize) else {
        return false;
    };
    let Some(point) = data.get(idx) else {
        return false;
    };
    let present = basis.time_offset() == 0;
    match basis.kind() {
        FeatureKind::Action => same_value(basis.value(), f64::from(point.action)),
        FeatureKind::Observation => {
            let observed = if present { outcome.0 } else { point.observation };
            same_value(basis.value(), f64::from(observed))
        }
        FeatureKind::Reward => {
            let observed = if present { outcome.1 } else { point.reward };
            same_value(basis.value(), observed)
        }
    }
}

/// Conjunction of [`basis_holds`] over all basis features.
pub fn feature_holds(feature: &Feature, data: &[DataPoint], t: usize, outcome: (i32, f64)) -> bool {
    feature.basis().all(|b| basis_holds(b, data, t, outcome))
}

/// Build the matrix for data index `t`.
///
/// # Errors
/// - [`PulseError::IndexOutOfRange`] if `t >= data.len()`.
/// - [`PulseError::MissingOutcome`] if the real outcome at `t` has no column.
pub fn build_matrix(
    features: &FeatureSet, outcomes: &OutcomeSpace, data: &[DataPoint], t: usize,
) -> PulseResult<FeatureMatrix> {
    let point = data.get(t).ok_or(PulseError::IndexOutOfRange { index: t, len: data.len() })?;
    let true_outcome = outcomes.index_of(point.observation, point.reward).ok_or(
        PulseError::MissingOutcome {
            index: t,
            observation: point.observation,
            reward: point.reward,
        },
    )?;

    let mut values = Array2::zeros((features.len(), outcomes.len()));
    for (f, feature) in features.features().enumerate() {
        for (k, outcome) in outcomes.iter().enumerate() {
            if feature_holds(feature, data, t, outcome) {
                values[[f, k]] = 1.0;
            }
        }
    }
    Ok(FeatureMatrix { values, true_outcome })
}

/// Build matrices for every index of `data`, in parallel.
///
/// # Errors
/// The first [`build_matrix`] error encountered by any worker.
pub fn build_matrices(
    features: &FeatureSet, outcomes: &OutcomeSpace, data: &[DataPoint],
    progress: &ProgressCounter,
) -> PulseResult<Vec<FeatureMatrix>> {
    (0..data.len())
        .into_par_iter()
        .map(|t| {
            let matrix = build_matrix(features, outcomes, data, t);
            progress.inc(1);
            matrix
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulse::core::data::DistinctValues;

    fn data() -> Vec<DataPoint> {
        vec![DataPoint::new(0, 1, 0.0), DataPoint::new(1, 2, 1.0), DataPoint::new(0, 2, 0.0)]
    }

    fn feature(basis: &[BasisFeature]) -> Feature {
        basis.iter().copied().collect()
    }

    #[test]
    // Purpose
    // -------
    // Offset-0 observations follow the hypothesised outcome, while actions
    // and past values follow the recorded history.
    //
    // Given
    // -----
    // - Index 2 of the fixture (previous observation 2, action 0).
    //
    // Expect
    // ------
    // - a(0,0) holds for any outcome; o(1,0) only for outcome observation 1;
    //   o(2,-1) holds; o(1,-1) does not.
    fn basis_features_split_present_and_past() {
        let data = data();
        let a0 = BasisFeature::action(0, 0).expect("valid");
        let o1_now = BasisFeature::observation(0, 1).expect("valid");
        let o2_prev = BasisFeature::observation(-1, 2).expect("valid");
        let o1_prev = BasisFeature::observation(-1, 1).expect("valid");

        assert!(basis_holds(&a0, &data, 2, (9, 9.0)));
        assert!(basis_holds(&o1_now, &data, 2, (1, 0.0)));
        assert!(!basis_holds(&o1_now, &data, 2, (2, 0.0)));
        assert!(basis_holds(&o2_prev, &data, 2, (1, 0.0)));
        assert!(!basis_holds(&o1_prev, &data, 2, (1, 0.0)));
    }

    #[test]
    // Purpose
    // -------
    // Features reaching before the start of the sequence are false rather
    // than errors.
    //
    // Given
    // -----
    // - r(0,-2) evaluated at index 1.
    //
    // Expect
    // ------
    // - `false`.
    fn insufficient_history_is_false() {
        let r = BasisFeature::reward(-2, 0.0).expect("valid");

        assert!(!basis_holds(&r, &data(), 1, (1, 0.0)));
    }

    #[test]
    // Purpose
    // -------
    // Matrix rows follow feature order, columns follow outcome order, and
    // the true column is recorded.
    //
    // Given
    // -----
    // - Features {o(2,0)} and {o(2,0), a(1,-1)} at index 2; outcomes
    //   observations [1, 2] × rewards [0, 1].
    //
    // Expect
    // ------
    // - Both rows are 1 exactly in the o=2 columns (2 and 3); true column 2.
    fn build_matrix_marks_satisfied_pairs() {
        let data = data();
        let outcomes = OutcomeSpace::from_values(&DistinctValues::from_data(&data));
        let o2 = BasisFeature::observation(0, 2).expect("valid");
        let a1_prev = BasisFeature::action(-1, 1).expect("valid");
        let mut set = FeatureSet::new();
        set.insert(feature(&[o2]), 0.0);
        set.insert(feature(&[o2, a1_prev]), 0.0);

        let m = build_matrix(&set, &outcomes, &data, 2).expect("outcome exists");

        assert_eq!(m.true_outcome, 2);
        assert_eq!(m.values.row(0).to_vec(), vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(m.values.row(1).to_vec(), vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    // Purpose
    // -------
    // A data point outside the outcome space is an invariant violation.
    //
    // Given
    // -----
    // - An outcome space without reward 1.0 and index 1 (reward 1.0).
    //
    // Expect
    // ------
    // - `MissingOutcome { index: 1, .. }`.
    fn build_matrix_requires_true_outcome() {
        let data = data();
        let outcomes = OutcomeSpace::from_values(&DistinctValues::from_data(&data[..1]));

        let result = build_matrix(&FeatureSet::new(), &outcomes, &data, 1);

        assert!(matches!(result, Err(PulseError::MissingOutcome { index: 1, .. })));
    }

    #[test]
    // Purpose
    // -------
    // The parallel build produces one matrix per index and reports progress.
    //
    // Given
    // -----
    // - The three-point fixture and an empty feature set.
    //
    // Expect
    // ------
    // - Three matrices with zero rows, and the counter at 3.
    fn build_matrices_covers_every_index() {
        let data = data();
        let outcomes = OutcomeSpace::from_values(&DistinctValues::from_data(&data));
        let progress = ProgressCounter::new(data.len() as u64);

        let matrices =
            build_matrices(&FeatureSet::new(), &outcomes, &data, &progress).expect("all outcomes exist");

        assert_eq!(matrices.len(), 3);
        assert!(matrices.iter().all(|m| m.n_features() == 0 && m.n_outcomes() == 4));
        assert_eq!(progress.get(), 3);
    }
}
