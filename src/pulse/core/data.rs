//! Sequence data containers for PULSE models.
//!
//! Purpose
//! -------
//! Represent one interaction step as a [`DataPoint`] `(action, observation,
//! reward)` and collect the distinct values seen in a training sequence as
//! [`DistinctValues`]. The distinct values seed the feature set and define
//! the outcome space.
//!
//! Invariants & assumptions
//! ------------------------
//! - Sequences are plain slices in time order; index `t` is step `t`.
//! - Rewards are arbitrary `f64`. Ordering and deduplication use
//!   `f64::total_cmp` after [`canonical_value`], so `-0.0` and `0.0` are the
//!   same value and NaN sorts after every finite value.
//! - `DistinctValues` lists are sorted ascending and duplicate-free.
//!
//! Conventions
//! -----------
//! - The ordering on `DataPoint` is lexicographic on
//!   `(action, observation, reward)`. It is used for grouping only and says
//!   nothing about time.
use std::cmp::Ordering;

/// Map `-0.0` to `0.0`; every other value is returned unchanged.
pub fn canonical_value(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

/// One step of an interaction sequence.
#[derive(Debug, Clone, Copy)]
pub struct DataPoint {
    pub action: i32,
    pub observation: i32,
    pub reward: f64,
}

impl DataPoint {
    pub fn new(action: i32, observation: i32, reward: f64) -> Self {
        Self { action, observation, reward: canonical_value(reward) }
    }
}

impl PartialEq for DataPoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DataPoint {}

impl PartialOrd for DataPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DataPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.action
            .cmp(&other.action)
            .then(self.observation.cmp(&other.observation))
            .then(canonical_value(self.reward).total_cmp(&canonical_value(other.reward)))
    }
}

impl From<(i32, i32, f64)> for DataPoint {
    fn from((action, observation, reward): (i32, i32, f64)) -> Self {
        Self::new(action, observation, reward)
    }
}

/// Distinct actions, observations and rewards of a sequence.
///
/// Rebuilt from scratch whenever the training data changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistinctValues {
    pub actions: Vec<i32>,
    pub observations: Vec<i32>,
    pub rewards: Vec<f64>,
}

impl DistinctValues {
    /// Collect the sorted distinct values of `data`.
    pub fn from_data(data: &[DataPoint]) -> Self {
        let mut values = Self::default();
        for point in data {
            values.insert(point);
        }
        values
    }

    /// Add the values of `point`, keeping every list sorted and unique.
    ///
    /// Returns `true` if anything was new.
    pub fn insert(&mut self, point: &DataPoint) -> bool {
        let a = insert_sorted(&mut self.actions, point.action, |x, y| x.cmp(y));
        let o = insert_sorted(&mut self.observations, point.observation, |x, y| x.cmp(y));
        let reward = canonical_value(point.reward);
        let r = insert_sorted(&mut self.rewards, reward, |x, y| x.total_cmp(y));
        a || o || r
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.observations.is_empty() && self.rewards.is_empty()
    }
}

fn insert_sorted<T: Copy>(values: &mut Vec<T>, value: T, cmp: impl Fn(&T, &T) -> Ordering) -> bool {
    match values.binary_search_by(|probe| cmp(probe, &value)) {
        Ok(_) => false,
        Err(pos) => {
            values.insert(pos, value);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Distinct values come out sorted and without duplicates.
    //
    // Given
    // -----
    // - Points with repeated and out-of-order actions, observations, rewards.
    //
    // Expect
    // ------
    // - actions [0, 2], observations [1, 3], rewards [-1, 0, 0.5].
    fn distinct_values_are_sorted_and_unique() {
        // Arrange
        let data = vec![
            DataPoint::new(2, 3, 0.5),
            DataPoint::new(0, 1, 0.0),
            DataPoint::new(2, 1, -1.0),
            DataPoint::new(0, 3, 0.5),
        ];

        // Act
        let values = DistinctValues::from_data(&data);

        // Assert
        assert_eq!(values.actions, vec![0, 2]);
        assert_eq!(values.observations, vec![1, 3]);
        assert_eq!(values.rewards, vec![-1.0, 0.0, 0.5]);
    }

    #[test]
    // Purpose
    // -------
    // `insert` reports whether the point contributed a new value.
    //
    // Given
    // -----
    // - Values built from a single point, then the same point and a point
    //   with an unseen reward.
    //
    // Expect
    // ------
    // - `false` for the repeat, `true` for the new reward.
    fn insert_reports_new_values() {
        let mut values = DistinctValues::from_data(&[DataPoint::new(1, 1, 0.0)]);

        assert!(!values.insert(&DataPoint::new(1, 1, 0.0)));
        assert!(values.insert(&DataPoint::new(1, 1, 2.0)));
        assert_eq!(values.rewards, vec![0.0, 2.0]);
    }

    #[test]
    // Purpose
    // -------
    // Ordering is lexicographic on (action, observation, reward).
    //
    // Given
    // -----
    // - Points differing in one component at a time.
    //
    // Expect
    // ------
    // - Action dominates observation, which dominates reward.
    fn data_point_ordering_is_lexicographic() {
        assert!(DataPoint::new(0, 5, 9.0) < DataPoint::new(1, 0, 0.0));
        assert!(DataPoint::new(1, 0, 9.0) < DataPoint::new(1, 1, 0.0));
        assert!(DataPoint::new(1, 1, 0.0) < DataPoint::new(1, 1, 0.5));
        assert_eq!(DataPoint::from((1, 2, 0.5)), DataPoint::new(1, 2, 0.5));
    }

    #[test]
    // Purpose
    // -------
    // A computed `-0.0` reward is the same value as `0.0`.
    //
    // Given
    // -----
    // - Points with rewards `0.0`, `-0.0` and `0.0 * -1.0`, one of them built
    //   through a struct literal that bypasses `DataPoint::new`.
    //
    // Expect
    // ------
    // - A single distinct reward `0.0` with a positive sign, and equal points.
    fn negative_zero_reward_is_zero() {
        let data = vec![
            DataPoint::new(0, 0, 0.0),
            DataPoint::new(0, 0, -0.0),
            DataPoint { action: 0, observation: 0, reward: 0.0 * -1.0 },
        ];

        let values = DistinctValues::from_data(&data);

        assert_eq!(values.rewards.len(), 1);
        assert!(values.rewards[0].is_sign_positive());
        assert!(DataPoint::new(1, 1, -0.0).reward.is_sign_positive());
        assert!(DataPoint::from((1, 1, -0.0)).reward.is_sign_positive());
        assert_eq!(data[0], data[2]);
    }
}
