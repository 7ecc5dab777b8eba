//! Outcome space: every (observation, reward) pair the model can predict.
//!
//! Outcomes are the cross product of distinct observations and distinct
//! rewards, observation-major: outcome `k` is
//! `(observations[k / n_rewards], rewards[k % n_rewards])`. Column `k` of a
//! feature matrix corresponds to outcome `k`.
use crate::pulse::core::data::{DataPoint, DistinctValues, canonical_value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeSpace {
    observations: Vec<i32>,
    rewards: Vec<f64>,
}

impl OutcomeSpace {
    pub fn from_values(values: &DistinctValues) -> Self {
        Self { observations: values.observations.clone(), rewards: values.rewards.clone() }
    }

    /// Copy of `self` that also contains the observation and reward of
    /// `point`. Prediction uses this for values unseen during training.
    pub fn extended_with(&self, point: &DataPoint) -> Self {
        let mut values = DistinctValues {
            actions: Vec::new(),
            observations: self.observations.clone(),
            rewards: self.rewards.clone(),
        };
        values.insert(point);
        Self::from_values(&values)
    }

    pub fn len(&self) -> usize {
        self.observations.len() * self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_rewards(&self) -> usize {
        self.rewards.len()
    }

    /// Column of `(observation, reward)`, if both values are known.
    pub fn index_of(&self, observation: i32, reward: f64) -> Option<usize> {
        let o = self.observations.binary_search(&observation).ok()?;
        let reward = canonical_value(reward);
        let r = self.rewards.binary_search_by(|probe| probe.total_cmp(&reward)).ok()?;
        Some(o * self.rewards.len() + r)
    }

    /// `(observation, reward)` of column `k`.
    pub fn outcome(&self, k: usize) -> Option<(i32, f64)> {
        let n_rewards = self.rewards.len();
        if n_rewards == 0 || k >= self.len() {
            return None;
        }
        Some((self.observations[k / n_rewards], self.rewards[k % n_rewards]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.observations.iter().flat_map(move |&o| self.rewards.iter().map(move |&r| (o, r)))
    }
}
