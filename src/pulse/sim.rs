//! Synthetic 2×2 grid world used to exercise PULSE end to end.
//!
//! States are the four cells (0 upper-left, 1 upper-right, 2 lower-left,
//! 3 lower-right) and are observed directly. Actions are 0 up, 1 down,
//! 2 left, 3 right, 4 stay; moves into a wall leave the state unchanged.
//! The reward is `1` exactly when the agent arrives in cell 3 and was in
//! cell 0 two steps earlier, so predicting it needs two steps of history.
//!
//! Actions are drawn uniformly from a seeded [`StdRng`], which keeps every
//! generated sequence reproducible.
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::pulse::core::data::DataPoint;

pub const N_ACTIONS: i32 = 5;
pub const N_STATES: i32 = 4;

/// Next cell after taking `action` in `state`.
pub fn transition(state: i32, action: i32) -> i32 {
    match (state, action) {
        (0, 3) => 1,
        (0, 1) => 2,
        (1, 2) => 0,
        (1, 1) => 3,
        (2, 0) => 0,
        (2, 3) => 3,
        (3, 0) => 1,
        (3, 2) => 2,
        (s, _) => s,
    }
}

/// Reward for arriving in `observation` when the state two steps back was
/// `two_steps_back`.
pub fn reward(two_steps_back: i32, observation: i32) -> f64 {
    if two_steps_back == 0 && observation == 3 { 1.0 } else { 0.0 }
}

#[derive(Debug, Clone)]
pub struct GridWorld {
    rng: StdRng,
    /// State after the previous step.
    one_step: i32,
    /// State before the previous step.
    two_step: i32,
}

impl GridWorld {
    /// A world in the upper-left cell with both memories at 0.
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), one_step: 0, two_step: 0 }
    }

    pub fn state(&self) -> i32 {
        self.one_step
    }

    /// Take one uniformly random action and return the resulting step.
    pub fn step(&mut self) -> DataPoint {
        let action = self.rng.random_range(0..N_ACTIONS);
        self.step_with(action)
    }

    /// Take `action` and return the resulting step.
    pub fn step_with(&mut self, action: i32) -> DataPoint {
        let observation = transition(self.one_step, action);
        let r = reward(self.two_step, observation);
        self.two_step = self.one_step;
        self.one_step = observation;
        DataPoint::new(action, observation, r)
    }

    /// `n` consecutive random steps.
    pub fn generate(&mut self, n: usize) -> Vec<DataPoint> {
        (0..n).map(|_| self.step()).collect()
    }
}
