//! Streaming facade over [`TemporallyExtendedModel`].
//!
//! Agents push `(action, observation, reward)` triples one step at a time and
//! periodically call [`SequenceLearner::fit`], which hands the accumulated
//! history to the model and runs the full induction loop. The learned feature
//! set survives [`SequenceLearner::clear`], so a learner can be refitted on a
//! fresh episode starting from what it already knows.
use crate::pulse::{
    core::{data::DataPoint, options::PulseOptions},
    errors::PulseResult,
    models::tem::TemporallyExtendedModel,
};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SequenceLearner {
    model: TemporallyExtendedModel,
    history: Vec<DataPoint>,
}

impl SequenceLearner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PulseOptions) -> Self {
        Self { model: TemporallyExtendedModel::with_options(options), history: Vec::new() }
    }

    /// Record one step of interaction.
    pub fn append(&mut self, action: i32, observation: i32, reward: f64) {
        self.history.push(DataPoint::new(action, observation, reward));
    }

    /// Forget the recorded history; the model is left untouched.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Fit the model on the recorded history and return the likelihood.
    ///
    /// # Errors
    /// Anything returned by [`TemporallyExtendedModel::optimize`].
    pub fn fit(&mut self) -> PulseResult<f64> {
        debug!(points = self.history.len(), "fitting on recorded history");
        self.model.set_data(&self.history);
        self.model.optimize()
    }

    /// Probability of the last step of `data` given the steps before it.
    ///
    /// # Errors
    /// [`PulseError::EmptySequence`](crate::pulse::errors::PulseError::EmptySequence)
    /// for an empty sequence.
    pub fn prediction(&self, data: &[DataPoint]) -> PulseResult<f64> {
        self.model.prediction(data)
    }

    pub fn history(&self) -> &[DataPoint] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn model(&self) -> &TemporallyExtendedModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut TemporallyExtendedModel {
        &mut self.model
    }
}
