//! Temporally extended features and weighted feature sets.
//!
//! Purpose
//! -------
//! Define the vocabulary PULSE learns over:
//! - [`BasisFeature`]: an atomic predicate "the action / observation /
//!   reward at relative time `offset` equals `value`".
//! - [`Feature`]: a conjunction of basis features.
//! - [`FeatureSet`]: the weighted features of a model, in a fixed
//!   deterministic order that defines feature-matrix rows.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every basis feature has `time_offset <= 0`; [`BasisFeature::new`]
//!   rejects anything else.
//! - Basis features order by `(kind, time_offset, value)` with
//!   `f64::total_cmp` on the value, so two basis features that constrain the
//!   same variable at the same time are always adjacent inside a
//!   [`Feature`]. Contradiction detection relies on this.
//! - A contradictory feature can be built; it is removed by pruning during
//!   expansion, not prevented at construction.
//!
//! Conventions
//! -----------
//! - Offset `0` is the step being predicted, `-1` the step before, etc.
//! - Values are stored as `f64` for all kinds; integer ids convert exactly.
use crate::pulse::{
    core::data::canonical_value,
    errors::{PulseError, PulseResult},
};
use ndarray::Array1;
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, btree_map},
    fmt,
};

/// Which variable of a data point a basis feature inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureKind {
    Action,
    Observation,
    Reward,
}

impl FeatureKind {
    /// One-letter tag used by the diagnostic dump.
    pub fn tag(self) -> char {
        match self {
            FeatureKind::Action => 'a',
            FeatureKind::Observation => 'o',
            FeatureKind::Reward => 'r',
        }
    }
}

/// `kind(value, time_offset)`: a single equality test on the history.
#[derive(Debug, Clone, Copy)]
pub struct BasisFeature {
    kind: FeatureKind,
    time_offset: i32,
    value: f64,
}

impl BasisFeature {
    /// # Errors
    /// [`PulseError::PositiveTimeOffset`] if `time_offset > 0`.
    pub fn new(kind: FeatureKind, time_offset: i32, value: f64) -> PulseResult<Self> {
        if time_offset > 0 {
            return Err(PulseError::PositiveTimeOffset { offset: time_offset });
        }
        Ok(Self { kind, time_offset, value: canonical_value(value) })
    }

    pub fn action(time_offset: i32, action: i32) -> PulseResult<Self> {
        Self::new(FeatureKind::Action, time_offset, f64::from(action))
    }

    pub fn observation(time_offset: i32, observation: i32) -> PulseResult<Self> {
        Self::new(FeatureKind::Observation, time_offset, f64::from(observation))
    }

    pub fn reward(time_offset: i32, reward: f64) -> PulseResult<Self> {
        Self::new(FeatureKind::Reward, time_offset, reward)
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn time_offset(&self) -> i32 {
        self.time_offset
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Same variable at the same time but a different value.
    pub fn contradicts(&self, other: &BasisFeature) -> bool {
        self.kind == other.kind
            && self.time_offset == other.time_offset
            && self.value.total_cmp(&other.value) != Ordering::Equal
    }
}

impl PartialEq for BasisFeature {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BasisFeature {}

impl PartialOrd for BasisFeature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BasisFeature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then(self.time_offset.cmp(&other.time_offset))
            .then(self.value.total_cmp(&other.value))
    }
}

impl fmt::Display for BasisFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.kind.tag(), self.value, self.time_offset)
    }
}

/// Conjunction of basis features.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Feature(BTreeSet<BasisFeature>);

impl Feature {
    pub fn singleton(basis: BasisFeature) -> Self {
        Self(BTreeSet::from([basis]))
    }

    /// Copy of `self` with `basis` added (a no-op if already present).
    pub fn with(&self, basis: BasisFeature) -> Self {
        let mut set = self.0.clone();
        set.insert(basis);
        Self(set)
    }

    pub fn basis(&self) -> impl Iterator<Item = &BasisFeature> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Most negative time offset, `0` for the empty conjunction.
    pub fn min_offset(&self) -> i32 {
        self.0.iter().map(|b| b.time_offset).min().unwrap_or(0).min(0)
    }

    /// Holds two adjacent basis features that can never be true together.
    pub fn is_contradictory(&self) -> bool {
        self.0.iter().zip(self.0.iter().skip(1)).any(|(a, b)| a.contradicts(b))
    }
}

impl FromIterator<BasisFeature> for Feature {
    fn from_iter<I: IntoIterator<Item = BasisFeature>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ordered map from feature to weight.
///
/// Iteration order is the `Feature` order and doubles as the row order of
/// every feature matrix and the coordinate order of the weight vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    features: BTreeMap<Feature, f64>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Insert or overwrite the weight of `feature`.
    pub fn insert(&mut self, feature: Feature, weight: f64) -> Option<f64> {
        self.features.insert(feature, weight)
    }

    /// Insert with weight `0.0` unless the feature is already present.
    pub fn insert_candidate(&mut self, feature: Feature) -> bool {
        match self.features.entry(feature) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(0.0);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, feature: &Feature) -> Option<f64> {
        self.features.get(feature).copied()
    }

    pub fn contains(&self, feature: &Feature) -> bool {
        self.features.contains_key(feature)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Feature, f64> {
        self.features.iter()
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.keys()
    }

    /// Weights in row order.
    pub fn weights(&self) -> Array1<f64> {
        self.features.values().copied().collect()
    }

    /// Overwrite all weights from a vector in row order.
    ///
    /// # Errors
    /// [`PulseError::WeightLengthMismatch`] if `weights.len() != self.len()`.
    pub fn set_weights(&mut self, weights: &Array1<f64>) -> PulseResult<()> {
        if weights.len() != self.features.len() {
            return Err(PulseError::WeightLengthMismatch {
                expected: self.features.len(),
                actual: weights.len(),
            });
        }
        for (slot, &w) in self.features.values_mut().zip(weights.iter()) {
            *slot = w;
        }
        Ok(())
    }

    /// Most negative time offset of any feature, `0` if empty.
    pub fn min_offset(&self) -> i32 {
        self.features.keys().map(Feature::min_offset).min().unwrap_or(0)
    }

    /// Keep only features for which `keep(feature, weight)` holds.
    pub fn filtered(self, mut keep: impl FnMut(&Feature, f64) -> bool) -> Self {
        Self { features: self.features.into_iter().filter(|(f, w)| keep(f, *w)).collect() }
    }

    pub fn clear(&mut self) {
        self.features.clear();
    }
}

impl<'a> IntoIterator for &'a FeatureSet {
    type Item = (&'a Feature, &'a f64);
    type IntoIter = btree_map::Iter<'a, Feature, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

impl FromIterator<(Feature, f64)> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = (Feature, f64)>>(iter: I) -> Self {
        Self { features: iter.into_iter().collect() }
    }
}

/// Human-readable dump for diagnostics; the layout is not a stable format.
impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.features.is_empty() {
            return writeln!(f, "    empty");
        }
        for (k, (feature, weight)) in self.features.iter().enumerate() {
            writeln!(f, "Feature {} ({})", k + 1, weight)?;
            for basis in feature.basis() {
                writeln!(f, "    {basis}")?;
            }
        }
        Ok(())
    }
}
