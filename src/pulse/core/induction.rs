//! Feature induction: seeding, expansion with contradiction pruning, and
//! shrinkage.
//!
//! Purpose
//! -------
//! Grow and prune the structure of a [`FeatureSet`] between weight fits.
//! The functions here are pure: they take a set and return a new one, and
//! never touch weights except to initialise new candidates at `0.0`.
//!
//! Key behaviors
//! -------------
//! - [`seed`]: one singleton per distinct action, observation and reward,
//!   all at offset 0.
//! - [`expand`]: conjoin every existing feature with every basis feature at
//!   offsets `0 ..= bound`, drop contradictory conjunctions, and keep prior
//!   weights.
//! - [`shrink`]: drop features whose weight is exactly `0.0`.
//!
//! Invariants & assumptions
//! ------------------------
//! - After [`expand`] no feature contains two basis features for the same
//!   variable and time with different values.
//! - Features present before [`expand`] keep their weight; every new
//!   feature starts at `0.0`.
use crate::pulse::{
    core::{
        data::DistinctValues,
        features::{BasisFeature, Feature, FeatureSet},
        options::MaximumHorizon,
    },
    errors::PulseResult,
};

/// All basis features at `offset` for the given distinct values.
fn basis_at(values: &DistinctValues, offset: i32) -> PulseResult<Vec<BasisFeature>> {
    let mut basis =
        Vec::with_capacity(values.actions.len() + values.observations.len() + values.rewards.len());
    for &a in &values.actions {
        basis.push(BasisFeature::action(offset, a)?);
    }
    for &o in &values.observations {
        basis.push(BasisFeature::observation(offset, o)?);
    }
    for &r in &values.rewards {
        basis.push(BasisFeature::reward(offset, r)?);
    }
    Ok(basis)
}

/// Singletons at offset 0, all with weight `0.0`.
///
/// # Errors
/// Never fails for offset 0; the `Result` mirrors [`BasisFeature::new`].
pub fn seed(values: &DistinctValues) -> PulseResult<FeatureSet> {
    Ok(basis_at(values, 0)?.into_iter().map(|b| (Feature::singleton(b), 0.0)).collect())
}

/// Most negative offset the next expansion may use.
///
/// `min_offset - extension`, clamped to `-h` for a finite maximum horizon `h`.
pub fn expansion_bound(min_offset: i32, extension: usize, horizon: MaximumHorizon) -> i32 {
    let extended = min_offset.saturating_sub(i32::try_from(extension).unwrap_or(i32::MAX));
    match horizon {
        MaximumHorizon::Finite(h) => {
            let limit = -i32::try_from(h).unwrap_or(i32::MAX);
            if extended < limit { limit } else { extended }
        }
        MaximumHorizon::Infinite => extended,
    }
}

/// One expansion step.
///
/// An empty set is seeded instead of expanded.
///
/// # Errors
/// Propagates [`BasisFeature::new`] failures (impossible for offsets `<= 0`).
pub fn expand(
    set: &FeatureSet, values: &DistinctValues, extension: usize, horizon: MaximumHorizon,
) -> PulseResult<FeatureSet> {
    if set.is_empty() {
        return seed(values);
    }
    let bound = expansion_bound(set.min_offset(), extension, horizon);

    let mut candidates = set.clone();
    for offset in (bound..=0).rev() {
        let basis = basis_at(values, offset)?;
        for feature in set.features() {
            for b in &basis {
                candidates.insert_candidate(feature.with(*b));
            }
        }
    }

    let mut expanded = candidates.filtered(|feature, _| !feature.is_contradictory());
    for (feature, &weight) in set {
        expanded.insert(feature.clone(), weight);
    }
    Ok(expanded)
}

/// Remove features whose weight is exactly `0.0`.
pub fn shrink(set: FeatureSet) -> FeatureSet {
    set.filtered(|_, weight| weight != 0.0)
}
