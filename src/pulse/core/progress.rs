//! Shared progress counter for parallel matrix builds.
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Lock-free counter that rayon workers bump as they finish items.
///
/// Clones share the same count.
#[derive(Clone, Debug)]
pub struct ProgressCounter {
    current: Arc<AtomicU64>,
    total: u64,
}

impl ProgressCounter {
    pub fn new(total: u64) -> Self {
        Self { current: Arc::new(AtomicU64::new(0)), total }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn get(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    pub fn inc(&self, amount: u64) {
        self.current.fetch_add(amount, Ordering::Relaxed);
    }

    /// Completed share in `[0, 1]`; `1.0` when there is nothing to do.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.get() as f64 / self.total as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    // Purpose
    // -------
    // Increments from many rayon workers all land in the shared count.
    //
    // Given
    // -----
    // - A counter over 1000 items bumped once per item in parallel.
    //
    // Expect
    // ------
    // - `get() == 1000` and `fraction() == 1.0`.
    fn counter_is_shared_across_workers() {
        let counter = ProgressCounter::new(1000);

        (0..1000).into_par_iter().for_each(|_| counter.inc(1));

        assert_eq!(counter.get(), 1000);
        assert_eq!(counter.fraction(), 1.0);
        assert_eq!(ProgressCounter::new(0).fraction(), 1.0);
    }
}
