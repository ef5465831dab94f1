//! Injectable randomness for bet outcomes and account identifiers.

use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&self) -> f64;

    /// Uniform draw in `[0, bound)`. Returns 0 when `bound` is 0.
    fn next_below(&self, bound: u64) -> u64;
}

/// Backed by the thread-local generator from `rand`.
#[derive(Debug, Clone, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }

    fn next_below(&self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..bound)
    }
}

/// Replays fixed scripts of draws, cycling once exhausted.
/// Lets tests force win/lose outcomes and identifier collisions.
#[derive(Debug, Default)]
pub struct SequenceRandom {
    units: Vec<f64>,
    integers: Vec<u64>,
    unit_cursor: AtomicUsize,
    integer_cursor: AtomicUsize,
}

impl SequenceRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = f64>) -> Self {
        self.units = units.into_iter().collect();
        self
    }

    pub fn with_integers(mut self, integers: impl IntoIterator<Item = u64>) -> Self {
        self.integers = integers.into_iter().collect();
        self
    }

    fn next_of<T: Copy + Default>(values: &[T], cursor: &AtomicUsize) -> T {
        if values.is_empty() {
            return T::default();
        }
        let i = cursor.fetch_add(1, Ordering::SeqCst);
        values[i % values.len()]
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&self) -> f64 {
        Self::next_of(&self.units, &self.unit_cursor)
    }

    fn next_below(&self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        Self::next_of(&self.integers, &self.integer_cursor) % bound
    }
}
