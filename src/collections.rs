use std::cmp::Ordering;
use std::hash::BuildHasherDefault;
use std::ops::{Add, Sub};

use indexmap::{IndexMap, IndexSet};
use num_traits::Zero;
use rustc_hash::FxHasher;

pub mod priority_queue;

pub use priority_queue::{Keyed, PriorityQueue};

/// Use indexmap for fast lookups and rustc_hash for fast hashing
pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Insertion-ordered set, same hashing as [`FxIndexMap`]
pub(crate) type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

pub(crate) type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub(crate) type FxHashSet<T> = rustc_hash::FxHashSet<T>;


/// Totally ordered path cost.
///
/// Vertex costs are floats; heaps and the generic graph algorithms need `Ord`,
/// so comparisons go through `f64::total_cmp`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Cost(pub f64);

impl Cost {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Self) -> Self::Output {
        Cost(self.0 + rhs.0)
    }
}

impl Sub for Cost {
    type Output = Cost;

    fn sub(self, rhs: Self) -> Self::Output {
        Cost(self.0 - rhs.0)
    }
}

impl Zero for Cost {
    fn zero() -> Self {
        Cost(0.0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl From<f64> for Cost {
    fn from(value: f64) -> Self {
        Cost(value)
    }
}
