//! Weighted random choice over a fixed set of categorical values.

use rand::Rng;
use thiserror::Error;

/// Errors raised when a weighted table cannot be built.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum WeightedTableError {
    /// The table was built without any items.
    #[error("weighted table requires at least one item")]
    Empty,
    /// Every item in the table carries a zero weight.
    #[error("weighted table requires at least one item with a positive weight")]
    NoPositiveWeight,
}

/// Immutable table that draws values according to their relative weights.
///
/// Construction precomputes a cumulative partition of `[0, 1)`; a draw
/// samples once and returns the value whose interval contains the sample.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedTable<T> {
    values: Vec<T>,
    weights: Vec<u32>,
    thresholds: Vec<f64>,
}

impl<T> WeightedTable<T>
where
    T: Clone + PartialEq,
{
    /// Builds a table from `(value, weight)` pairs.
    pub fn new<I>(items: I) -> Result<Self, WeightedTableError>
    where
        I: IntoIterator<Item = (T, u32)>,
    {
        let (values, weights): (Vec<T>, Vec<u32>) = items.into_iter().unzip();
        if values.is_empty() {
            return Err(WeightedTableError::Empty);
        }

        let total: u64 = weights.iter().map(|weight| u64::from(*weight)).sum();
        if total == 0 {
            return Err(WeightedTableError::NoPositiveWeight);
        }

        let mut running = 0_u64;
        let thresholds = weights
            .iter()
            .map(|weight| {
                running += u64::from(*weight);
                running as f64 / total as f64
            })
            .collect();

        Ok(Self {
            values,
            weights,
            thresholds,
        })
    }

    /// Draws one value. Zero-weight values are never returned.
    pub fn choose<R>(&self, rng: &mut R) -> T
    where
        R: Rng + ?Sized,
    {
        let sample: f64 = rng.gen();
        let index = self.thresholds.partition_point(|threshold| *threshold <= sample);
        self.values[index.min(self.values.len() - 1)].clone()
    }

    /// Derives a new table with `removed` excluded and `added` merged in.
    ///
    /// A value in `added` that is already present takes the added weight.
    pub fn clone_with<I>(&self, removed: &[T], added: I) -> Result<Self, WeightedTableError>
    where
        I: IntoIterator<Item = (T, u32)>,
    {
        let mut items: Vec<(T, u32)> = self
            .iter()
            .filter(|(value, _)| !removed.contains(value))
            .map(|(value, weight)| (value.clone(), weight))
            .collect();

        for (value, weight) in added {
            match items.iter_mut().find(|(existing, _)| *existing == value) {
                Some(entry) => entry.1 = weight,
                None => items.push((value, weight)),
            }
        }

        Self::new(items)
    }

    /// Number of values in the table, including zero-weight ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; tables cannot be empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Weight assigned to `value`, if present.
    #[must_use]
    pub fn weight_of(&self, value: &T) -> Option<u32> {
        self.values
            .iter()
            .position(|candidate| candidate == value)
            .map(|index| self.weights[index])
    }

    /// Iterates over `(value, weight)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, u32)> {
        self.values.iter().zip(self.weights.iter().copied())
    }
}
