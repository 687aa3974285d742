//! Dependency-gated memoization cache of size one.

use std::convert::Infallible;

use crate::domain::models::{deep_equal_bounded, Snapshot, TimingConfig, DEFAULT_MAX_DEPTH};

/// Caches the result of one calculation together with the dependency
/// snapshot it was computed from.
///
/// The stored result always belongs to the stored snapshot: a failed or
/// panicking recalculation never leaves a stale result behind a new snapshot.
///
/// # Example
///
/// ```
/// use pacer::services::MemoCell;
///
/// let mut cell = MemoCell::new();
/// let total = *cell.compute(vec![1_i64, 2], || 1 + 2);
/// assert_eq!(total, 3);
///
/// // Same dependencies: the calculation is skipped
/// cell.compute(vec![1_i64, 2], || unreachable!());
/// assert_eq!(cell.recomputations(), 1);
/// ```
#[derive(Debug)]
pub struct MemoCell<T> {
    entry: Option<(Snapshot, T)>,
    max_depth: usize,
    recomputations: u64,
}

impl<T> Default for MemoCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoCell<T> {
    /// Create an empty cell; the first `compute` always runs the calculation.
    pub const fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create an empty cell comparing snapshots at most `max_depth` levels
    /// deep. Deeper snapshots are treated as changed.
    pub const fn with_max_depth(max_depth: usize) -> Self {
        Self {
            entry: None,
            max_depth,
            recomputations: 0,
        }
    }

    /// Create an empty cell using the configured comparison depth.
    pub const fn from_config(config: &TimingConfig) -> Self {
        Self::with_max_depth(config.max_compare_depth)
    }

    /// Return the cached result for `deps`, running `calculation` first if
    /// `deps` differs from the stored snapshot.
    pub fn compute<F>(&mut self, deps: impl Into<Snapshot>, calculation: F) -> &T
    where
        F: FnOnce() -> T,
    {
        match self.try_compute(deps, || Ok::<T, Infallible>(calculation())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`compute`](Self::compute).
    ///
    /// On error the cell keeps its previous snapshot and result.
    pub fn try_compute<F, E>(&mut self, deps: impl Into<Snapshot>, calculation: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let deps = deps.into();

        let entry = match self.entry.take() {
            Some(entry) if self.unchanged(&entry.0, &deps) => {
                tracing::trace!("memoized result reused");
                entry
            }
            previous => match calculation() {
                Ok(value) => {
                    self.recomputations += 1;
                    tracing::trace!(
                        recomputations = self.recomputations,
                        "memoized result recomputed"
                    );
                    (deps, value)
                }
                Err(err) => {
                    self.entry = previous;
                    return Err(err);
                }
            },
        };

        Ok(&self.entry.insert(entry).1)
    }

    fn unchanged(&self, stored: &Snapshot, deps: &Snapshot) -> bool {
        match deep_equal_bounded(stored, deps, self.max_depth) {
            Ok(equal) => equal,
            Err(err) => {
                tracing::warn!(error = %err, "dependency comparison hit depth limit, recomputing");
                false
            }
        }
    }

    /// Cached result, if any.
    pub fn current(&self) -> Option<&T> {
        self.entry.as_ref().map(|(_, value)| value)
    }

    /// Snapshot the cached result was computed from.
    pub fn dependencies(&self) -> Option<&Snapshot> {
        self.entry.as_ref().map(|(deps, _)| deps)
    }

    /// Drop the cached result so the next `compute` recalculates.
    pub fn invalidate(&mut self) -> Option<T> {
        self.entry.take().map(|(_, value)| value)
    }

    /// Number of times a calculation has produced a new result.
    pub const fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
