use num_traits::{PrimInt, Unsigned};

use ailist_core::models::Interval;

use crate::errors::AIListResult;

/// Append-only storage for raw intervals, kept in insertion order.
///
/// The store also tracks the smallest start and the largest end seen so far,
/// so the span of an index is always available without a scan.
#[derive(Debug, Clone)]
pub struct IntervalStore<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    intervals: Vec<Interval<I, T>>,
    first: Option<I>,
    last: Option<I>,
}

impl<I, T> Default for IntervalStore<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T> IntervalStore<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            intervals: Vec::with_capacity(cap),
            first: None,
            last: None,
        }
    }

    ///
    /// Validate and append an interval.
    ///
    /// # Arguments
    /// - interval: the interval to store
    ///
    /// # Returns
    /// - `Err(AIListError::InvalidInterval)` if `end < start`; the store is left untouched
    pub fn push(&mut self, interval: Interval<I, T>) -> AIListResult<()> {
        let interval = Interval::new(interval.start, interval.end, interval.val)?;
        self.append(interval);
        Ok(())
    }

    /// Append an interval already known to satisfy `start <= end`.
    pub(crate) fn append(&mut self, interval: Interval<I, T>) {
        self.first = Some(self.first.map_or(interval.start, |f| f.min(interval.start)));
        self.last = Some(self.last.map_or(interval.end, |l| l.max(interval.end)));
        self.intervals.push(interval);
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Smallest start, or `None` when empty.
    pub fn first(&self) -> Option<I> {
        self.first
    }

    /// Largest end, or `None` when empty.
    pub fn last(&self) -> Option<I> {
        self.last
    }

    pub fn as_slice(&self) -> &[Interval<I, T>] {
        &self.intervals
    }
}
