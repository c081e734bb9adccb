use num_traits::{PrimInt, Unsigned};

pub use ailist_core::models::Interval;

/// Common interface for interval overlap structures.
///
/// Queries are half-open: an interval `[s, e)` overlaps `[start, end)` when
/// `s < end && e > start`.
pub trait Overlapper<I, T>: Send + Sync
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Build a query-ready structure, skipping intervals with `end < start`.
    fn build(intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized;

    /// Clones of every overlapping interval.
    fn find(&self, start: I, end: I) -> Vec<Interval<I, T>>;

    /// Lazily yield overlapping intervals. Order is implementation defined.
    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a>;

    /// Number of overlapping intervals.
    fn count_hits(&self, start: I, end: I) -> usize {
        self.find_iter(start, end).count()
    }

    /// Whether anything overlaps `[start, end)`.
    fn has_overlap(&self, start: I, end: I) -> bool {
        self.find_iter(start, end).next().is_some()
    }
}
