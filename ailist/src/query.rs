use num_traits::{PrimInt, Unsigned};
use rayon::prelude::*;

use ailist_core::models::Interval;

use crate::ailist::AIList;
use crate::decompose::Components;
use crate::errors::{AIListError, AIListResult};
use crate::store::IntervalStore;

impl<I> Components<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    /// Call `f` with the rank of every interval overlapping `[start, end)`.
    ///
    /// Long components are searched: find the last interval starting before `end`,
    /// then walk left until the running max end can no longer reach past `start`.
    /// Short components are scanned front to back.
    pub(crate) fn for_each_overlap<F>(
        &self,
        start: I,
        end: I,
        linear_scan_threshold: usize,
        mut f: F,
    ) where
        F: FnMut(usize),
    {
        for range in self.ranges() {
            let starts = &self.starts[range.clone()];
            let ends = &self.ends[range.clone()];
            let max_ends = &self.max_ends[range.clone()];
            let ranks = &self.ranks[range];

            if starts.len() > linear_scan_threshold {
                let mut i = starts.partition_point(|&x| x < end);
                while i > 0 {
                    i -= 1;
                    if max_ends[i] <= start {
                        // nothing further left can reach the query
                        break;
                    }
                    // maintain start inclusive, end exclusive
                    if ends[i] > start {
                        f(ranks[i]);
                    }
                }
            } else {
                for i in 0..starts.len() {
                    if starts[i] < end && ends[i] > start {
                        f(ranks[i]);
                    }
                }
            }
        }
    }

    pub(crate) fn count_overlaps(&self, start: I, end: I, linear_scan_threshold: usize) -> usize {
        let mut hits = 0;
        self.for_each_overlap(start, end, linear_scan_threshold, |_| hits += 1);
        hits
    }
}

impl<I, T> AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Ranks of the intervals overlapping `[start, end)`, ascending.
    pub(crate) fn overlapping_ranks(&self, start: I, end: I) -> Vec<usize> {
        let mut ranks = Vec::new();
        self.layout()
            .for_each_overlap(start, end, self.config().linear_scan_threshold, |rank| {
                ranks.push(rank)
            });
        ranks.sort_unstable();
        ranks
    }

    ///
    /// Find every interval overlapping `[start, end)`.
    ///
    /// An interval overlaps when `interval.start < end && interval.end > start`.
    ///
    /// # Arguments
    /// - start: query start (inclusive)
    /// - end: query end (exclusive)
    ///
    /// # Returns
    /// - a new AIList holding copies of the overlapping intervals, sorted by `(start, end)`
    pub fn intersect(&self, start: I, end: I) -> AIList<I, T> {
        let ranks = self.overlapping_ranks(start, end);
        let mut store = IntervalStore::with_capacity(ranks.len());
        for rank in ranks {
            store.append(self.interval_at_rank(rank).clone());
        }
        self.with_store(store)
    }

    /// Number of intervals overlapping `[start, end)`, without collecting them.
    pub fn count_overlaps(&self, start: I, end: I) -> usize {
        self.layout()
            .count_overlaps(start, end, self.config().linear_scan_threshold)
    }

    ///
    /// Count overlaps for many query ranges at once.
    ///
    /// Queries are independent and run in parallel over the shared layout.
    ///
    /// # Arguments
    /// - starts: query starts
    /// - ends: query ends, paired with `starts` by position
    ///
    /// # Returns
    /// - one hit count per query, or `Err(AIListError::LengthMismatch)` if the slices differ in length
    pub fn nhits_from_array(&self, starts: &[I], ends: &[I]) -> AIListResult<Vec<usize>> {
        if starts.len() != ends.len() {
            return Err(AIListError::LengthMismatch {
                starts: starts.len(),
                ends: ends.len(),
            });
        }

        let layout = self.layout();
        let threshold = self.config().linear_scan_threshold;

        Ok(starts
            .par_iter()
            .zip(ends.par_iter())
            .map(|(&start, &end)| layout.count_overlaps(start, end, threshold))
            .collect())
    }
}

/// An iterator over intervals in an [`AIList`] that overlap with a query range.
///
/// This struct is created by the [`find_iter`](crate::Overlapper::find_iter) method on [`AIList`].
/// It lazily yields references to intervals that overlap with the specified query range.
///
/// Components are visited one after the other and each one is walked from its right
/// end, so results are *not* in `(start, end)` order; use
/// [`intersect`](AIList::intersect) when order matters.
///
/// # Examples
///
/// ```
/// use ailist::{AIList, Overlapper, Interval};
///
/// let intervals = vec![
///     Interval { start: 10u32, end: 20, val: "a" },
///     Interval { start: 15, end: 25, val: "b" },
/// ];
///
/// let ailist = AIList::build(intervals);
///
/// // The iterator is created by find_iter
/// for interval in ailist.find_iter(12, 18) {
///     println!("Found: {}", interval.val);
/// }
/// ```
#[derive(Debug)]
pub struct IterFind<'a, I, T>
where
    T: Eq + Clone + Send + Sync + 'a,
    I: PrimInt + Unsigned + Send + Sync,
{
    intervals: &'a [Interval<I, T>],
    layout: &'a Components<I>,
    header_list_idx: usize,
    list_idx: Option<usize>,
    start: I,
    stop: I,
}

impl<'a, I, T> IterFind<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync + 'a,
    T: Eq + Clone + Send + Sync,
{
    pub(crate) fn new(ailist: &'a AIList<I, T>, start: I, stop: I) -> Self {
        Self {
            intervals: ailist.intervals(),
            layout: ailist.layout(),
            header_list_idx: 0,
            list_idx: None,
            start,
            stop,
        }
    }
}

impl<'a, I, T> Iterator for IterFind<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync + 'a,
{
    type Item = &'a Interval<I, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let layout = self.layout;
        let intervals = self.intervals;
        let stop = self.stop;

        while self.header_list_idx < layout.num_components() {
            let range = layout.header_list[self.header_list_idx]
                ..layout.header_list[self.header_list_idx + 1];
            let starts = &layout.starts[range.clone()];
            let ends = &layout.ends[range.clone()];
            let max_ends = &layout.max_ends[range.clone()];
            let ranks = &layout.ranks[range];

            let i = self
                .list_idx
                .get_or_insert_with(|| starts.partition_point(|&x| x < stop));

            while *i > 0 {
                *i -= 1;
                if max_ends[*i] <= self.start {
                    // there is no further intersection, try the next component
                    break;
                }
                if ends[*i] > self.start {
                    return Some(&intervals[layout.sorted[ranks[*i]]]);
                }
            }
            self.list_idx = None;
            self.header_list_idx += 1;
        }
        None
    }
}
