use std::mem::swap;
use std::ops::Range;

use log::debug;
use num_traits::{PrimInt, Unsigned};

use ailist_core::models::Interval;

use crate::config::AIListConfig;

/// The query-ready layout of an [`AIList`](crate::AIList).
///
/// All components are stored back to back in flat arrays; `header_list` holds the
/// offsets where each component begins, followed by the total length. Within a
/// component the intervals are sorted by `(start, end)` and `max_ends[i]` is the
/// largest end from the first element of that component up to `i`.
///
/// Intervals are referred to by their *rank*, their position in the global
/// `(start, end)` order. `sorted[rank]` gives the insertion index into the store.
#[derive(Debug, Clone, Default)]
pub(crate) struct Components<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    pub(crate) starts: Vec<I>,
    pub(crate) ends: Vec<I>,
    pub(crate) max_ends: Vec<I>,
    pub(crate) ranks: Vec<usize>,
    pub(crate) header_list: Vec<usize>,
    pub(crate) sorted: Vec<usize>,
}

impl<I> Components<I>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    fn with_capacity(cap: usize) -> Self {
        Self {
            starts: Vec::with_capacity(cap),
            ends: Vec::with_capacity(cap),
            max_ends: Vec::with_capacity(cap),
            ranks: Vec::with_capacity(cap),
            header_list: vec![0],
            sorted: Vec::new(),
        }
    }

    /// Append one component made of the given ranks, which must already be in order.
    fn push_component(&mut self, ranks: &[usize], starts: &[I], ends: &[I]) {
        let mut max = I::zero();
        for &rank in ranks {
            let end = ends[rank];
            max = if max > end { max } else { end };

            self.starts.push(starts[rank]);
            self.ends.push(end);
            self.max_ends.push(max);
            self.ranks.push(rank);
        }
        self.header_list.push(self.starts.len());
    }

    pub(crate) fn num_components(&self) -> usize {
        self.header_list.len() - 1
    }

    /// Index ranges of each component inside the flat arrays.
    pub(crate) fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.header_list.windows(2).map(|w| w[0]..w[1])
    }
}

/// Scratch space for one decomposition pass.
#[derive(Debug, Default)]
struct DecomposeResult {
    /// Ranks staying in the component being built.
    kept: Vec<usize>,
    /// Ranks extracted for the next pass.
    l2: Vec<usize>,
}

impl DecomposeResult {
    /// Clear the contents of the [`DecomposeResult`], maintaining capacity.
    fn clear(&mut self) {
        self.kept.clear();
        self.l2.clear();
    }

    /// Create an empty [`DecomposeResult`] with the given `cap` capacity.
    fn with_capacity(cap: usize) -> Self {
        Self {
            kept: Vec::with_capacity(cap),
            l2: Vec::with_capacity(cap),
        }
    }
}

/// Splits a set of intervals into components.
///
/// A single sorted list with a running max end degrades to a linear scan when long
/// intervals cover many short ones. Each pass moves intervals that cover most of
/// their successors into a new list, which becomes the next component, so every
/// component stays shallow.
#[derive(Debug, Clone)]
pub(crate) struct Decomposer {
    min_coverage: usize,
    max_components: usize,
    min_component_len: usize,
}

impl Decomposer {
    pub(crate) fn new(config: &AIListConfig) -> Self {
        Self {
            min_coverage: config.min_coverage,
            max_components: config.max_components,
            min_component_len: config.min_component_len(),
        }
    }

    ///
    /// Build the component layout for a set of intervals.
    ///
    /// # Arguments
    /// - intervals: the raw intervals, in insertion order
    ///
    /// # Returns
    /// - the full layout; the input is left untouched
    pub(crate) fn decompose<I, T>(&self, intervals: &[Interval<I, T>]) -> Components<I>
    where
        I: PrimInt + Unsigned + Send + Sync,
        T: Eq + Clone + Send + Sync,
    {
        let n = intervals.len();

        // stable, so equal intervals keep their insertion order
        let mut sorted: Vec<usize> = (0..n).collect();
        sorted.sort_by(|&a, &b| intervals[a].cmp(&intervals[b]));

        let starts: Vec<I> = sorted.iter().map(|&id| intervals[id].start).collect();
        let ends: Vec<I> = sorted.iter().map(|&id| intervals[id].end).collect();

        let mut layout = Components::with_capacity(n);
        let mut working: Vec<usize> = (0..n).collect();

        if n == 0 {
            // nothing to lay out
        } else if n <= self.min_component_len || self.max_components == 1 {
            layout.push_component(&working, &starts, &ends);
        } else {
            let mut scratch = DecomposeResult::with_capacity(n);

            loop {
                self.extract(&working, &ends, &mut scratch);
                layout.push_component(&scratch.kept, &starts, &ends);
                swap(&mut working, &mut scratch.l2);

                if working.len() <= self.min_component_len
                    || layout.num_components() + 1 >= self.max_components
                {
                    if !working.is_empty() {
                        layout.push_component(&working, &starts, &ends);
                    }
                    break;
                }
            }
        }

        layout.sorted = sorted;

        debug!(
            "decomposed {} intervals into {} components: {:?}",
            n,
            layout.num_components(),
            layout.ranges().map(|r| r.len()).collect::<Vec<_>>()
        );

        layout
    }

    /// One decomposition pass over `working`, splitting it into `kept` and `l2`.
    ///
    /// An interval is extracted when, among the next `window - 1` intervals, fewer
    /// than `half - 1` end at or after it. The trailing `window` intervals always stay.
    fn extract<I>(&self, working: &[usize], ends: &[I], scratch: &mut DecomposeResult)
    where
        I: PrimInt + Unsigned + Send + Sync,
    {
        scratch.clear();

        let half = self.min_coverage / 2;
        let window = self.min_coverage + half;
        let tail = working.len().saturating_sub(window);

        for (t, &rank) in working[..tail].iter().enumerate() {
            let end = ends[rank];
            let mut not_covered = 1;
            let mut j = 1;

            while j < window && not_covered < half {
                if ends[working[t + j]] >= end {
                    not_covered += 1;
                }
                j += 1;
            }

            if not_covered < half {
                scratch.l2.push(rank);
            } else {
                scratch.kept.push(rank);
            }
        }

        scratch.kept.extend_from_slice(&working[tail..]);
    }
}
