use std::sync::OnceLock;

use log::warn;
use num_traits::{PrimInt, Unsigned};

use super::Overlapper;
use ailist_core::models::Interval;
use ailist_core::models::interval::coord_to_string;

use crate::config::AIListConfig;
use crate::decompose::{Components, Decomposer};
use crate::errors::{AIListError, AIListResult};
use crate::query::IterFind;
use crate::store::IntervalStore;

/// An Augmented Interval List for efficient genomic interval overlap queries.
///
/// From the following article: <https://academic.oup.com/bioinformatics/article/35/23/4907/5509521>
///
/// Intervals are collected into an append-only store, then decomposed into a few
/// sorted components, each annotated with a running maximum end. The decomposition
/// happens on [`construct`](AIList::construct) or lazily on the first query, and is
/// thrown away by the next insert.
///
/// Query results ([`intersect`](AIList::intersect), `merge`, `filter`) are new,
/// independently owned lists.
///
/// # Examples
///
/// ```
/// use ailist::AIList;
///
/// let mut fragments: AIList<u32, ()> = AIList::new();
/// fragments.add(10, 11).unwrap();
/// fragments.add(15, 19).unwrap();
/// fragments.add(11, 13).unwrap();
/// fragments.add(30, 100).unwrap();
///
/// let hits = fragments.intersect(3, 15);
/// assert_eq!(hits.len(), 2);
/// assert_eq!(hits.span_start().unwrap(), 10);
/// assert_eq!(hits.span_end().unwrap(), 13);
/// ```
#[derive(Debug, Clone)]
pub struct AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    store: IntervalStore<I, T>,
    config: AIListConfig,
    layout: OnceLock<Components<I>>,
}

/// Whether an [`AIList`] currently holds a component layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// Intervals were inserted since the last construction.
    Raw,
    /// The component layout matches the stored intervals.
    Constructed,
}

impl<I, T> Default for AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T> AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Create an empty list with the default configuration.
    pub fn new() -> Self {
        Self::from_parts(IntervalStore::new(), AIListConfig::default())
    }

    /// Create an empty list with a custom configuration.
    pub fn with_config(config: AIListConfig) -> AIListResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(IntervalStore::new(), config))
    }

    ///
    /// Create a list from a vector of intervals.
    ///
    /// # Arguments
    /// - intervals: intervals to store, in any order
    ///
    /// # Returns
    /// - the unconstructed list, or the error for the first interval with `end < start`
    pub fn from_intervals(intervals: Vec<Interval<I, T>>) -> AIListResult<Self> {
        let mut store = IntervalStore::with_capacity(intervals.len());
        for interval in intervals {
            store.push(interval)?;
        }
        Ok(Self::from_parts(store, AIListConfig::default()))
    }

    pub(crate) fn from_parts(store: IntervalStore<I, T>, config: AIListConfig) -> Self {
        Self {
            store,
            config,
            layout: OnceLock::new(),
        }
    }

    ///
    /// Add an interval to the list.
    ///
    /// Any existing component layout is discarded; it is rebuilt on the next query.
    ///
    /// # Returns
    /// - `Err(AIListError::InvalidInterval)` if `end < start`, leaving the list unchanged
    pub fn insert(&mut self, start: I, end: I, val: T) -> AIListResult<()> {
        self.store.push(Interval { start, end, val })?;
        self.layout.take();
        Ok(())
    }

    /// Build the component layout. Does nothing if it is already up to date.
    pub fn construct(&self) {
        self.layout();
    }

    pub fn state(&self) -> IndexState {
        match self.layout.get() {
            Some(_) => IndexState::Constructed,
            None => IndexState::Raw,
        }
    }

    /// Returns the number of intervals in the AIList.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Alias of [`len`](AIList::len).
    pub fn count(&self) -> usize {
        self.len()
    }

    /// Returns `true` if the AIList contains no intervals.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Smallest start over all intervals.
    pub fn span_start(&self) -> AIListResult<I> {
        self.store.first().ok_or(AIListError::EmptyIndex)
    }

    /// Largest end over all intervals.
    pub fn span_end(&self) -> AIListResult<I> {
        self.store.last().ok_or(AIListError::EmptyIndex)
    }

    pub fn config(&self) -> &AIListConfig {
        &self.config
    }

    /// The stored intervals in insertion order.
    pub fn intervals(&self) -> &[Interval<I, T>] {
        self.store.as_slice()
    }

    /// Iterate over intervals sorted by `(start, end)`, constructing first if needed.
    pub fn iter(&self) -> Iter<'_, I, T> {
        Iter {
            intervals: self.store.as_slice(),
            order: self.layout().sorted.iter(),
        }
    }

    /// Number of components in the layout, constructing first if needed.
    pub fn num_components(&self) -> usize {
        self.layout().num_components()
    }

    /// Length of each component, in layout order.
    pub fn component_lens(&self) -> Vec<usize> {
        self.layout().ranges().map(|r| r.len()).collect()
    }

    pub(crate) fn layout(&self) -> &Components<I> {
        self.layout
            .get_or_init(|| Decomposer::new(&self.config).decompose(self.store.as_slice()))
    }

    /// The interval at position `rank` of the global sorted order.
    pub(crate) fn interval_at_rank(&self, rank: usize) -> &Interval<I, T> {
        &self.store.as_slice()[self.layout().sorted[rank]]
    }

    /// A new, empty list sharing this list's configuration.
    pub(crate) fn with_store<U>(&self, store: IntervalStore<I, U>) -> AIList<I, U>
    where
        U: Eq + Clone + Send + Sync,
    {
        AIList::from_parts(store, self.config.clone())
    }
}

impl<I, T> AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync + Default,
{
    /// Add an interval carrying the default label.
    pub fn add(&mut self, start: I, end: I) -> AIListResult<()> {
        self.insert(start, end, T::default())
    }
}

impl<I, T> Overlapper<I, T> for AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    ///
    /// Create a new, constructed AIList
    ///
    /// # Arguments
    /// - intervals: list of intervals to create from; intervals with `end < start` are skipped
    ///
    /// # Returns
    /// - AIList struct
    fn build(intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized,
    {
        let mut store = IntervalStore::with_capacity(intervals.len());
        for interval in intervals {
            let (start, end) = (interval.start, interval.end);
            if store.push(interval).is_err() {
                warn!(
                    "skipping invalid interval ({}-{})",
                    coord_to_string(start),
                    coord_to_string(end)
                );
            }
        }

        let ailist = Self::from_parts(store, AIListConfig::default());
        ailist.construct();
        ailist
    }

    fn find(&self, start: I, end: I) -> Vec<Interval<I, T>> {
        self.overlapping_ranks(start, end)
            .into_iter()
            .map(|rank| self.interval_at_rank(rank).clone())
            .collect()
    }

    fn find_iter<'a>(
        &'a self,
        start: I,
        stop: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        Box::new(IterFind::new(self, start, stop))
    }

    fn count_hits(&self, start: I, end: I) -> usize {
        self.count_overlaps(start, end)
    }
}

/// Iterator over the intervals of an [`AIList`] in `(start, end)` order.
///
/// Created by [`AIList::iter`]. Each call to `iter` starts over from the beginning.
#[derive(Debug, Clone)]
pub struct Iter<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    intervals: &'a [Interval<I, T>],
    order: std::slice::Iter<'a, usize>,
}

impl<'a, I, T> Iterator for Iter<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    type Item = &'a Interval<I, T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.order.next().map(|&id| &self.intervals[id])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<I, T> ExactSizeIterator for Iter<'_, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
}

impl<'a, I, T> IntoIterator for &'a AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    type Item = &'a Interval<I, T>;
    type IntoIter = Iter<'a, I, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::{assert_eq, assert_ne};
    use rstest::{fixture, rstest};

    #[fixture]
    fn intervals() -> Vec<Interval<u32, &'static str>> {
        vec![
            Interval {
                start: 1,
                end: 5,
                val: "a",
            },
            Interval {
                start: 3,
                end: 7,
                val: "b",
            },
            Interval {
                start: 6,
                end: 10,
                val: "c",
            },
            Interval {
                start: 8,
                end: 12,
                val: "d",
            },
        ]
    }

    #[rstest]
    fn test_build_and_len(intervals: Vec<Interval<u32, &'static str>>) {
        let ailist = AIList::build(intervals.clone());
        assert_eq!(ailist.len(), intervals.len());
        assert_ne!(ailist.is_empty(), true);
        assert_eq!(ailist.state(), IndexState::Constructed);
    }

    #[rstest]
    fn test_build_skips_invalid_intervals(intervals: Vec<Interval<u32, &'static str>>) {
        let mut with_bad = intervals.clone();
        with_bad.push(Interval {
            start: 20,
            end: 2,
            val: "bad",
        });
        let ailist = AIList::build(with_bad);
        assert_eq!(ailist.len(), intervals.len());
    }

    #[rstest]
    fn test_from_intervals_rejects_invalid() {
        let result = AIList::from_intervals(vec![Interval {
            start: 5u32,
            end: 4,
            val: (),
        }]);
        assert_eq!(matches!(result, Err(AIListError::InvalidInterval(_))), true);
    }

    #[rstest]
    fn test_insert_invalidates_layout() {
        let mut ailist: AIList<u32, ()> = AIList::new();
        ailist.add(1, 4).unwrap();
        assert_eq!(ailist.state(), IndexState::Raw);

        ailist.construct();
        assert_eq!(ailist.state(), IndexState::Constructed);

        // idempotent
        ailist.construct();
        assert_eq!(ailist.state(), IndexState::Constructed);

        ailist.add(2, 3).unwrap();
        assert_eq!(ailist.state(), IndexState::Raw);
        assert_eq!(ailist.iter().count(), 2);
        assert_eq!(ailist.state(), IndexState::Constructed);
    }

    #[rstest]
    fn test_insert_rejects_reversed_interval() {
        let mut ailist: AIList<u32, ()> = AIList::new();
        ailist.add(1, 4).unwrap();
        ailist.construct();

        let result = ailist.add(9, 3);
        assert_eq!(matches!(result, Err(AIListError::InvalidInterval(_))), true);
        assert_eq!(ailist.len(), 1);
        // a rejected insert leaves the layout alone
        assert_eq!(ailist.state(), IndexState::Constructed);
    }

    #[rstest]
    fn test_count_matches_inserts() {
        let mut ailist: AIList<u64, u32> = AIList::new();
        for i in 0..100u64 {
            ailist.insert(i, i + 3, i as u32).unwrap();
            assert_eq!(ailist.count(), (i + 1) as usize);
        }
    }

    #[rstest]
    fn test_span(intervals: Vec<Interval<u32, &'static str>>) {
        let ailist = AIList::from_intervals(intervals).unwrap();
        assert_eq!(ailist.span_start().unwrap(), 1);
        assert_eq!(ailist.span_end().unwrap(), 12);
    }

    #[rstest]
    fn test_span_of_empty_list_is_an_error() {
        let ailist: AIList<u32, ()> = AIList::new();
        assert_eq!(matches!(ailist.span_start(), Err(AIListError::EmptyIndex)), true);
        assert_eq!(matches!(ailist.span_end(), Err(AIListError::EmptyIndex)), true);
    }

    #[rstest]
    fn test_iter_is_sorted_and_restartable() {
        let mut ailist: AIList<u32, char> = AIList::new();
        ailist.insert(30, 100, 'f').unwrap();
        ailist.insert(10, 11, 'a').unwrap();
        ailist.insert(30, 95, 'e').unwrap();
        ailist.insert(11, 13, 'b').unwrap();

        let first: Vec<char> = ailist.iter().map(|i| i.val).collect();
        let second: Vec<char> = (&ailist).into_iter().map(|i| i.val).collect();
        assert_eq!(first, vec!['a', 'b', 'e', 'f']);
        assert_eq!(first, second);
        assert_eq!(ailist.iter().len(), 4);
    }

    #[rstest]
    fn test_intervals_keep_insertion_order(intervals: Vec<Interval<u32, &'static str>>) {
        let mut reversed = intervals.clone();
        reversed.reverse();
        let ailist = AIList::build(reversed);
        let vals: Vec<&str> = ailist.intervals().iter().map(|i| i.val).collect();
        assert_eq!(vals, vec!["d", "c", "b", "a"]);
    }

    #[rstest]
    fn test_with_config_validates() {
        let config = AIListConfig {
            max_components: 0,
            ..Default::default()
        };
        let result: AIListResult<AIList<u32, ()>> = AIList::with_config(config);
        assert_eq!(matches!(result, Err(AIListError::InvalidConfig(_))), true);
    }

    #[rstest]
    fn test_overlapper_counts(intervals: Vec<Interval<u32, &'static str>>) {
        let ailist = AIList::build(intervals);
        assert_eq!(ailist.count_hits(4, 7), 3);
        assert_eq!(ailist.count_hits(4, 7), ailist.find_iter(4, 7).count());
        assert_eq!(ailist.has_overlap(11, 20), true);
        assert_eq!(ailist.has_overlap(12, 20), false);
    }

    #[rstest]
    fn test_empty_ailist() {
        let ailist: AIList<u32, &str> = AIList::build(vec![]);

        assert_eq!(ailist.len(), 0);
        assert_eq!(ailist.is_empty(), true);
        assert_eq!(ailist.num_components(), 0);
        assert_eq!(ailist.iter().next(), None);
    }
}
