//! Set algebra over the intervals of an [`AIList`].
//!
//! All operations walk the list once in `(start, end)` order and return a new
//! list; the source is never modified.

use num_traits::{PrimInt, Unsigned};

use ailist_core::models::Interval;

use crate::ailist::AIList;
use crate::store::IntervalStore;

/// Interval set algebra operations on an [`AIList`].
pub trait IntervalRanges<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Merge overlapping intervals.
    ///
    /// Sweeps the sorted intervals and joins the next one into the current run when
    /// `next.start < current.end`. Intervals that only touch are kept apart; use
    /// [`merge_with_gap`](IntervalRanges::merge_with_gap) with a gap of 1 to join them too.
    ///
    /// Each merged interval is labelled with its position in the output (0, 1, ...).
    fn merge(&self) -> AIList<I, usize> {
        self.merge_with_gap(I::zero())
    }

    /// Merge intervals separated by less than `gap` positions.
    ///
    /// The next interval joins the current run when `next.start < current.end + gap`.
    fn merge_with_gap(&self, gap: I) -> AIList<I, usize>;

    /// Keep intervals whose fragment length (`end - start - 1`) lies in
    /// `[min_length, max_length]`.
    ///
    /// Order follows the sorted order of the source. `min_length > max_length`
    /// gives an empty list.
    fn filter(&self, min_length: I, max_length: I) -> AIList<I, T>;
}

impl<I, T> IntervalRanges<I, T> for AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn merge_with_gap(&self, gap: I) -> AIList<I, usize> {
        let mut merged = IntervalStore::new();
        let mut sorted = self.iter();

        if let Some(first) = sorted.next() {
            let mut current_start = first.start;
            let mut current_end = first.end;

            for interval in sorted {
                // a reach past I::MAX covers every possible start
                let joins = current_end
                    .checked_add(&gap)
                    .is_none_or(|reach| interval.start < reach);

                if joins {
                    current_end = current_end.max(interval.end);
                } else {
                    let k = merged.len();
                    merged.append(Interval {
                        start: current_start,
                        end: current_end,
                        val: k,
                    });
                    current_start = interval.start;
                    current_end = interval.end;
                }
            }

            let k = merged.len();
            merged.append(Interval {
                start: current_start,
                end: current_end,
                val: k,
            });
        }

        self.with_store(merged)
    }

    fn filter(&self, min_length: I, max_length: I) -> AIList<I, T> {
        let mut filtered = IntervalStore::new();

        if min_length <= max_length {
            for interval in self.iter() {
                let length = interval.fragment_length();
                if length >= min_length && length <= max_length {
                    filtered.append(interval.clone());
                }
            }
        }

        self.with_store(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::{fixture, rstest};

    #[fixture]
    fn fragments() -> AIList<u32, char> {
        let mut ailist = AIList::new();
        for (start, end, val) in [
            (10, 11, 'a'),
            (15, 19, 'b'),
            (11, 13, 'c'),
            (19, 22, 'd'),
            (20, 25, 'e'),
            (30, 100, 'f'),
            (30, 95, 'g'),
        ] {
            ailist.insert(start, end, val).unwrap();
        }
        ailist
    }

    fn coords<T>(ailist: &AIList<u32, T>) -> Vec<(u32, u32)>
    where
        T: Eq + Clone + Send + Sync,
    {
        ailist.iter().map(|i| (i.start, i.end)).collect()
    }

    #[rstest]
    fn test_merge(fragments: AIList<u32, char>) {
        let merged = fragments.merge();
        assert_eq!(merged.len(), 5);
        assert_eq!(merged.span_start().unwrap(), 10);
        assert_eq!(merged.span_end().unwrap(), 100);
        assert_eq!(
            coords(&merged),
            vec![(10, 11), (11, 13), (15, 19), (19, 25), (30, 100)]
        );
    }

    #[rstest]
    fn test_merge_labels_are_ordinals(fragments: AIList<u32, char>) {
        let merged = fragments.merge();
        let labels: Vec<usize> = merged.iter().map(|i| i.val).collect();
        assert_eq!(labels, vec![0, 1, 2, 3, 4]);
    }

    #[rstest]
    fn test_merge_is_idempotent(fragments: AIList<u32, char>) {
        let once = fragments.merge();
        let twice = once.merge();
        assert_eq!(coords(&once), coords(&twice));
    }

    #[rstest]
    fn test_merged_intervals_do_not_overlap(fragments: AIList<u32, char>) {
        let merged = fragments.merge();
        let merged = coords(&merged);
        for pair in merged.windows(2) {
            assert!(pair[0].1 <= pair[1].0);
        }
    }

    #[rstest]
    fn test_merge_with_gap_joins_touching(fragments: AIList<u32, char>) {
        let merged = fragments.merge_with_gap(1);
        assert_eq!(coords(&merged), vec![(10, 13), (15, 25), (30, 100)]);
        for pair in coords(&merged).windows(2) {
            assert!(pair[0].1 < pair[1].0);
        }
    }

    #[rstest]
    fn test_merge_with_huge_gap_saturates(fragments: AIList<u32, char>) {
        let merged = fragments.merge_with_gap(u32::MAX);
        assert_eq!(coords(&merged), vec![(10, 100)]);
    }

    #[rstest]
    fn test_merge_with_gap_reaching_type_max() {
        let mut ailist: AIList<u8, ()> = AIList::new();
        ailist.add(0, 255).unwrap();
        ailist.add(255, 255).unwrap();

        let merged = ailist.merge_with_gap(u8::MAX);
        assert_eq!(
            merged.iter().map(|i| (i.start, i.end)).collect::<Vec<_>>(),
            vec![(0, 255)]
        );

        // without saturation the usual strict test still applies
        let merged = ailist.merge_with_gap(0);
        assert_eq!(merged.len(), 2);
    }

    #[fixture]
    fn nested() -> AIList<u32, u32> {
        let mut rng = StdRng::seed_from_u64(42);
        let mut ailist = AIList::new();
        for i in 0..2_000u32 {
            let start = rng.random_range(0..50_000u32);
            let len = if i % 7 == 0 {
                rng.random_range(1_000..20_000u32)
            } else {
                rng.random_range(0..300u32)
            };
            ailist.insert(start, start + len, i).unwrap();
        }
        ailist
    }

    #[rstest]
    fn test_merge_multi_component(nested: AIList<u32, u32>) {
        assert!(nested.num_components() > 1);

        let once = nested.merge();
        let twice = once.merge();
        assert_eq!(coords(&once), coords(&twice));
        assert!(once.len() < nested.len());

        let merged = coords(&once);
        for pair in merged.windows(2) {
            assert!(pair[0].1 <= pair[1].0);
        }

        // every source interval lies inside a merged run
        for interval in nested.intervals() {
            let containing = merged
                .iter()
                .filter(|&&(s, e)| s <= interval.start && interval.end <= e)
                .count();
            assert!(containing >= 1, "({}, {})", interval.start, interval.end);
        }

        assert_eq!(once.span_start().unwrap(), nested.span_start().unwrap());
        assert_eq!(once.span_end().unwrap(), nested.span_end().unwrap());
    }

    #[rstest]
    fn test_merge_empty() {
        let ailist: AIList<u32, ()> = AIList::new();
        assert_eq!(ailist.merge().is_empty(), true);
    }

    #[rstest]
    fn test_merge_does_not_touch_source(fragments: AIList<u32, char>) {
        let _ = fragments.merge();
        assert_eq!(fragments.len(), 7);
        assert_eq!(fragments.intervals()[0].val, 'a');
    }

    #[rstest]
    fn test_filter(fragments: AIList<u32, char>) {
        let filtered = fragments.filter(3, 10);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.span_start().unwrap(), 15);
        assert_eq!(filtered.span_end().unwrap(), 25);

        let labels: Vec<char> = filtered.iter().map(|i| i.val).collect();
        assert_eq!(labels, vec!['b', 'e']);
    }

    #[rstest]
    #[case(0, vec![(10, 11)])]
    #[case(3, vec![(15, 19)])]
    #[case(69, vec![(30, 100)])]
    #[case(5, vec![])]
    fn test_filter_exact_length(
        fragments: AIList<u32, char>,
        #[case] length: u32,
        #[case] expected: Vec<(u32, u32)>,
    ) {
        let filtered = fragments.filter(length, length);
        assert_eq!(coords(&filtered), expected);
        assert!(filtered.iter().all(|i| i.fragment_length() == length));
    }

    #[rstest]
    fn test_filter_inverted_bounds_is_empty(fragments: AIList<u32, char>) {
        let filtered = fragments.filter(10, 3);
        assert_eq!(filtered.is_empty(), true);
    }

    #[rstest]
    fn test_filter_keeps_sorted_order(fragments: AIList<u32, char>) {
        let filtered = fragments.filter(0, 100);
        assert_eq!(coords(&filtered), coords(&fragments));
    }
}
