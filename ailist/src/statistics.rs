//! Summary statistics for the intervals of an [`AIList`].
//!
//! Positional statistics (window protection score, coverage) are reported for every
//! position from the list's first start up to, but not including, its last end.
//! Their output, like the length histogram, is sized by the data: a span or length
//! too large to allocate gives `AIListError::CapacityExceeded` instead of aborting.

use num_traits::{PrimInt, Unsigned};

use crate::ailist::AIList;
use crate::errors::{AIListError, AIListResult};

/// Window protection score track.
///
/// `values[k]` is the score at `positions[k]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wps<I> {
    pub positions: Vec<I>,
    pub values: Vec<i64>,
}

impl<I> Wps<I> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Trait for computing statistics and distributions of intervals.
pub trait IntervalStatistics<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Histogram of fragment lengths (`end - start - 1`).
    ///
    /// Bucket `k` counts intervals of length `k`; there are `max_length + 1` buckets.
    /// An empty list gives an empty histogram.
    fn length_dist(&self) -> AIListResult<Vec<usize>>;

    /// Longest fragment length, or `None` for an empty list.
    fn max_length(&self) -> Option<I>;

    /// Compute the window protection score with the given window size.
    ///
    /// With `h = window / 2`, every interval `[s, e)` scores -1 over its head
    /// `[s - h, s + h)`, -1 over its tail `[max(s + h, e - h), e + h)` and +1 over the
    /// protected stretch between them. Positive values mark positions that are
    /// spanned by whole fragments, negative ones positions crowded with fragment ends.
    fn wps(&self, window: u32) -> AIListResult<Wps<I>>;

    /// Window protection score using the configured window.
    fn wps_default(&self) -> AIListResult<Wps<I>>;

    /// Per-position depth, where each interval counts over `[start, end - 1)`.
    fn coverage(&self) -> AIListResult<Vec<u32>>;
}

/// Distance from `first` to `pos` as a signed offset.
fn offset<I: PrimInt>(pos: I, first: I) -> i64 {
    (pos - first).to_i64().unwrap_or(i64::MAX)
}

/// A vector of `len` default values, failing instead of aborting when `len` can't be
/// allocated. `None` stands for a length that doesn't fit in `usize`.
fn zeroed<V: Clone + Default>(len: Option<usize>) -> AIListResult<Vec<V>> {
    let len = len.ok_or_else(|| {
        AIListError::CapacityExceeded("length does not fit in usize".to_string())
    })?;

    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|e| AIListError::CapacityExceeded(format!("{len} slots: {e}")))?;
    values.resize(len, V::default());
    Ok(values)
}

/// Zeroed difference array for `n` positions plus a sentinel slot.
fn difference_array(n: Option<usize>) -> AIListResult<Vec<i64>> {
    zeroed(n.and_then(|n| n.checked_add(1)))
}

/// Add `delta` over `[lo, hi)`, clipped to `[0, diff.len() - 1)`.
fn add_range(diff: &mut [i64], lo: i64, hi: i64, delta: i64) {
    let n = diff.len() as i64 - 1;
    let lo = lo.max(0);
    let hi = hi.min(n);
    if lo < hi {
        diff[lo as usize] += delta;
        diff[hi as usize] -= delta;
    }
}

/// Running sum of a difference array, dropping the sentinel slot.
fn sweep(diff: &[i64]) -> Vec<i64> {
    let mut running = 0;
    diff[..diff.len() - 1]
        .iter()
        .map(|d| {
            running += d;
            running
        })
        .collect()
}

impl<I, T> AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// First position and number of positions covered by the list.
    fn positions_span(&self) -> Option<(I, Option<usize>)> {
        let first = self.span_start().ok()?;
        let last = self.span_end().ok()?;
        Some((first, (last - first).to_usize()))
    }
}

impl<I, T> IntervalStatistics<I, T> for AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn length_dist(&self) -> AIListResult<Vec<usize>> {
        let Some(max_length) = self.max_length() else {
            return Ok(Vec::new());
        };

        let mut distribution: Vec<usize> =
            zeroed(max_length.to_usize().and_then(|m| m.checked_add(1)))?;
        for interval in self.intervals() {
            if let Some(length) = interval.fragment_length().to_usize() {
                distribution[length] += 1;
            }
        }
        Ok(distribution)
    }

    fn max_length(&self) -> Option<I> {
        self.intervals()
            .iter()
            .map(|interval| interval.fragment_length())
            .max()
    }

    fn wps(&self, window: u32) -> AIListResult<Wps<I>> {
        let Some((first, n)) = self.positions_span() else {
            return Ok(Wps {
                positions: Vec::new(),
                values: Vec::new(),
            });
        };

        let mut diff = difference_array(n)?;
        let n = diff.len() - 1;
        let half = (window / 2) as i64;

        for interval in self.intervals() {
            let start = offset(interval.start, first);
            let end = offset(interval.end, first);

            let head_start = (start - half).max(0);
            let head_end = start + half;
            // if head and tail meet, the tail starts where the head ends
            let tail_start = head_end.max(end - half);
            let tail_end = end + half;

            add_range(&mut diff, head_start, head_end, -1);
            add_range(&mut diff, tail_start, tail_end, -1);
            add_range(&mut diff, head_end, tail_start, 1);
        }

        let mut positions = Vec::new();
        positions
            .try_reserve_exact(n)
            .map_err(|e| AIListError::CapacityExceeded(format!("{n} positions: {e}")))?;
        let mut position = first;
        for _ in 0..n {
            positions.push(position);
            position = position + I::one();
        }

        Ok(Wps {
            positions,
            values: sweep(&diff),
        })
    }

    fn wps_default(&self) -> AIListResult<Wps<I>> {
        self.wps(self.config().wps_window)
    }

    fn coverage(&self) -> AIListResult<Vec<u32>> {
        let Some((first, n)) = self.positions_span() else {
            return Ok(Vec::new());
        };

        let mut diff = difference_array(n)?;
        for interval in self.intervals() {
            let start = offset(interval.start, first);
            let end = offset(interval.end, first);
            add_range(&mut diff, start, end - 1, 1);
        }

        Ok(sweep(&diff).into_iter().map(|depth| depth as u32).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use crate::config::AIListConfig;

    #[fixture]
    fn fragments() -> AIList<u32, ()> {
        let mut ailist = AIList::new();
        for (start, end) in [
            (10, 11),
            (15, 19),
            (11, 13),
            (19, 22),
            (20, 25),
            (30, 100),
            (30, 95),
        ] {
            ailist.add(start, end).unwrap();
        }
        ailist
    }

    #[rstest]
    fn test_length_dist(fragments: AIList<u32, ()>) {
        let distribution = fragments.length_dist().unwrap();
        assert_eq!(distribution.len(), 70);

        let mut expected = vec![0; 70];
        for k in [0, 1, 2, 3, 4, 64, 69] {
            expected[k] = 1;
        }
        assert_eq!(distribution, expected);
        assert_eq!(distribution.iter().sum::<usize>(), fragments.len());
    }

    #[rstest]
    fn test_max_length(fragments: AIList<u32, ()>) {
        assert_eq!(fragments.max_length(), Some(69));
        assert_eq!(AIList::<u32, ()>::new().max_length(), None);
    }

    #[rstest]
    fn test_length_dist_empty() {
        let ailist: AIList<u32, ()> = AIList::new();
        assert_eq!(ailist.length_dist().unwrap(), Vec::<usize>::new());
    }

    #[rstest]
    fn test_wps(fragments: AIList<u32, ()>) {
        let wps = fragments.wps(4).unwrap();
        assert_eq!(wps.len(), 90);
        assert_eq!(wps.positions.first(), Some(&10));
        assert_eq!(wps.positions.last(), Some(&99));
        assert_eq!(
            wps.values[..10].to_vec(),
            vec![-2, -2, -2, -2, -2, -1, -1, -2, -3, -3]
        );
        assert_eq!(
            wps.values[80..].to_vec(),
            vec![2, 2, 2, 0, 0, 0, 0, 1, -1, -1]
        );
    }

    #[rstest]
    fn test_wps_default_uses_config(fragments: AIList<u32, ()>) {
        assert_eq!(fragments.wps_default().unwrap(), fragments.wps(4).unwrap());

        let config = AIListConfig {
            wps_window: 10,
            ..Default::default()
        };
        let mut wide: AIList<u32, ()> = AIList::with_config(config).unwrap();
        for interval in fragments.intervals() {
            wide.add(interval.start, interval.end).unwrap();
        }
        assert_eq!(wide.wps_default().unwrap(), fragments.wps(10).unwrap());
    }

    #[rstest]
    fn test_wps_zero_window_is_protection_only() {
        let mut ailist: AIList<u32, ()> = AIList::new();
        ailist.add(2, 6).unwrap();
        let wps = ailist.wps(0).unwrap();
        assert_eq!(wps.positions, vec![2, 3, 4, 5]);
        assert_eq!(wps.values, vec![1, 1, 1, 1]);
    }

    #[rstest]
    fn test_wps_empty() {
        let ailist: AIList<u32, ()> = AIList::new();
        assert_eq!(ailist.wps(4).unwrap().is_empty(), true);
    }

    #[rstest]
    fn test_coverage() {
        let mut ailist: AIList<u32, ()> = AIList::new();
        ailist.add(0, 4).unwrap();
        ailist.add(2, 6).unwrap();
        assert_eq!(ailist.coverage().unwrap(), vec![1, 1, 2, 1, 1, 0]);
    }

    #[rstest]
    fn test_coverage_length_matches_span(fragments: AIList<u32, ()>) {
        let coverage = fragments.coverage().unwrap();
        assert_eq!(coverage.len(), 90);
        // (30, 100) and (30, 95) both cover position 30
        assert_eq!(coverage[20], 2);
        // only (30, 100) reaches position 97
        assert_eq!(coverage[87], 1);
    }

    #[rstest]
    fn test_span_too_large_to_allocate() {
        let mut ailist: AIList<u64, ()> = AIList::new();
        ailist.add(0, u64::MAX).unwrap();

        assert_eq!(
            matches!(ailist.length_dist(), Err(AIListError::CapacityExceeded(_))),
            true
        );
        assert_eq!(
            matches!(ailist.wps(4), Err(AIListError::CapacityExceeded(_))),
            true
        );
        assert_eq!(
            matches!(ailist.coverage(), Err(AIListError::CapacityExceeded(_))),
            true
        );
        assert_eq!(ailist.max_length(), Some(u64::MAX - 1));
    }
}
