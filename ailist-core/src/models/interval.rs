// https://github.com/sstadick/rust-lapper/blob/7e3904daed85181f1faa39b15f51935f13945976/src/lib.rs#L92
use num_traits::{PrimInt, Unsigned, identities::zero};
use std::cmp::Ordering::{self};
use std::fmt;

use crate::errors::IntervalError;

/// Represent a range from [start, end)
/// Inclusive start, exclusive of end
#[derive(Eq, Debug, Clone)]
pub struct Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    pub start: I,
    pub end: I,
    pub val: T,
}

impl<I, T> Ord for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn cmp(&self, other: &Interval<I, T>) -> Ordering {
        match self.start.cmp(&other.start) {
            Ordering::Less => Ordering::Less,
            Ordering::Greater => Ordering::Greater,
            Ordering::Equal => self.end.cmp(&other.end),
        }
    }
}

impl<I, T> Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Create a new interval, rejecting ranges whose end comes before their start.
    ///
    /// Zero-width intervals (`start == end`) are allowed and represent point features.
    pub fn new(start: I, end: I, val: T) -> Result<Self, IntervalError> {
        if end < start {
            return Err(IntervalError::InvalidInterval {
                start: coord_to_string(start),
                end: coord_to_string(end),
            });
        }
        Ok(Interval { start, end, val })
    }

    /// Compute the intsect between two intervals
    #[inline]
    pub fn intersect(&self, other: &Interval<I, T>) -> I {
        std::cmp::min(self.end, other.end)
            .checked_sub(&std::cmp::max(self.start, other.start))
            .unwrap_or_else(zero::<I>)
    }

    /// Check if two intervals overlap
    #[inline]
    pub fn overlap(&self, start: I, end: I) -> bool {
        self.start < end && self.end > start
    }

    /// Number of positions covered, `end - start`.
    #[inline]
    pub fn width(&self) -> I {
        self.end.checked_sub(&self.start).unwrap_or_else(zero::<I>)
    }

    /// Fragment length, counting the positions after the first one: `end - start - 1`.
    ///
    /// This is the length used by the length distribution and length filter.
    /// Zero-width intervals report 0.
    #[inline]
    pub fn fragment_length(&self) -> I {
        self.width()
            .checked_sub(&I::one())
            .unwrap_or_else(zero::<I>)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Render a coordinate for error messages without requiring `I: Display`.
pub fn coord_to_string<I: PrimInt>(coord: I) -> String {
    coord
        .to_u128()
        .map_or_else(|| "?".to_string(), |c| c.to_string())
}

impl<I, T> PartialOrd for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I, T> PartialEq for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn eq(&self, other: &Interval<I, T>) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl<I, T> fmt::Display for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync + fmt::Display,
    T: Eq + Clone + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}-{})", self.start, self.end)
    }
}
