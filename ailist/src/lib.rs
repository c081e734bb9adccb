//! Augmented Interval Lists for genomic interval data.
//!
//! This crate provides [`AIList`], an interval index that answers overlap queries quickly
//! even when the intervals are heavily nested, plus the operations typically run on top
//! of such an index: set algebra, fragment length and coverage statistics, and a compact
//! binary format for saving an index to disk.
//!
//! ## Features
//!
//! - **Fast overlap queries**: intervals are decomposed into a few sorted components so that
//!   long intervals don't slow down queries over short ones
//! - **Incremental**: insert at any time; the layout is rebuilt lazily on the next query
//! - **Batch counting**: count hits for many query windows in parallel
//! - **Statistics**: fragment length histograms, window protection scores and coverage
//! - **Serialization**: versioned little endian encoding, to bytes or to a file
//!
//! ## Quick Start
//!
//! ```rust
//! use ailist::{AIList, IntervalRanges, Overlapper, Interval};
//!
//! // create some fragments
//! let fragments = vec![
//!     Interval { start: 10u32, end: 11, val: "a" },
//!     Interval { start: 15, end: 19, val: "b" },
//!     Interval { start: 11, end: 13, val: "c" },
//!     Interval { start: 30, end: 100, val: "d" },
//! ];
//!
//! // build the AIList data structure
//! let ailist = AIList::build(fragments);
//!
//! // query for overlapping intervals
//! let overlaps = ailist.find(3, 15);
//! assert_eq!(overlaps.len(), 2);
//!
//! // or count them without collecting
//! assert_eq!(ailist.count_overlaps(12, 40), 3);
//!
//! // merge overlapping fragments
//! let merged = ailist.merge();
//! assert_eq!(merged.len(), 4);
//! ```
//!
//! ## Saving an index
//!
//! ```rust
//! use ailist::AIList;
//!
//! let mut peaks: AIList<u64, u32> = AIList::new();
//! peaks.insert(100, 200, 1).unwrap();
//! peaks.insert(150, 300, 2).unwrap();
//!
//! let bytes = peaks.to_bytes().unwrap();
//! let restored: AIList<u64, u32> = AIList::from_bytes(&bytes).unwrap();
//! assert_eq!(restored.intersect(180, 190).len(), 2);
//! ```

/// Augmented Interval List implementation.
///
/// See [`AIList`] for details.
pub mod ailist;

/// Tuning parameters for the index.
pub mod config;

mod decompose;

pub mod errors;

/// Overlap queries and batch hit counting.
pub mod query;

/// Merge and length filtering.
pub mod ranges;

/// Binary encoding.
///
/// See [`IntervalLabel`] for the label types that can be stored.
pub mod serialize;

pub mod statistics;

/// Append-only interval storage.
pub mod store;

/// Core traits for overlap operations.
///
/// See [`Overlapper`] for the main trait.
pub mod traits;

// re-exports
pub use self::ailist::{AIList, IndexState, Iter};
pub use self::config::AIListConfig;
pub use self::errors::{AIListError, AIListResult};
pub use self::query::IterFind;
pub use self::ranges::IntervalRanges;
pub use self::serialize::IntervalLabel;
pub use self::statistics::{IntervalStatistics, Wps};
pub use self::store::IntervalStore;
pub use self::traits::{Interval, Overlapper};
