//! Core models shared by the ailist crates.
//!
//! The main type here is [`Interval`](models::Interval), a half-open `[start, end)`
//! range carrying an opaque label. Everything that builds on top of it (the
//! index, its statistics and its on-disk format) lives in the `ailist` crate.
pub mod errors;
pub mod models;

// re-exports
pub use self::errors::IntervalError;
pub use self::models::Interval;
