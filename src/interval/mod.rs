//! # Genomic interval lookups
//!
//! An [`IntervalArray`] holds every interval on one chromosome, sorted by begin (ties by
//! end), together with a running maximum of end coordinates. The running maximum is
//! non-decreasing, which lets an overlap query binary-search past every interval that
//! ends before the query begins, and the sort order lets it stop as soon as an interval
//! begins after the query ends. Queries therefore cost `O(log N + k)`.
//!
//! An [`IntervalForest`] is one optional array per chromosome index.
//!
//! Coordinates are 1-based and inclusive on both ends.

mod array;
mod forest;

pub use array::IntervalArray;
pub use forest::IntervalForest;

/// One genomic range with an attached payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval<T> {
    pub begin: i32,
    pub end: i32,
    pub value: T,
}
impl<T> Interval<T> {
    #[must_use]
    pub fn new(begin: i32, end: i32, value: T) -> Self {
        Self { begin, end, value }
    }

    /// Returns true if this interval overlaps `[begin, end]`
    #[must_use]
    pub fn overlaps(&self, begin: i32, end: i32) -> bool {
        self.end >= begin && self.begin <= end
    }
}
