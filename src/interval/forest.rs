use super::{Interval, IntervalArray};
use crate::error::{IntervalError, Result};

/// One optional [`IntervalArray`] per chromosome index
///
/// A chromosome without an array, or an index beyond the forest, simply has no data;
/// queries against it return nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalForest<T> {
    arrays: Vec<Option<IntervalArray<T>>>,
}
impl<T> Default for IntervalForest<T> {
    fn default() -> Self {
        Self { arrays: Vec::new() }
    }
}
impl<T> IntervalForest<T> {
    #[must_use]
    pub fn new(arrays: Vec<Option<IntervalArray<T>>>) -> Self {
        Self { arrays }
    }

    /// Buckets `(ref_index, interval)` pairs into per-chromosome arrays
    ///
    /// # Errors
    ///
    /// * `IntervalError::ReferenceOutOfRange` - if a reference index is not below `num_refs`
    /// * Any error from [`IntervalArray::from_unsorted`]
    pub fn from_intervals<I>(num_refs: usize, intervals: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u16, Interval<T>)>,
    {
        let mut buckets: Vec<Vec<Interval<T>>> = (0..num_refs).map(|_| Vec::new()).collect();
        for (ref_index, interval) in intervals {
            let Some(bucket) = buckets.get_mut(usize::from(ref_index)) else {
                return Err(IntervalError::ReferenceOutOfRange {
                    ref_index,
                    num_refs,
                }
                .into());
            };
            bucket.push(interval);
        }
        let arrays = buckets
            .into_iter()
            .map(|bucket| {
                if bucket.is_empty() {
                    Ok(None)
                } else {
                    IntervalArray::from_unsorted(bucket).map(Some)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { arrays })
    }

    /// Number of chromosome slots in the forest
    #[must_use]
    pub fn num_refs(&self) -> usize {
        self.arrays.len()
    }

    /// Returns the array of a chromosome, if it has any data
    #[must_use]
    pub fn get(&self, ref_index: u16) -> Option<&IntervalArray<T>> {
        self.arrays.get(usize::from(ref_index)).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn overlaps_any(&self, ref_index: u16, begin: i32, end: i32) -> bool {
        self.get(ref_index)
            .is_some_and(|array| array.overlaps_any(begin, end))
    }

    /// Collects the values overlapping `[begin, end]` on a chromosome
    #[must_use]
    pub fn overlapping_values(&self, ref_index: u16, begin: i32, end: i32) -> Vec<&T> {
        self.get(ref_index)
            .map(|array| array.overlapping_values(begin, end))
            .unwrap_or_default()
    }
}
