use super::Interval;
use crate::error::{IntervalError, Result};

/// Sorted intervals of one chromosome with max-end augmentation
///
/// # Examples
///
/// ```rust
/// use nirvana_cache::{Interval, IntervalArray};
///
/// let array = IntervalArray::from_unsorted(vec![
///     Interval::new(5000, 6000, "GENE3"),
///     Interval::new(1000, 2000, "GENE1"),
///     Interval::new(1500, 2500, "GENE2"),
/// ])
/// .unwrap();
///
/// assert_eq!(array.overlapping_values(1800, 2200), vec![&"GENE1", &"GENE2"]);
/// assert!(!array.overlaps_any(2600, 4999));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalArray<T> {
    intervals: Vec<Interval<T>>,
    /// The max end position seen up to and including this index
    max_ends: Vec<i32>,
}
impl<T> Default for IntervalArray<T> {
    fn default() -> Self {
        Self {
            intervals: Vec::new(),
            max_ends: Vec::new(),
        }
    }
}
impl<T> IntervalArray<T> {
    /// Builds an array from intervals already sorted by begin, then end
    ///
    /// # Errors
    ///
    /// * `IntervalError::Inverted` - if an interval ends before it begins
    /// * `IntervalError::Unsorted` - if the input is not sorted
    pub fn new(intervals: Vec<Interval<T>>) -> Result<Self> {
        for (index, interval) in intervals.iter().enumerate() {
            if interval.end < interval.begin {
                return Err(IntervalError::Inverted {
                    begin: interval.begin,
                    end: interval.end,
                }
                .into());
            }
            if index > 0 {
                let previous = &intervals[index - 1];
                if (previous.begin, previous.end) > (interval.begin, interval.end) {
                    return Err(IntervalError::Unsorted { index }.into());
                }
            }
        }
        Ok(Self::with_max_ends(intervals))
    }

    /// Sorts the intervals by begin, then end, and builds an array
    ///
    /// The sort is stable, so intervals with identical coordinates keep their input order.
    pub fn from_unsorted(mut intervals: Vec<Interval<T>>) -> Result<Self> {
        intervals.sort_by_key(|interval| (interval.begin, interval.end));
        Self::new(intervals)
    }

    fn with_max_ends(intervals: Vec<Interval<T>>) -> Self {
        let mut current = i32::MIN;
        let max_ends = intervals
            .iter()
            .map(|interval| {
                current = current.max(interval.end);
                current
            })
            .collect();
        Self {
            intervals,
            max_ends,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    #[must_use]
    pub fn intervals(&self) -> &[Interval<T>] {
        &self.intervals
    }

    /// Index range of intervals that could overlap `[begin, end]`
    fn candidates(&self, begin: i32, end: i32) -> &[Interval<T>] {
        // everything before `first` ends before the query begins
        let first = self.max_ends.partition_point(|&max_end| max_end < begin);
        // everything from `last` on begins after the query ends
        let last = self.intervals.partition_point(|interval| interval.begin <= end);
        if first >= last {
            return &[];
        }
        &self.intervals[first..last]
    }

    /// Iterates over the intervals overlapping `[begin, end]` in ascending begin order
    pub fn overlapping(&self, begin: i32, end: i32) -> impl Iterator<Item = &Interval<T>> {
        self.candidates(begin, end)
            .iter()
            .filter(move |interval| interval.end >= begin)
    }

    /// Returns true if any interval overlaps `[begin, end]`
    #[must_use]
    pub fn overlaps_any(&self, begin: i32, end: i32) -> bool {
        self.overlapping(begin, end).next().is_some()
    }

    /// Collects the values of all intervals overlapping `[begin, end]`
    ///
    /// The result is empty, not an error, when nothing overlaps.
    #[must_use]
    pub fn overlapping_values(&self, begin: i32, end: i32) -> Vec<&T> {
        self.overlapping(begin, end)
            .map(|interval| &interval.value)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(intervals: &[Interval<usize>], begin: i32, end: i32) -> Vec<usize> {
        let mut values: Vec<usize> = intervals
            .iter()
            .filter(|interval| interval.overlaps(begin, end))
            .map(|interval| interval.value)
            .collect();
        values.sort_unstable();
        values
    }

    #[test]
    fn test_matches_brute_force() -> crate::Result<()> {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let n = rng.random_range(0..200);
            let intervals: Vec<Interval<usize>> = (0..n)
                .map(|value| {
                    let begin = rng.random_range(1..10_000);
                    let len = rng.random_range(0..1_500);
                    Interval::new(begin, begin + len, value)
                })
                .collect();
            let array = IntervalArray::from_unsorted(intervals.clone())?;

            for _ in 0..200 {
                let begin = rng.random_range(-100..11_000);
                let end = begin + rng.random_range(0..800);
                let mut observed: Vec<usize> =
                    array.overlapping_values(begin, end).into_iter().copied().collect();
                observed.sort_unstable();
                let expected = brute_force(&intervals, begin, end);
                assert_eq!(observed, expected);
                assert_eq!(array.overlaps_any(begin, end), !expected.is_empty());
            }
        }
        Ok(())
    }

    #[test]
    fn test_results_in_begin_order() -> crate::Result<()> {
        let array = IntervalArray::new(vec![
            Interval::new(10, 500, 'a'),
            Interval::new(20, 30, 'b'),
            Interval::new(40, 45, 'c'),
            Interval::new(100, 200, 'd'),
        ])?;
        // 'b' and 'c' end before 50 but 'a' keeps the running max high
        assert_eq!(array.overlapping_values(50, 150), vec![&'a', &'d']);
        assert_eq!(array.overlapping_values(25, 42), vec![&'a', &'b', &'c']);
        Ok(())
    }

    #[test]
    fn test_zero_length_query() -> crate::Result<()> {
        let array = IntervalArray::new(vec![
            Interval::new(100, 100, "snv"),
            Interval::new(100, 250, "exon"),
        ])?;
        assert_eq!(array.overlapping_values(100, 100), vec![&"snv", &"exon"]);
        assert_eq!(array.overlapping_values(250, 250), vec![&"exon"]);
        assert!(array.overlapping_values(251, 251).is_empty());
        Ok(())
    }

    #[test]
    fn test_duplicate_coordinates() -> crate::Result<()> {
        let array = IntervalArray::from_unsorted(vec![
            Interval::new(1_000, 2_000, "NM_000001.1"),
            Interval::new(1_000, 2_000, "ENST00000000001"),
        ])?;
        assert_eq!(
            array.overlapping_values(1_500, 1_500),
            vec![&"NM_000001.1", &"ENST00000000001"]
        );
        Ok(())
    }

    #[test]
    fn test_empty_array() {
        let array: IntervalArray<u8> = IntervalArray::default();
        assert!(array.is_empty());
        assert!(!array.overlaps_any(1, 1_000_000));
        assert!(array.overlapping_values(1, 1_000_000).is_empty());
    }

    #[test]
    fn test_rejects_unsorted_input() {
        let result = IntervalArray::new(vec![Interval::new(10, 20, ()), Interval::new(5, 8, ())]);
        assert!(matches!(
            result,
            Err(Error::IntervalError(IntervalError::Unsorted { index: 1 }))
        ));

        let result = IntervalArray::new(vec![Interval::new(10, 20, ()), Interval::new(10, 15, ())]);
        assert!(matches!(
            result,
            Err(Error::IntervalError(IntervalError::Unsorted { index: 1 }))
        ));
    }

    #[test]
    fn test_rejects_inverted_interval() {
        let result = IntervalArray::new(vec![Interval::new(30, 20, ())]);
        assert!(matches!(
            result,
            Err(Error::IntervalError(IntervalError::Inverted { begin: 30, end: 20 }))
        ));
    }
}
