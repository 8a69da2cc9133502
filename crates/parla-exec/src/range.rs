//! Half-open index ranges and the partition rule used by every dispatch

use std::ops::Range;

/// A half-open interval `[start, end)` over an index domain
///
/// For matrices the domain is the row index, for vectors the element index.
/// The ranges handed out for one dispatch are disjoint and cover the domain
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WorkRange {
    pub start: usize,
    pub end: usize,
}

impl WorkRange {
    /// Create a new range
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "invalid work range [{start}, {end})");
        Self { start, end }
    }

    /// Number of indices in the range
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// Iterate over the indices of the range
    #[inline]
    pub fn iter(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Split `[0, total)` into `min(parts, total)` contiguous ranges
    ///
    /// Range `i` of `k` is `[⌊i·total/k⌋, ⌊(i+1)·total/k⌋)`, so every range
    /// holds either `⌊total/k⌋` or `⌈total/k⌉` indices with the longer ones
    /// trailing. No empty range is ever produced; `total == 0` (or
    /// `parts == 0`) yields no ranges at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use parla_exec::WorkRange;
    ///
    /// let ranges = WorkRange::partition(10, 3);
    /// assert_eq!(ranges, vec![
    ///     WorkRange::new(0, 3),
    ///     WorkRange::new(3, 6),
    ///     WorkRange::new(6, 10),
    /// ]);
    /// assert!(WorkRange::partition(0, 4).is_empty());
    /// assert_eq!(WorkRange::partition(2, 8).len(), 2);
    /// ```
    pub fn partition(total: usize, parts: usize) -> Vec<WorkRange> {
        let k = parts.min(total);
        if k == 0 {
            return Vec::new();
        }
        // u128 keeps i·total exact for any usize total
        let bound = |i: usize| ((i as u128 * total as u128) / k as u128) as usize;
        (0..k).map(|i| WorkRange::new(bound(i), bound(i + 1))).collect()
    }
}

impl From<WorkRange> for Range<usize> {
    fn from(range: WorkRange) -> Self {
        range.start..range.end
    }
}

impl From<Range<usize>> for WorkRange {
    fn from(range: Range<usize>) -> Self {
        WorkRange::new(range.start, range.end)
    }
}

impl IntoIterator for WorkRange {
    type Item = usize;
    type IntoIter = Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Display for WorkRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
