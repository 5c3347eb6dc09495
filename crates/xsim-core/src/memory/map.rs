//! Interval index mapping address ranges to values.
//!
//! Used for the child-view index of a space and for its access restrictions.
//! Entries stay sorted by range start so lookups stop at the first entry
//! starting past the queried range.

use std::ops::Range;

/// One indexed interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeEntry<T> {
    /// Half-open address range covered by the entry.
    pub range: Range<usize>,
    /// Value attached to the range.
    pub value: T,
}

/// Sorted collection of possibly overlapping address ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeMap<T> {
    entries: Vec<RangeEntry<T>>,
}

impl<T> Default for RangeMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> RangeMap<T> {
    /// Creates an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an interval, keeping any existing interval on the same range.
    pub fn insert(&mut self, range: Range<usize>, value: T) {
        let at = self
            .entries
            .partition_point(|entry| entry.range.start <= range.start);
        self.entries.insert(at, RangeEntry { range, value });
    }

    /// Adds an interval, dropping any existing interval on exactly the same range.
    pub fn replace(&mut self, range: Range<usize>, value: T) {
        self.entries.retain(|entry| entry.range != range);
        self.insert(range, value);
    }

    /// Iterates entries that share at least one address with `range`.
    pub fn overlapping(&self, range: Range<usize>) -> impl Iterator<Item = &RangeEntry<T>> + '_ {
        let Range { start, end } = range;
        self.entries
            .iter()
            .take_while(move |entry| entry.range.start < end)
            .filter(move |entry| entry.range.end > start)
    }

    /// Iterates entries containing `address`.
    pub fn containing(&self, address: usize) -> impl Iterator<Item = &RangeEntry<T>> + '_ {
        self.overlapping(address..address.saturating_add(1))
    }

    /// Iterates all entries in start order.
    pub fn iter(&self) -> impl Iterator<Item = &RangeEntry<T>> + '_ {
        self.entries.iter()
    }

    /// Number of indexed intervals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::RangeMap;

    fn values<'a>(it: impl Iterator<Item = &'a super::RangeEntry<char>>) -> Vec<char> {
        it.map(|entry| entry.value).collect()
    }

    #[test]
    fn entries_stay_sorted_by_start() {
        let mut map = RangeMap::new();
        map.insert(10..20, 'b');
        map.insert(0..5, 'a');
        map.insert(30..31, 'c');

        assert_eq!(values(map.iter()), vec!['a', 'b', 'c']);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn overlap_query_respects_half_open_bounds() {
        let mut map = RangeMap::new();
        map.insert(0..4, 'a');
        map.insert(4..8, 'b');
        map.insert(2..10, 'c');

        assert_eq!(values(map.overlapping(3..5)), vec!['a', 'c', 'b']);
        assert_eq!(values(map.overlapping(8..9)), vec!['c']);
        assert!(map.overlapping(10..12).next().is_none());
        assert_eq!(values(map.containing(4)), vec!['c', 'b']);
    }

    #[test]
    fn replace_only_drops_identical_ranges() {
        let mut map = RangeMap::new();
        map.insert(0..4, 'a');
        map.insert(0..2, 'b');
        map.replace(0..4, 'z');

        assert_eq!(values(map.containing(0)), vec!['b', 'z']);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn duplicate_ranges_are_kept_by_insert() {
        let mut map = RangeMap::new();
        map.insert(0..4, 'a');
        map.insert(0..4, 'b');

        assert_eq!(values(map.containing(1)), vec!['a', 'b']);
        assert!(!map.is_empty());
    }
}
