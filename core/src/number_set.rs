//! In-memory image of the number file.

use fnv::FnvHashSet;

/// Deduplicated set of the values read from one number file.
#[derive(Debug, Clone, Default)]
pub struct NumberSet {
    values: FnvHashSet<i64>,
    source_lines: usize,
}

impl NumberSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: FnvHashSet::with_capacity_and_hasher(capacity, Default::default()),
            source_lines: 0,
        }
    }

    /// Record one line's value. Duplicates collapse but are still counted as
    /// source lines.
    pub fn insert(&mut self, value: i64) {
        self.values.insert(value);
        self.source_lines += 1;
    }

    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        self.values.contains(&value)
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of lines the set was built from, duplicates included.
    pub fn source_lines(&self) -> usize {
        self.source_lines
    }

    pub fn duplicates(&self) -> usize {
        self.source_lines - self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.values.iter().copied()
    }

    /// Values in ascending order. Intended for small sets and diagnostics.
    pub fn to_sorted_vec(&self) -> Vec<i64> {
        let mut sorted: Vec<i64> = self.iter().collect();
        sorted.sort_unstable();
        sorted
    }
}

/// Two sets are equal when they hold the same values, regardless of how many
/// duplicate lines each was built from.
impl PartialEq for NumberSet {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for NumberSet {}

impl FromIterator<i64> for NumberSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut set = NumberSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::NumberSet;

    #[test]
    fn duplicates_collapse() {
        let set: NumberSet = [3, 1, 4, 1, 5].into_iter().collect();
        assert_eq!(set.len(), 4);
        assert_eq!(set.source_lines(), 5);
        assert_eq!(set.duplicates(), 1);
        assert_eq!(set.to_sorted_vec(), vec![1, 3, 4, 5]);
    }

    #[test]
    fn contains_reports_membership() {
        let set: NumberSet = [-50_000_000, 0, 50_000_000].into_iter().collect();
        assert!(set.contains(-50_000_000));
        assert!(set.contains(50_000_000));
        assert!(!set.contains(50_000_001));
        assert!(!set.contains(-50_000_001));
    }

    #[test]
    fn equality_ignores_duplicate_counts() {
        let a: NumberSet = [1, 2, 2, 3].into_iter().collect();
        let b: NumberSet = [3, 2, 1].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a.source_lines(), b.source_lines());
    }

    #[test]
    fn empty_set() {
        let set = NumberSet::with_capacity(16);
        assert!(set.is_empty());
        assert_eq!(set.duplicates(), 0);
        assert!(!set.contains(0));
    }
}
