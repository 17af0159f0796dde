use std::collections::HashMap;
use std::hash::Hash;

/// Occurrence counter that remembers the order keys were first seen.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn get(&self, key: &K) -> usize {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Total of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest count; on a tie the key seen first wins.
    pub fn most_common(&self) -> Option<(&K, usize)> {
        let mut best: Option<(&K, usize)> = None;
        for (key, count) in &self.entries {
            if best.is_none_or(|(_, n)| *count > n) {
                best = Some((key, *count));
            }
        }
        best
    }
}

impl<K: Eq + Hash + Clone + Ord> Tally<K> {
    /// Highest count; on a tie the smallest key wins.
    pub fn most_common_by_key(&self) -> Option<(&K, usize)> {
        self.entries
            .iter()
            .max_by(|(ka, na), (kb, nb)| na.cmp(nb).then_with(|| kb.cmp(ka)))
            .map(|(k, n)| (k, *n))
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let tally: Tally<&str> = ["a", "b", "a", "c", "a"].into_iter().collect();
        assert_eq!(tally.get(&"a"), 3);
        assert_eq!(tally.get(&"b"), 1);
        assert_eq!(tally.get(&"z"), 0);
        assert_eq!(tally.total(), 5);
    }

    #[test]
    fn test_empty() {
        let tally: Tally<String> = Tally::new();
        assert!(tally.is_empty());
        assert_eq!(tally.most_common(), None);
        assert_eq!(tally.most_common_by_key(), None);
    }

    #[test]
    fn test_most_common_tie_goes_to_first_seen() {
        let tally: Tally<&str> = ["y", "x", "x", "y"].into_iter().collect();
        assert_eq!(tally.most_common(), Some((&"y", 2)));

        let tally: Tally<&str> = ["x", "y", "y", "x"].into_iter().collect();
        assert_eq!(tally.most_common(), Some((&"x", 2)));
    }

    #[test]
    fn test_most_common_by_key_tie_goes_to_smallest() {
        let tally: Tally<(&str, &str)> = [("b", "a"), ("a", "z"), ("b", "a"), ("a", "z")]
            .into_iter()
            .collect();
        assert_eq!(tally.most_common_by_key(), Some((&("a", "z"), 2)));
    }

    #[test]
    fn test_higher_count_beats_order() {
        let tally: Tally<&str> = ["x", "y", "y"].into_iter().collect();
        assert_eq!(tally.most_common(), Some((&"y", 2)));
        assert_eq!(tally.most_common_by_key(), Some((&"y", 2)));
    }
}
