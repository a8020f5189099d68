use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tally {
    count: u64,
    first_seen: u64,
}

/// Per-key occurrence counts that remember the order keys first appeared in.
///
/// `first_seen` positions are local to the accumulator; [`merge`](Self::merge)
/// shifts the right-hand side by the number of observations already on the left,
/// so chunked accumulation merged in chunk order ranks exactly like one pass.
#[derive(Clone, Debug)]
pub struct KeyCounts<K> {
    tallies: HashMap<K, Tally>,
    observed: u64,
}

impl<K> Default for KeyCounts<K> {
    fn default() -> Self {
        Self {
            tallies: HashMap::new(),
            observed: 0,
        }
    }
}

impl<K: Eq + Hash> KeyCounts<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, key: K) {
        let position = self.observed;
        self.observed += 1;
        self.tallies
            .entry(key)
            .or_insert(Tally {
                count: 0,
                first_seen: position,
            })
            .count += 1;
    }

    pub fn merge(&mut self, other: Self) {
        let offset = self.observed;
        for (key, tally) in other.tallies {
            match self.tallies.entry(key) {
                Entry::Occupied(mut e) => e.get_mut().count += tally.count,
                Entry::Vacant(e) => {
                    e.insert(Tally {
                        count: tally.count,
                        first_seen: tally.first_seen + offset,
                    });
                }
            }
        }
        self.observed += other.observed;
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<u64> {
        self.tallies.get(key).map(|t| t.count)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// Total observations, including repeats.
    #[must_use]
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// `(key, count)` pairs, count descending, then first appearance ascending.
    #[must_use]
    pub fn into_ranked(self) -> Vec<(K, u64)> {
        let mut rows: Vec<(K, Tally)> = self.tallies.into_iter().collect();
        rows.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then(a.first_seen.cmp(&b.first_seen))
        });
        rows.into_iter().map(|(k, t)| (k, t.count)).collect()
    }

    /// Unordered `(key, count)` pairs.
    pub fn into_counts(self) -> impl Iterator<Item = (K, u64)> {
        self.tallies.into_iter().map(|(k, t)| (k, t.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_ties_by_first_appearance() {
        let mut kc = KeyCounts::new();
        for k in ["b", "a", "c", "a", "b", "c"] {
            kc.observe(k);
        }
        assert_eq!(kc.into_ranked(), vec![("b", 2), ("a", 2), ("c", 2)]);
    }

    #[test]
    fn merge_keeps_global_first_appearance() {
        let mut left = KeyCounts::new();
        left.observe("x");
        left.observe("y");
        let mut right = KeyCounts::new();
        right.observe("z");
        right.observe("y");
        right.observe("x");

        let mut whole = KeyCounts::new();
        for k in ["x", "y", "z", "y", "x"] {
            whole.observe(k);
        }

        left.merge(right);
        assert_eq!(left.observed(), 5);
        assert_eq!(left.into_ranked(), whole.into_ranked());
    }

    #[test]
    fn merge_into_empty_is_identity() {
        let mut right = KeyCounts::new();
        right.observe(7u16);
        right.observe(7u16);
        let mut acc = KeyCounts::new();
        acc.merge(right);
        assert_eq!(acc.get(&7), Some(2));
        assert_eq!(acc.len(), 1);
    }
}
