//! Insertion-ordered maps and counters.
//!
//! Every ranking in the crate breaks ties by first-seen order, so the
//! containers here remember when each key first appeared.

use std::collections::HashMap;
use std::hash::Hash;

/// A map that iterates in first-insertion order.
#[derive(Debug, Clone)]
pub struct FirstSeenMap<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> FirstSeenMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Mutable access to the value for `key`, inserting `V::default()` first
    /// if the key is new.
    pub fn entry_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(key.clone(), slot);
                self.entries.push((key, V::default()));
                slot
            }
        };
        &mut self.entries[slot].1
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for FirstSeenMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> IntoIterator for FirstSeenMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Occurrence counter with first-seen tie-breaking.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    counts: FirstSeenMap<K, u64>,
}

impl<K> Tally<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            counts: FirstSeenMap::new(),
        }
    }

    /// Add `n` to `key`. A zero still registers the key's first-seen slot.
    pub fn add(&mut self, key: K, n: u64) {
        *self.counts.entry_or_default(key) += n;
    }

    /// Add every count of `other`. Keys new to `self` keep `other`'s order,
    /// after all of `self`'s keys.
    pub fn merge(&mut self, other: Tally<K>) {
        for (key, n) in other.counts {
            self.add(key, n);
        }
    }

    pub fn count(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, n)| *n).sum()
    }

    /// The highest count; the earliest key wins ties.
    pub fn winner(&self) -> Option<(&K, u64)> {
        let mut best: Option<(&K, u64)> = None;
        for (key, &n) in self.counts.iter() {
            if best.is_none_or(|(_, top)| n > top) {
                best = Some((key, n));
            }
        }
        best
    }

    /// Keys by count descending, first-seen order within equal counts.
    pub fn ranked(&self) -> Vec<(&K, u64)> {
        let mut ranked: Vec<(&K, u64)> = self.counts.iter().map(|(k, n)| (k, *n)).collect();
        // stable sort keeps first-seen order among ties
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(k, n)| (k, *n))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<K> Default for Tally<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
