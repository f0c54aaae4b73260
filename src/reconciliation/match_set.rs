//! Keyed record sets used as reconciliation input and output

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// A mapping from a unique key to an opaque payload.
///
/// Only the key takes part in reconciliation; the payload is carried through
/// untouched. Iteration is in ascending key order, which is the order used
/// for display and for queue planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchSet<K: Ord, V> {
    entries: BTreeMap<K, V>,
}

impl<K: Ord, V> MatchSet<K, V> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert a record, returning the payload it replaced if the key was present
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, payload)` pairs in ascending key order
    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    /// Iterate over keys in ascending order
    pub fn keys(&self) -> btree_map::Keys<'_, K, V> {
        self.entries.keys()
    }
}

impl<K: Ord + Clone, V: Clone> MatchSet<K, V> {
    /// Entries of `self` whose key does not appear in `other`.
    ///
    /// Payload types of the two sets may differ; only keys are compared.
    pub fn difference_by_key<W>(&self, other: &MatchSet<K, W>) -> MatchSet<K, V> {
        self.entries
            .iter()
            .filter(|(key, _)| !other.contains_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Entries of `self` whose key also appears in `other`.
    ///
    /// The payload is taken from `self`.
    pub fn intersection_by_key<W>(&self, other: &MatchSet<K, W>) -> MatchSet<K, V> {
        self.entries
            .iter()
            .filter(|(key, _)| other.contains_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K: Ord, V> Default for MatchSet<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for MatchSet<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K: Ord, V> Extend<(K, V)> for MatchSet<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<K: Ord, V> IntoIterator for MatchSet<K, V> {
    type Item = (K, V);
    type IntoIter = btree_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a MatchSet<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Ord, V> From<BTreeMap<K, V>> for MatchSet<K, V> {
    fn from(entries: BTreeMap<K, V>) -> Self {
        Self { entries }
    }
}
