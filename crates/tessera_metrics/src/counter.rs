//! Keyed counters for tracking per-name totals

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// A set of named counters.
///
/// Keys are generic so callers can count by interned ids or structured keys
/// instead of strings. Lookups accept any borrowed form of the key.
#[derive(Debug, Clone)]
pub struct Counter<K> {
    counters: HashMap<K, usize>,
}

impl<K: Hash + Eq> Counter<K> {
    pub fn new() -> Self {
        Self {
            counters: HashMap::new(),
        }
    }

    pub fn increment(&mut self, key: K, value: usize) {
        *self.counters.entry(key).or_insert(0) += value;
    }

    /// Subtract `value`, saturating at zero.
    pub fn decrement<Q>(&mut self, key: &Q, value: usize)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(count) = self.counters.get_mut(key) {
            *count = count.saturating_sub(value);
        }
    }

    pub fn get<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counters.get(key).copied().unwrap_or(0)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counters.contains_key(key)
    }

    /// Zero every counter while keeping its key.
    pub fn reset_all(&mut self) {
        for count in self.counters.values_mut() {
            *count = 0;
        }
    }

    /// Sum of all counters.
    pub fn total(&self) -> usize {
        self.counters.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &usize)> {
        self.counters.iter()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl<K: Hash + Eq> Default for Counter<K> {
    fn default() -> Self {
        Self::new()
    }
}
