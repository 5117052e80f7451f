use std::collections::HashMap;
use std::hash::Hash;

/// Append-only deduplicating table.
///
/// Every distinct key gets a dense id equal to the table length at the
/// time it was first seen; ids are stable for the life of the table.
/// The same shape serves global names, float constants, native names
/// and the write-time type table.
pub struct Lookup<K, V> {
    ids: HashMap<K, usize>,
    items: Vec<V>,
}

impl<K: Eq + Hash, V> Lookup<K, V> {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            items: Vec::new(),
        }
    }

    /// Return the id for `key`, assigning a fresh one (and appending
    /// `produce()` to the value vector) on first sight.
    pub fn intern(&mut self, key: K, produce: impl FnOnce() -> V) -> usize {
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = self.items.len();
        self.ids.insert(key, id);
        self.items.push(produce());
        id
    }

    pub fn get(&self, key: &K) -> Option<usize> {
        self.ids.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[V] {
        &self.items
    }

    pub fn into_items(self) -> Vec<V> {
        self.items
    }
}

impl<K: Eq + Hash, V> Default for Lookup<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_and_stable() {
        let mut t: Lookup<&str, usize> = Lookup::new();
        assert_eq!(t.intern("a", || 10), 0);
        assert_eq!(t.intern("b", || 20), 1);
        assert_eq!(t.intern("a", || 99), 0);
        assert_eq!(t.len(), 2);
        assert_eq!(t.items(), &[10, 20]);
    }

    #[test]
    fn produce_runs_only_on_first_sight() {
        let mut t: Lookup<u32, u32> = Lookup::new();
        let mut calls = 0;
        for _ in 0..3 {
            t.intern(7, || {
                calls += 1;
                0
            });
        }
        assert_eq!(calls, 1);
    }
}
