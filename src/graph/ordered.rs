//! Insertion-ordered hash containers used by the edge tables.
//!
//! Edge tables need O(1) membership and must still list neighbours in the
//! order they were linked (a wire's edges, a polygon's outer wire before its
//! holes). [`OrderedMap`] pairs a `hashbrown` map with a `BTreeMap` keyed by a
//! monotonically increasing insertion stamp; removal drops both entries, so
//! iteration never sees tombstones.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::hash::Hash;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

/// Hash map that iterates in insertion order.
///
/// Re-inserting an existing key replaces the value but keeps the original
/// position.
#[derive(Clone, Debug)]
pub struct OrderedMap<K, V> {
    entries: HashMap<K, (u64, V)>,
    order: BTreeMap<u64, K>,
    next: u64,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next: 0,
        }
    }
}

impl<K: Clone + Eq + Hash, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            order: BTreeMap::new(),
            next: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|(_, v)| v)
    }

    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(key).map(|(_, v)| v)
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.entries.entry(key) {
            Entry::Occupied(mut slot) => Some(std::mem::replace(&mut slot.get_mut().1, value)),
            Entry::Vacant(slot) => {
                let stamp = self.next;
                self.next += 1;
                self.order.insert(stamp, slot.key().clone());
                slot.insert((stamp, value));
                None
            }
        }
    }

    /// Returns the value under `key`, inserting `make()` first if absent.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        match self.entries.entry(key) {
            Entry::Occupied(slot) => &mut slot.into_mut().1,
            Entry::Vacant(slot) => {
                let stamp = self.next;
                self.next += 1;
                self.order.insert(stamp, slot.key().clone());
                &mut slot.insert((stamp, make())).1
            }
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (stamp, value) = self.entries.remove(key)?;
        self.order.remove(&stamp);
        Some(value)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.order.values()
    }

    /// `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.order
            .values()
            .filter_map(move |k| self.entries.get(k).map(|(_, v)| (k, v)))
    }
}

impl<K: Clone + Eq + Hash, V: PartialEq> PartialEq for OrderedMap<K, V> {
    /// Equal when both hold the same pairs in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

/// Hash set that iterates in insertion order.
#[derive(Clone, Debug)]
pub struct OrderedSet<K> {
    inner: OrderedMap<K, ()>,
}

impl<K> Default for OrderedSet<K> {
    fn default() -> Self {
        Self {
            inner: OrderedMap::default(),
        }
    }
}

impl<K: Clone + Eq + Hash> OrderedSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(item)
    }

    /// Returns `true` if `item` was not yet a member.
    pub fn insert(&mut self, item: K) -> bool {
        self.inner.insert(item, ()).is_none()
    }

    /// Returns `true` if `item` was a member.
    pub fn remove<Q>(&mut self, item: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(item).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.inner.keys()
    }

    pub fn to_vec(&self) -> Vec<K> {
        self.iter().cloned().collect()
    }
}

impl<K: Clone + Eq + Hash> PartialEq for OrderedSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<K: Clone + Eq + Hash> FromIterator<K> for OrderedSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<K: Clone + Eq + Hash> Extend<K> for OrderedSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_insertion_order_across_replace() {
        let mut m = OrderedMap::new();
        m.insert("c", 1);
        m.insert("a", 2);
        m.insert("b", 3);
        assert_eq!(m.insert("c", 10), Some(1));
        let pairs: Vec<_> = m.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![("c", 10), ("a", 2), ("b", 3)]);
    }

    #[test]
    fn map_remove_then_reinsert_moves_to_back() {
        let mut m = OrderedMap::new();
        m.insert(1, 'a');
        m.insert(2, 'b');
        assert_eq!(m.remove(&1), Some('a'));
        assert_eq!(m.remove(&1), None);
        m.insert(1, 'c');
        let keys: Vec<_> = m.keys().copied().collect();
        assert_eq!(keys, vec![2, 1]);
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn get_or_insert_with_only_builds_once() {
        let mut m: OrderedMap<&str, Vec<u32>> = OrderedMap::new();
        m.get_or_insert_with("k", Vec::new).push(1);
        m.get_or_insert_with("k", || panic!("must not rebuild")).push(2);
        assert_eq!(m.get("k"), Some(&vec![1, 2]));
    }

    #[test]
    fn set_membership_and_order() {
        let mut s: OrderedSet<String> = ["b", "a", "c"].iter().map(|x| x.to_string()).collect();
        assert!(!s.insert("a".to_string()));
        assert!(s.contains("c"));
        assert!(s.remove("b"));
        assert!(!s.remove("b"));
        assert_eq!(s.to_vec(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let a: OrderedSet<u32> = [1, 2].into_iter().collect();
        let b: OrderedSet<u32> = [2, 1].into_iter().collect();
        let c: OrderedSet<u32> = [1, 2].into_iter().collect();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
