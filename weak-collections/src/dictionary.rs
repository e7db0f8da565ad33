use std::borrow::Borrow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::{BuildHasher, Hash};

use fxhash::FxHashMap;
use serde::{Serialize, Serializer};

use crate::pointers::StrongPointer;
use crate::storage::purge_stale;
use crate::weak_ref::WeakRef;

/// A map from strongly held keys to weakly held values.
///
/// A key whose value has been reclaimed is dropped along with it the next time
/// the dictionary is touched.
pub struct WeakDictionary<K, P: StrongPointer> {
    entries: RefCell<FxHashMap<K, WeakRef<P>>>,
}

impl<K: Hash + Eq, P: StrongPointer> WeakDictionary<K, P> {
    pub fn new() -> Self {
        WeakDictionary {
            entries: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        WeakDictionary {
            entries: RefCell::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    /// Discards stale entries, returning how many there were.
    pub fn clean(&self) -> usize {
        purge_stale(&mut *self.entries.borrow_mut())
    }

    fn entries_mut(&mut self) -> &mut FxHashMap<K, WeakRef<P>> {
        let entries = self.entries.get_mut();
        purge_stale(entries);
        entries
    }

    pub fn get<Q>(&self, key: &Q) -> Option<P>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.clean();
        self.entries.borrow().get(key).and_then(WeakRef::resolve)
    }

    /// Stores `value` under `key`, or deletes `key` outright when `value` is
    /// `None`. Returns the previous value if it was still alive.
    pub fn set(&mut self, key: K, value: Option<&P>) -> Option<P> {
        match value {
            Some(value) => self.insert(key, value),
            None => self.remove(&key),
        }
    }

    pub fn insert(&mut self, key: K, value: &P) -> Option<P> {
        self.entries_mut()
            .insert(key, WeakRef::new(value))
            .and_then(|previous| previous.resolve())
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<P>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let removed = self.entries_mut().remove(key);
        debug_println!("remove found key: {}", removed.is_some());
        removed.and_then(|previous| previous.resolve())
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.clean();
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.clean();
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.clean();
        self.entries.borrow().keys().cloned().collect()
    }

    /// A strong snapshot of every live entry.
    pub fn contents(&self) -> FxHashMap<K, P>
    where
        K: Clone,
    {
        self.snapshot().into_iter().collect()
    }

    /// Live entries, copied out so that no borrow of the store is held once
    /// this returns. Formatting a value may touch the dictionary again.
    fn snapshot(&self) -> Vec<(K, P)>
    where
        K: Clone,
    {
        self.clean();
        self.entries
            .borrow()
            .iter()
            .filter_map(|(key, value)| Some((key.clone(), value.resolve()?)))
            .collect()
    }
}

impl<K: Hash + Eq, P: StrongPointer> Default for WeakDictionary<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone, P: StrongPointer> Clone for WeakDictionary<K, P> {
    fn clone(&self) -> Self {
        self.clean();
        WeakDictionary {
            entries: RefCell::new(self.entries.borrow().clone()),
        }
    }
}

impl<'a, K: Hash + Eq, P: StrongPointer + 'a> FromIterator<(K, &'a P)> for WeakDictionary<K, P> {
    fn from_iter<I: IntoIterator<Item = (K, &'a P)>>(iter: I) -> Self {
        let mut dictionary = WeakDictionary::new();
        dictionary.extend(iter);
        dictionary
    }
}

impl<'a, K: Hash + Eq, P: StrongPointer + 'a> Extend<(K, &'a P)> for WeakDictionary<K, P> {
    fn extend<I: IntoIterator<Item = (K, &'a P)>>(&mut self, iter: I) {
        let entries = self.entries_mut();
        entries.extend(
            iter.into_iter()
                .map(|(key, value)| (key, WeakRef::new(value))),
        );
    }
}

impl<K, P, S> From<&HashMap<K, P, S>> for WeakDictionary<K, P>
where
    K: Hash + Eq + Clone,
    P: StrongPointer,
    S: BuildHasher,
{
    fn from(map: &HashMap<K, P, S>) -> Self {
        map.iter()
            .map(|(key, value)| (key.clone(), value))
            .collect()
    }
}

impl<K, P> Debug for WeakDictionary<K, P>
where
    K: Hash + Eq + Clone + Debug,
    P: StrongPointer,
    P::Target: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self.snapshot();
        let mut map = f.debug_map();
        for (key, value) in &live {
            map.entry(key, &&**value);
        }
        map.finish()
    }
}

impl<K, P> Serialize for WeakDictionary<K, P>
where
    K: Hash + Eq + Clone + Serialize,
    P: StrongPointer,
    P::Target: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let live = self.snapshot();
        serializer.collect_map(live.iter().map(|(key, value)| (key, &**value)))
    }
}
