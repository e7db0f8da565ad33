use std::cell::RefCell;
use std::fmt::{self, Debug};

use fxhash::FxHashSet;
use serde::{Serialize, Serializer};

use crate::pointers::StrongPointer;
use crate::storage::purge_stale;
use crate::weak_ref::WeakRef;

/// A set of weakly held objects, keyed by object identity.
///
/// Two distinct objects that compare equal by value are still two members.
pub struct WeakSet<P: StrongPointer> {
    entries: RefCell<FxHashSet<WeakRef<P>>>,
}

impl<P: StrongPointer> WeakSet<P> {
    pub fn new() -> Self {
        WeakSet {
            entries: RefCell::new(FxHashSet::default()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        WeakSet {
            entries: RefCell::new(FxHashSet::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    /// Discards stale entries, returning how many there were.
    pub fn clean(&self) -> usize {
        purge_stale(&mut *self.entries.borrow_mut())
    }

    fn entries_mut(&mut self) -> &mut FxHashSet<WeakRef<P>> {
        let entries = self.entries.get_mut();
        purge_stale(entries);
        entries
    }

    /// Returns false if `item` was already a member.
    pub fn insert(&mut self, item: &P) -> bool {
        self.entries_mut().insert(WeakRef::new(item))
    }

    /// Returns false, and does nothing, if `item` was not a member.
    pub fn remove(&mut self, item: &P) -> bool {
        let removed = self.entries_mut().remove(&WeakRef::new(item));
        debug_println!("remove found member: {}", removed);
        removed
    }

    pub fn contains(&self, item: &P) -> bool {
        self.clean();
        self.entries.borrow().contains(&WeakRef::new(item))
    }

    pub fn len(&self) -> usize {
        self.clean();
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The live members, in no particular order.
    pub fn contents(&self) -> Vec<P> {
        self.clean();
        self.entries
            .borrow()
            .iter()
            .filter_map(WeakRef::resolve)
            .collect()
    }

    /// Iterates over a snapshot of the live members taken when this is called.
    pub fn iter(&self) -> std::vec::IntoIter<P> {
        self.contents().into_iter()
    }
}

impl<P: StrongPointer> Default for WeakSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: StrongPointer> Clone for WeakSet<P> {
    fn clone(&self) -> Self {
        self.clean();
        WeakSet {
            entries: RefCell::new(self.entries.borrow().clone()),
        }
    }
}

impl<'a, P: StrongPointer + 'a> FromIterator<&'a P> for WeakSet<P> {
    fn from_iter<I: IntoIterator<Item = &'a P>>(iter: I) -> Self {
        let mut set = WeakSet::new();
        set.extend(iter);
        set
    }
}

impl<'a, P: StrongPointer + 'a> Extend<&'a P> for WeakSet<P> {
    fn extend<I: IntoIterator<Item = &'a P>>(&mut self, iter: I) {
        let entries = self.entries_mut();
        entries.extend(iter.into_iter().map(WeakRef::new));
    }
}

impl<'a, P: StrongPointer> IntoIterator for &'a WeakSet<P> {
    type Item = P;
    type IntoIter = std::vec::IntoIter<P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<P> Debug for WeakSet<P>
where
    P: StrongPointer,
    P::Target: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contents = self.contents();
        f.debug_set()
            .entries(contents.iter().map(|item| &**item))
            .finish()
    }
}

impl<P> Serialize for WeakSet<P>
where
    P: StrongPointer,
    P::Target: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let contents = self.contents();
        serializer.collect_seq(contents.iter().map(|item| &**item))
    }
}
