use std::cell::RefCell;
use std::fmt::{self, Debug};

use serde::{Serialize, Serializer};
use smallvec::SmallVec;

use crate::pointers::StrongPointer;
use crate::storage::purge_stale;
use crate::weak_ref::WeakRef;

/// Entries stored inline before the backing store spills to the heap.
pub const INLINE_CAPACITY: usize = 8;

type Entries<P> = SmallVec<[WeakRef<P>; INLINE_CAPACITY]>;

/// An ordered sequence of weakly held objects.
///
/// Duplicates are allowed. Stale entries are discarded the next time the array
/// is touched, by reads as well as writes, so no read ever observes one.
pub struct WeakArray<P: StrongPointer> {
    entries: RefCell<Entries<P>>,
}

impl<P: StrongPointer> WeakArray<P> {
    pub fn new() -> Self {
        WeakArray {
            entries: RefCell::new(SmallVec::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        WeakArray {
            entries: RefCell::new(SmallVec::with_capacity(capacity)),
        }
    }

    /// Discards stale entries, returning how many there were.
    pub fn clean(&self) -> usize {
        purge_stale(&mut *self.entries.borrow_mut())
    }

    fn entries_mut(&mut self) -> &mut Entries<P> {
        let entries = self.entries.get_mut();
        purge_stale(entries);
        entries
    }

    pub fn add(&mut self, item: &P) {
        self.entries_mut().push(WeakRef::new(item));
    }

    /// Removes every entry referring to `item` itself (not merely an equal
    /// value) and returns how many were removed.
    pub fn remove_identical(&mut self, item: &P) -> usize {
        let entries = self.entries_mut();
        let before = entries.len();
        entries.retain(|entry| !entry.refers_to(item));
        let removed = before - entries.len();
        debug_println!("remove_identical removed {} entries", removed);
        removed
    }

    pub fn contains_identical(&self, item: &P) -> bool {
        self.clean();
        self.entries.borrow().iter().any(|entry| entry.refers_to(item))
    }

    pub fn len(&self) -> usize {
        self.clean();
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The live objects, in insertion order.
    pub fn contents(&self) -> Vec<P> {
        self.clean();
        self.entries
            .borrow()
            .iter()
            .filter_map(WeakRef::resolve)
            .collect()
    }

    /// Iterates over a snapshot of the live objects taken when this is called.
    pub fn iter(&self) -> std::vec::IntoIter<P> {
        self.contents().into_iter()
    }
}

impl<P: StrongPointer> Default for WeakArray<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: StrongPointer> Clone for WeakArray<P> {
    fn clone(&self) -> Self {
        self.clean();
        WeakArray {
            entries: RefCell::new(self.entries.borrow().clone()),
        }
    }
}

impl<'a, P: StrongPointer + 'a> FromIterator<&'a P> for WeakArray<P> {
    fn from_iter<I: IntoIterator<Item = &'a P>>(iter: I) -> Self {
        let mut array = WeakArray::new();
        array.extend(iter);
        array
    }
}

impl<'a, P: StrongPointer + 'a> Extend<&'a P> for WeakArray<P> {
    fn extend<I: IntoIterator<Item = &'a P>>(&mut self, iter: I) {
        let entries = self.entries_mut();
        entries.extend(iter.into_iter().map(WeakRef::new));
    }
}

impl<P: StrongPointer> From<&[P]> for WeakArray<P> {
    fn from(items: &[P]) -> Self {
        items.iter().collect()
    }
}

impl<'a, P: StrongPointer> IntoIterator for &'a WeakArray<P> {
    type Item = P;
    type IntoIter = std::vec::IntoIter<P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<P> Debug for WeakArray<P>
where
    P: StrongPointer,
    P::Target: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contents = self.contents();
        f.debug_list()
            .entries(contents.iter().map(|item| &**item))
            .finish()
    }
}

impl<P> Serialize for WeakArray<P>
where
    P: StrongPointer,
    P::Target: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let contents = self.contents();
        serializer.collect_seq(contents.iter().map(|item| &**item))
    }
}
