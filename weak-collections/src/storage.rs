//! The cleanup protocol shared by every collection shape.
//!
//! A backing store holds entries that may go stale at any time. Nothing tells
//! the store when that happens; instead every public entry point of a
//! collection calls [`purge_stale`] before doing anything else.

use std::hash::Hash;

use fxhash::{FxHashMap, FxHashSet};
use smallvec::{Array, SmallVec};

use crate::pointers::StrongPointer;
use crate::weak_ref::WeakRef;

pub(crate) trait Liveness {
    fn is_live(&self) -> bool;
}

impl<P: StrongPointer> Liveness for WeakRef<P> {
    fn is_live(&self) -> bool {
        self.is_alive()
    }
}

pub(crate) trait Storage {
    fn len(&self) -> usize;

    /// Drops every entry that is no longer live. Survivors keep their relative
    /// order where the store has one.
    fn retain_live(&mut self);
}

impl<A> Storage for SmallVec<A>
where
    A: Array,
    A::Item: Liveness,
{
    fn len(&self) -> usize {
        SmallVec::len(self)
    }

    fn retain_live(&mut self) {
        self.retain(|entry| entry.is_live());
    }
}

impl<E: Liveness + Hash + Eq> Storage for FxHashSet<E> {
    fn len(&self) -> usize {
        self.len()
    }

    fn retain_live(&mut self) {
        self.retain(|entry| entry.is_live());
    }
}

impl<K: Hash + Eq, E: Liveness> Storage for FxHashMap<K, E> {
    fn len(&self) -> usize {
        self.len()
    }

    fn retain_live(&mut self) {
        self.retain(|_, entry| entry.is_live());
    }
}

/// Runs one cleanup pass and returns the number of stale entries discarded.
///
/// Idempotent: a second pass with no reclamation in between removes nothing.
pub(crate) fn purge_stale<S: Storage>(storage: &mut S) -> usize {
    let before = storage.len();
    storage.retain_live();
    let purged = before - storage.len();
    if purged > 0 {
        debug_println!("purged {} stale of {} entries", purged, before);
    }
    purged
}
