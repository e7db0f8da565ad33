//! Weakly held collections and a counting multiset.
//!
//! [`WeakArray`], [`WeakSet`] and [`WeakDictionary`] hold non-owning references
//! to objects owned elsewhere through an `Rc` or `Arc` (see [`StrongPointer`]).
//! They are never told when one of those objects is dropped. Instead, every
//! operation on a collection, reads included, first discards the entries whose
//! referent is gone, so nothing a caller can observe ever refers to a dropped
//! object. A collection that is never touched again keeps its stale slots
//! until it is itself dropped.
//!
//! The collections are single-threaded: they use a `RefCell` internally so
//! that reads can clean up, and are therefore never `Sync`.
//!
//! [`Bag`] counts occurrences of hashable elements.
//!
//! Set the `extra_verbose_debug_logging` feature to trace cleanup passes.

#[macro_use]
mod debug;

mod array;
mod bag;
mod dictionary;
mod pointers;
mod set;
mod storage;
mod weak_ref;

pub use array::{INLINE_CAPACITY, WeakArray};
pub use bag::{Bag, Iter as BagIter, Removal};
pub use dictionary::WeakDictionary;
pub use pointers::StrongPointer;
pub use set::WeakSet;
pub use weak_ref::{Identity, WeakRef};
