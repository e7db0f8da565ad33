use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};

use crate::pointers::StrongPointer;

/// Names one referent for as long as any `WeakRef` to it exists.
///
/// The token is the allocation address taken when the `WeakRef` was created.
/// A weak pointer keeps the allocation itself alive (though not the value), so
/// the address cannot be handed out again while a `WeakRef` still holds it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Identity(usize);

impl Identity {
    pub fn of<P: StrongPointer>(pointer: &P) -> Self {
        Identity(P::address(pointer))
    }
}

/// A non-owning handle to a single referent.
///
/// Equality, hashing and ordering go through [`Identity`] only, so two handles
/// created from the same referent stay equal after it has been dropped.
pub struct WeakRef<P: StrongPointer> {
    identity: Identity,
    observer: P::Weak,
}

impl<P: StrongPointer> WeakRef<P> {
    pub fn new(pointer: &P) -> Self {
        WeakRef {
            identity: Identity::of(pointer),
            observer: P::downgrade(pointer),
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn is_alive(&self) -> bool {
        P::is_live(&self.observer)
    }

    pub fn resolve(&self) -> Option<P> {
        P::upgrade(&self.observer)
    }

    /// Whether this handle was created from `pointer`'s referent.
    pub fn refers_to(&self, pointer: &P) -> bool {
        self.identity == Identity::of(pointer)
    }
}

impl<P: StrongPointer> Clone for WeakRef<P> {
    fn clone(&self) -> Self {
        WeakRef {
            identity: self.identity,
            observer: self.observer.clone(),
        }
    }
}

impl<P: StrongPointer> Debug for WeakRef<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRef")
            .field("identity", &self.identity)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl<P: StrongPointer> PartialEq for WeakRef<P> {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl<P: StrongPointer> Eq for WeakRef<P> {}

impl<P: StrongPointer> Hash for WeakRef<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl<P: StrongPointer> PartialOrd for WeakRef<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: StrongPointer> Ord for WeakRef<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity.cmp(&other.identity)
    }
}
