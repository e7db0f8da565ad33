use std::ops::Deref;
use std::rc::{self, Rc};
use std::sync::{self, Arc};

/// A reference-counted owning pointer that has a non-owning counterpart.
///
/// This is the seam between the collections and whatever reclaims memory: the
/// collections only ever hold `Self::Weak`, and rely on the pointer type to
/// report when the last strong owner has gone away.
pub trait StrongPointer: Clone + Deref {
    type Weak: Clone;

    fn downgrade(this: &Self) -> Self::Weak;
    fn upgrade(weak: &Self::Weak) -> Option<Self>;

    /// True while at least one strong pointer to the referent exists.
    fn is_live(weak: &Self::Weak) -> bool;

    /// Address of the shared allocation. Stable for as long as any strong or
    /// weak pointer to it exists.
    fn address(this: &Self) -> usize;

    fn ptr_eq(this: &Self, other: &Self) -> bool {
        Self::address(this) == Self::address(other)
    }
}

impl<T: ?Sized> StrongPointer for Rc<T> {
    type Weak = rc::Weak<T>;

    fn downgrade(this: &Self) -> Self::Weak {
        Rc::downgrade(this)
    }

    fn upgrade(weak: &Self::Weak) -> Option<Self> {
        weak.upgrade()
    }

    fn is_live(weak: &Self::Weak) -> bool {
        weak.strong_count() > 0
    }

    fn address(this: &Self) -> usize {
        Rc::as_ptr(this).cast::<()>() as usize
    }

    fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(this, other)
    }
}

impl<T: ?Sized> StrongPointer for Arc<T> {
    type Weak = sync::Weak<T>;

    fn downgrade(this: &Self) -> Self::Weak {
        Arc::downgrade(this)
    }

    fn upgrade(weak: &Self::Weak) -> Option<Self> {
        weak.upgrade()
    }

    fn is_live(weak: &Self::Weak) -> bool {
        weak.strong_count() > 0
    }

    fn address(this: &Self) -> usize {
        Arc::as_ptr(this).cast::<()>() as usize
    }

    fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(this, other)
    }
}
