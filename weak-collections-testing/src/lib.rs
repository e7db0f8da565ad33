//! Referents that count themselves, for checking that the collections never
//! keep anything alive.
//!
//! `#[leak_checked_test]` (from `weak-collections-macros`) wraps a test body in
//! a [`LeakGuard`]. Only ever a dev-dependency.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

std::thread_local! {
    static LIVE_TRACKED: Cell<usize> = const { Cell::new(0) };
}

/// Number of [`Tracked`]s currently alive on this thread.
pub fn live_tracked() -> usize {
    LIVE_TRACKED.with(|live| live.get())
}

#[derive(Debug, PartialEq, Eq)]
pub struct Tracked {
    id: usize,
}

impl Tracked {
    pub fn new(id: usize) -> Self {
        LIVE_TRACKED.with(|live| live.set(live.get() + 1));
        Tracked { id }
    }

    pub fn rc(id: usize) -> Rc<Tracked> {
        Rc::new(Tracked::new(id))
    }

    pub fn arc(id: usize) -> Arc<Tracked> {
        Arc::new(Tracked::new(id))
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Tracked::new(self.id)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        LIVE_TRACKED.with(|live| live.set(live.get() - 1));
    }
}

/// Asserts on drop that every tracked value created since the guard was
/// taken has been dropped again.
pub struct LeakGuard {
    baseline: usize,
}

impl LeakGuard {
    pub fn new() -> Self {
        LeakGuard {
            baseline: live_tracked(),
        }
    }
}

impl Default for LeakGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LeakGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let live = live_tracked();
        assert_eq!(
            live, self.baseline,
            "{} tracked value(s) outlived the test body",
            live.saturating_sub(self.baseline)
        );
    }
}
