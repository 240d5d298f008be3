//! Scoped re-entrancy suppression.
//!
//! The scene adapter fires `object:removed` synchronously for every
//! primitive we delete during our own housekeeping (cascades, bulk
//! clears, imports), and an external undo system observes `object:added`
//! during bulk loads. Both must be able to tell our housekeeping apart
//! from user actions. Instead of a manually toggled flag, suppression is
//! a counted scope released on every exit path by `Drop`.

use std::cell::Cell;
use std::rc::Rc;

/// A shareable suppression counter. Cloning shares the count.
#[derive(Debug, Clone, Default)]
pub struct Suppression(Rc<Cell<u32>>);

impl Suppression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a suppressed scope. Scopes nest; suppression lasts until the
    /// returned guard (and every nested one) is dropped.
    #[must_use]
    pub fn scope(&self) -> SuppressGuard {
        self.0.set(self.0.get() + 1);
        SuppressGuard(Rc::clone(&self.0))
    }

    pub fn active(&self) -> bool {
        self.0.get() > 0
    }
}

/// Releases one suppression level on drop.
pub struct SuppressGuard(Rc<Cell<u32>>);

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}
