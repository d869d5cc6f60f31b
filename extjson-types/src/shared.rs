//! Reference-counted nodes for aliased and cyclic graphs.

use crate::ExtValue;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A shared, mutable [`ExtValue`] node.
///
/// Cloning a `SharedValue` clones the handle, not the value, so the same
/// node can appear in several places of a tree, including inside itself.
/// Identity is the address of the shared allocation.
#[derive(Clone, Default)]
pub struct SharedValue(Arc<Mutex<ExtValue>>);

impl SharedValue {
    #[must_use]
    pub fn new(value: impl Into<ExtValue>) -> Self {
        Self(Arc::new(Mutex::new(value.into())))
    }

    /// Stable identity of the node for as long as any handle is alive.
    #[must_use]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Returns true if both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns a clone of the current value.
    ///
    /// Nested shared nodes are cloned as handles.
    #[must_use]
    pub fn get(&self) -> ExtValue {
        self.lock().clone()
    }

    /// Replaces the value, returning the previous one.
    pub fn set(&self, value: impl Into<ExtValue>) -> ExtValue {
        std::mem::replace(&mut *self.lock(), value.into())
    }

    /// Runs `f` against the value while holding the lock.
    ///
    /// `f` must not reach this same node again, or the lock is re-entered.
    pub fn with<R>(&self, f: impl FnOnce(&ExtValue) -> R) -> R {
        f(&self.lock())
    }

    /// Mutates the value in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut ExtValue) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, ExtValue> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SharedValue {
    // Does not print the content: the node may contain itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedValue({:#x})", self.id())
    }
}
