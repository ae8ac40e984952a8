//! Change notification primitive shared by all domain entities.
//!
//! # Responsibility
//! - Keep an ordered list of listeners for one kind of change.
//! - Deliver change payloads synchronously, in subscription order.
//!
//! # Invariants
//! - `trigger` delivers to the listener list captured when the call starts;
//!   subscribe/unsubscribe inside a listener only affects later triggers.
//! - The listener lock is never held while a listener runs.
//! - A panicking listener unwinds through `trigger`; later listeners of that
//!   trigger are skipped (fail-fast).

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared listener callback.
///
/// Identity for `unsubscribe` is the `Arc` allocation, so keep a clone of the
/// handle you subscribed if you want to remove it later.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Ordered multicast of change payloads of type `T`.
pub struct ChangeNotifier<T> {
    listeners: Mutex<Vec<Listener<T>>>,
}

impl<T> ChangeNotifier<T> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Appends one listener. Subscribing the same handle twice delivers twice.
    pub fn subscribe(&self, listener: Listener<T>) {
        self.lock().push(listener);
    }

    /// Removes every entry that shares the allocation of `listener`.
    pub fn unsubscribe(&self, listener: &Listener<T>) {
        self.lock()
            .retain(|existing| !same_listener(existing, listener));
    }

    /// Delivers `data` to each currently subscribed listener.
    pub fn trigger(&self, data: &T) {
        let snapshot = self.lock().clone();
        for listener in snapshot {
            listener(data);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Listener<T>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.len())
            .finish()
    }
}

fn same_listener<T>(left: &Listener<T>, right: &Listener<T>) -> bool {
    // Compare data pointers only; vtable addresses are not stable across codegen units.
    std::ptr::eq(
        Arc::as_ptr(left) as *const (),
        Arc::as_ptr(right) as *const (),
    )
}
