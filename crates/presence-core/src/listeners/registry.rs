//! Generic listener registry
//!
//! Registration and removal are serialised by a lock. Dispatch copies the
//! current listeners under the lock and invokes them after releasing it, so
//! a listener may register or unregister listeners from inside its callback.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Ordered set of distinct listeners, compared by handle identity
pub struct ListenerRegistry<L: ?Sized> {
    listeners: Mutex<Vec<Arc<L>>>,
}

fn same_listener<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    // Compare data pointers only; vtable pointers of the same object may differ.
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl<L: ?Sized> ListenerRegistry<L> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Add a listener. Returns `false` if it was already registered.
    pub fn add(&self, listener: Arc<L>) -> bool {
        let mut listeners = self.listeners.lock();
        if listeners.iter().any(|existing| same_listener(existing, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn remove(&self, listener: &Arc<L>) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|existing| !same_listener(existing, listener));
        listeners.len() != before
    }

    pub fn contains(&self, listener: &Arc<L>) -> bool {
        self.listeners
            .lock()
            .iter()
            .any(|existing| same_listener(existing, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Copy of the listeners registered right now, in insertion order
    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.listeners.lock().clone()
    }

    /// Invoke `notify` for every listener in the snapshot. Returns the number
    /// of listeners notified.
    pub fn dispatch<F>(&self, mut notify: F) -> usize
    where
        F: FnMut(&L),
    {
        let snapshot = self.snapshot();
        for listener in &snapshot {
            notify(listener.as_ref());
        }
        snapshot.len()
    }
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for ListenerRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
