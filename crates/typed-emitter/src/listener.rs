//! Listener<P> — a shared callback with reference identity.
//!
//! Closures have no identity of their own, so a listener is wrapped once in a
//! [`Listener`] and that handle (or a clone of it) is what gets subscribed and
//! later unsubscribed. Clones share one allocation and compare equal; two
//! handles built from identical closures do not.

use std::fmt;
use std::sync::Arc;

/// Closure type for event listeners. `P` is the event's payload tuple.
pub type ListenerFn<P> = dyn Fn(&P) + Send + Sync;

/// Address of a listener's shared callback; equal for clones of one listener.
pub(crate) type ListenerKey = usize;

/// Cloneable handle to a listener callback.
pub struct Listener<P> {
    callback: Arc<ListenerFn<P>>,
}

impl<P> Listener<P> {
    pub fn new(callback: impl Fn(&P) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Whether `self` and `other` are the same listener.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }

    pub(crate) fn key(&self) -> ListenerKey {
        Arc::as_ptr(&self.callback).cast::<()>() as usize
    }

    pub(crate) fn call(&self, payload: &P) {
        (self.callback)(payload)
    }
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<P> PartialEq for Listener<P> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<P> Eq for Listener<P> {}

impl<P> fmt::Debug for Listener<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}
