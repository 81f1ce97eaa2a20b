//! Emitter<M> — a typed, synchronous pub/sub registry.
//!
//! Listeners are grouped by event name; each name keeps its listeners in
//! subscription order, and a given [`Listener`] appears at most once per name.
//!
//! Emission semantics:
//!   - Listeners are invoked in subscription order, from a snapshot taken when
//!     `emit` starts. A listener added *during* emission is NOT called until
//!     the next emit.
//!   - A listener unsubscribed during emission before its turn is skipped.
//!     One that already ran is unaffected.
//!   - A listener marked once is unsubscribed from the emitted event right
//!     after it returns, before the next listener runs. The once mark is
//!     shared by all event names: it is honoured whichever event fires the
//!     listener, and unsubscribing the listener from any event clears it.
//!
//! Panics inside a listener propagate to the caller of `emit`; the remaining
//! listeners of that emission are not called.
//!
//! All methods take `&self` (interior mutability via `parking_lot::Mutex`).
//! The lock is never held while a listener runs, so listeners can call
//! `on()`/`off()`/`emit()` without deadlocking.

use std::fmt;
use std::marker::PhantomData;

use parking_lot::Mutex;

use crate::error::Result;
use crate::event::{Event, EventMap, EventName};
use crate::listener::Listener;
use crate::options::SubscribeOptions;
use crate::registry::Registry;

/// Typed synchronous event emitter for the events of map `M`.
pub struct Emitter<M: EventMap> {
    registry: Mutex<Registry>,
    _map: PhantomData<fn() -> M>,
}

impl<M: EventMap> Emitter<M> {
    /// Create a new, empty emitter.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            _map: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Subscription
    // ------------------------------------------------------------------

    /// Subscribe `listener` to `E`.
    ///
    /// Subscribing a listener that is already subscribed to `E` does not add
    /// a second subscription. With `options.once` the listener is marked
    /// once: it is removed right after its next invocation, from whichever
    /// event invoked it. A once mark is never cleared by a later non-once
    /// subscribe, only by unsubscribing the listener from any event.
    ///
    /// # Panics
    ///
    /// If another event of this map was registered under the same name with
    /// a different payload type. See [`try_subscribe`](Self::try_subscribe).
    pub fn subscribe<E>(&self, listener: &Listener<E::Payload>, options: SubscribeOptions)
    where
        E: Event<Map = M>,
    {
        if let Err(err) = self.try_subscribe::<E>(listener, options) {
            panic!("{err}");
        }
    }

    /// Fallible form of [`subscribe`](Self::subscribe).
    pub fn try_subscribe<E>(
        &self,
        listener: &Listener<E::Payload>,
        options: SubscribeOptions,
    ) -> Result<()>
    where
        E: Event<Map = M>,
    {
        let added = self
            .registry
            .lock()
            .insert(E::NAME, listener, options.once)?;
        tracing::debug!(event = E::NAME, once = options.once, added, "subscribed listener");
        Ok(())
    }

    /// Subscribe `listener` to `E` until it is unsubscribed.
    pub fn on<E>(&self, listener: &Listener<E::Payload>)
    where
        E: Event<Map = M>,
    {
        self.subscribe::<E>(listener, SubscribeOptions::default());
    }

    /// Subscribe `listener` to `E` for a single invocation.
    pub fn once<E>(&self, listener: &Listener<E::Payload>)
    where
        E: Event<Map = M>,
    {
        self.subscribe::<E>(listener, SubscribeOptions::once());
    }

    /// Wrap `callback` in a new [`Listener`], subscribe it to `E`, and return
    /// the handle for a later [`off`](Self::off).
    pub fn listen<E>(
        &self,
        callback: impl Fn(&E::Payload) + Send + Sync + 'static,
    ) -> Listener<E::Payload>
    where
        E: Event<Map = M>,
    {
        let listener = Listener::new(callback);
        self.on::<E>(&listener);
        listener
    }

    /// Like [`listen`](Self::listen), but the listener fires at most once.
    pub fn listen_once<E>(
        &self,
        callback: impl Fn(&E::Payload) + Send + Sync + 'static,
    ) -> Listener<E::Payload>
    where
        E: Event<Map = M>,
    {
        let listener = Listener::new(callback);
        self.once::<E>(&listener);
        listener
    }

    /// Remove `listener` from `E`.
    ///
    /// Does nothing if it is not subscribed (safe to call multiple times).
    /// Always clears the listener's once mark.
    ///
    /// # Panics
    ///
    /// Under the same payload-mismatch condition as [`subscribe`](Self::subscribe).
    pub fn unsubscribe<E>(&self, listener: &Listener<E::Payload>)
    where
        E: Event<Map = M>,
    {
        if let Err(err) = self.try_unsubscribe::<E>(listener) {
            panic!("{err}");
        }
    }

    /// Fallible form of [`unsubscribe`](Self::unsubscribe).
    pub fn try_unsubscribe<E>(&self, listener: &Listener<E::Payload>) -> Result<()>
    where
        E: Event<Map = M>,
    {
        let removed = self.registry.lock().remove(E::NAME, listener)?;
        tracing::debug!(event = E::NAME, removed, "unsubscribed listener");
        Ok(())
    }

    /// Alias for [`unsubscribe`](Self::unsubscribe).
    pub fn off<E>(&self, listener: &Listener<E::Payload>)
    where
        E: Event<Map = M>,
    {
        self.unsubscribe::<E>(listener);
    }

    /// Remove every listener of every event.
    pub fn unsubscribe_all(&self) {
        let mut registry = self.registry.lock();
        let events = registry.event_names().len();
        registry.clear();
        tracing::debug!(events, "unsubscribed all listeners");
    }

    // ------------------------------------------------------------------
    // Emission
    // ------------------------------------------------------------------

    /// Call every listener of `E` with `payload`.
    ///
    /// Emitting an event nobody listens to does nothing.
    ///
    /// # Panics
    ///
    /// Propagates any panic raised by a listener, and panics under the same
    /// payload-mismatch condition as [`subscribe`](Self::subscribe).
    pub fn emit<E>(&self, payload: E::Payload)
    where
        E: Event<Map = M>,
    {
        if let Err(err) = self.try_emit::<E>(payload) {
            panic!("{err}");
        }
    }

    /// Fallible form of [`emit`](Self::emit).
    pub fn try_emit<E>(&self, payload: E::Payload) -> Result<()>
    where
        E: Event<Map = M>,
    {
        // Snapshot under the lock (cheap: just ref-count bumps).
        let snapshot = match self.registry.lock().get::<E::Payload>(E::NAME)? {
            Some(set) => set.snapshot(),
            None => {
                tracing::trace!(event = E::NAME, "emit without listeners");
                return Ok(());
            }
        };
        tracing::trace!(event = E::NAME, listeners = snapshot.len(), "emitting");

        for listener in snapshot {
            // A set swapped for one of another payload type mid-pass counts as
            // "no longer subscribed".
            if !self.registry.lock().contains(E::NAME, &listener) {
                continue;
            }

            // Lock is released; the listener can safely call on()/off()/emit().
            listener.call(&payload);

            let mut registry = self.registry.lock();
            if registry.is_once(&listener) {
                match registry.remove(E::NAME, &listener) {
                    Ok(_) => tracing::debug!(event = E::NAME, "once listener fired, unsubscribed"),
                    Err(err) => tracing::warn!(
                        event = E::NAME,
                        error = %err,
                        "once listener fired but its set changed payload type"
                    ),
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Number of listeners currently subscribed to `E`.
    pub fn listener_count<E>(&self) -> usize
    where
        E: Event<Map = M>,
    {
        self.registry.lock().listener_count(E::NAME)
    }

    pub fn has_listeners<E>(&self) -> bool
    where
        E: Event<Map = M>,
    {
        self.listener_count::<E>() > 0
    }

    /// Whether `listener` is currently subscribed to `E`.
    pub fn is_subscribed<E>(&self, listener: &Listener<E::Payload>) -> bool
    where
        E: Event<Map = M>,
    {
        self.registry.lock().contains(E::NAME, listener)
    }

    /// Names of the events that currently have listeners, sorted.
    pub fn event_names(&self) -> Vec<EventName> {
        self.registry.lock().event_names()
    }
}

impl<M: EventMap> Default for Emitter<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: EventMap> fmt::Debug for Emitter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("map", &std::any::type_name::<M>())
            .field("events", &self.event_names())
            .finish()
    }
}
