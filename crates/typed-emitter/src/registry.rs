//! Registry — EventName → ordered listener set, plus the once set.
//!
//! Each entry is a [`ListenerSet<P>`] for that event's payload type, stored
//! type-erased so one map can hold every event of an emitter. Entries are
//! dropped as soon as they become empty, so `event_names()` only reports
//! names that currently have listeners.
//!
//! The once set is shared by all event names: a listener marked once is
//! retired after its next invocation under *any* name, and unsubscribing it
//! from any name clears the mark. Marks are only added on subscribe and are
//! cleared by every removal, so a marked listener is always subscribed
//! somewhere.
//!
//! The registry itself is not synchronized; [`Emitter`](crate::Emitter) keeps
//! it behind a `parking_lot::Mutex` and never holds that lock while a listener
//! runs.

use std::any::{type_name, Any};
use std::collections::{HashMap, HashSet};

use crate::error::{EmitterError, Result};
use crate::event::EventName;
use crate::listener::{Listener, ListenerKey};

// ============================================================================
// ListenerSet<P>
// ============================================================================

/// Insertion-ordered set of listeners for one event name.
pub(crate) struct ListenerSet<P> {
    listeners: Vec<Listener<P>>,
}

impl<P> ListenerSet<P> {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Add `listener` unless present; a repeated insert keeps the original
    /// position. Returns `true` if the listener was not present before.
    fn insert(&mut self, listener: &Listener<P>) -> bool {
        if self.contains(listener) {
            return false;
        }
        self.listeners.push(listener.clone());
        true
    }

    /// Remove `listener`. Returns `true` if it was present.
    fn remove(&mut self, listener: &Listener<P>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !l.ptr_eq(listener));
        self.listeners.len() != before
    }

    fn contains(&self, listener: &Listener<P>) -> bool {
        self.listeners.iter().any(|l| l.ptr_eq(listener))
    }

    /// Listeners in subscription order (cheap: ref-count bumps).
    pub(crate) fn snapshot(&self) -> Vec<Listener<P>> {
        self.listeners.clone()
    }

    fn len(&self) -> usize {
        self.listeners.len()
    }

    fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

// ============================================================================
// Type erasure
// ============================================================================

trait ErasedSet: Send + Sync {
    fn len(&self) -> usize;
    fn payload_type(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<P: 'static> ErasedSet for ListenerSet<P> {
    fn len(&self) -> usize {
        ListenerSet::len(self)
    }

    fn payload_type(&self) -> &'static str {
        type_name::<P>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn mismatch<P>(event: EventName, set: &dyn ErasedSet) -> EmitterError {
    EmitterError::PayloadMismatch {
        event,
        registered: set.payload_type(),
        requested: type_name::<P>(),
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Default)]
pub(crate) struct Registry {
    entries: HashMap<EventName, Box<dyn ErasedSet>>,
    /// Listeners to retire after their next invocation, across all names.
    once: HashSet<ListenerKey>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The listener set for `event`, if any listeners are registered.
    pub(crate) fn get<P: 'static>(&self, event: EventName) -> Result<Option<&ListenerSet<P>>> {
        let Some(set) = self.entries.get(event) else {
            return Ok(None);
        };
        match set.as_any().downcast_ref::<ListenerSet<P>>() {
            Some(typed) => Ok(Some(typed)),
            None => Err(mismatch::<P>(event, &**set)),
        }
    }

    /// Whether `listener` is subscribed to `event`. A set of another payload
    /// type counts as "not subscribed".
    pub(crate) fn contains<P: 'static>(&self, event: EventName, listener: &Listener<P>) -> bool {
        matches!(self.get::<P>(event), Ok(Some(set)) if set.contains(listener))
    }

    /// The listener set for `event`, created empty if missing.
    ///
    /// Callers must leave at least one listener in a set they create.
    fn get_or_insert<P: 'static>(&mut self, event: EventName) -> Result<&mut ListenerSet<P>> {
        let set = self
            .entries
            .entry(event)
            .or_insert_with(|| Box::new(ListenerSet::<P>::new()));
        let err = mismatch::<P>(event, &**set);
        set.as_any_mut().downcast_mut::<ListenerSet<P>>().ok_or(err)
    }

    /// Subscribe `listener` to `event`, marking it once if asked. An existing
    /// mark is never cleared here. Returns `true` if newly added.
    pub(crate) fn insert<P: 'static>(
        &mut self,
        event: EventName,
        listener: &Listener<P>,
        once: bool,
    ) -> Result<bool> {
        let added = self.get_or_insert::<P>(event)?.insert(listener);
        if once {
            self.once.insert(listener.key());
        }
        Ok(added)
    }

    /// Unsubscribe `listener` from `event`, dropping the entry once empty.
    /// The once mark is cleared whether or not the listener was subscribed to
    /// `event`. Returns `true` if the listener was present.
    pub(crate) fn remove<P: 'static>(
        &mut self,
        event: EventName,
        listener: &Listener<P>,
    ) -> Result<bool> {
        self.once.remove(&listener.key());
        let Some(set) = self.entries.get_mut(event) else {
            return Ok(false);
        };
        let err = mismatch::<P>(event, &**set);
        let typed = set.as_any_mut().downcast_mut::<ListenerSet<P>>().ok_or(err)?;
        let removed = typed.remove(listener);
        if typed.is_empty() {
            self.entries.remove(event);
        }
        Ok(removed)
    }

    /// Whether `listener` is marked to be retired after its next invocation.
    pub(crate) fn is_once<P>(&self, listener: &Listener<P>) -> bool {
        self.once.contains(&listener.key())
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.once.clear();
    }

    pub(crate) fn listener_count(&self, event: EventName) -> usize {
        self.entries.get(event).map_or(0, |set| set.len())
    }

    /// Names with at least one listener, sorted.
    pub(crate) fn event_names(&self) -> Vec<EventName> {
        let mut names: Vec<EventName> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
