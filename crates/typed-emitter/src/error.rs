use thiserror::Error;

use crate::event::EventName;

// ---------------------------------------------------------------------------
// EmitterError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitterError {
    /// Two events of one map share a name but not a payload type.
    ///
    /// `event_map!` rejects duplicate names at compile time, so this only
    /// surfaces for hand-written `Event` impls.
    #[error(
        "Payload mismatch for event \"{event}\": listeners are registered with {registered}, \
         but {requested} was requested"
    )]
    PayloadMismatch {
        event: EventName,
        registered: &'static str,
        requested: &'static str,
    },
}

/// Convenience alias — the default error type is `EmitterError`.
pub type Result<T, E = EmitterError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
