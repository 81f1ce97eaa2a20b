use serde::{Deserialize, Serialize};

/// Options accepted by [`Emitter::subscribe`](crate::Emitter::subscribe).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscribeOptions {
    /// Remove the listener right after its first invocation.
    pub once: bool,
}

impl SubscribeOptions {
    /// Options for a listener that fires at most once.
    pub fn once() -> Self {
        Self { once: true }
    }
}
