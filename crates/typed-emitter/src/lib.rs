//! Strongly-typed synchronous publish/subscribe.
//!
//! ```
//! use typed_emitter::{event_map, Emitter, Listener};
//!
//! event_map! {
//!     pub struct Guide {
//!         MeaningOfLife = "meaningOfLife" => (u32,);
//!         Beep = "beep" => ();
//!     }
//! }
//!
//! let emitter: Emitter<Guide> = Emitter::new();
//! let answer = Listener::new(|(n,): &(u32,)| assert_eq!(*n, 42));
//! emitter.on::<MeaningOfLife>(&answer);
//! emitter.emit::<MeaningOfLife>((42,));
//! emitter.off::<MeaningOfLife>(&answer);
//!
//! emitter.listen_once::<Beep>(|_| {});
//! emitter.emit::<Beep>(());
//! assert!(!emitter.has_listeners::<Beep>());
//! ```

pub mod emitter;
pub mod error;
pub mod event;
pub mod listener;
pub mod options;

mod registry;

pub use emitter::Emitter;
pub use error::{EmitterError, Result};
pub use event::{Event, EventMap, EventName};
pub use listener::{Listener, ListenerFn};
pub use options::SubscribeOptions;
