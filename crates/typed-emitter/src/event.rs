//! Event vocabulary — the compile-time mapping from event names to payloads.
//!
//! An [`EventMap`] is a marker type naming a family of events. Each event is
//! its own marker type implementing [`Event`], which fixes its wire name and
//! its payload tuple. [`Emitter<M>`](crate::Emitter) only accepts events whose
//! `Map` is `M`, so a payload of the wrong shape is a type error rather than a
//! runtime failure.
//!
//! Maps are normally declared with [`event_map!`](crate::event_map), which
//! also rejects duplicate event names at compile time.

/// Key identifying a class of event within a map.
pub type EventName = &'static str;

/// A family of events accepted by one emitter.
pub trait EventMap: 'static {
    /// Names of every event declared in the map, in declaration order.
    const EVENT_NAMES: &'static [EventName];
}

/// A single named event of map `Self::Map`.
pub trait Event: 'static {
    /// The map this event belongs to.
    type Map: EventMap;

    /// Positional payload delivered to listeners, as a tuple.
    /// `()` for events without arguments.
    type Payload: 'static;

    /// Registry key for this event.
    const NAME: EventName;
}

/// Declare an [`EventMap`] and its events.
///
/// ```
/// typed_emitter::event_map! {
///     /// Events of the guide.
///     pub struct Hitchhiker {
///         MeaningOfLife = "meaningOfLife" => (u32,);
///         Protagonist = "protagonist" => (String, String);
///         Beep = "beep" => ();
///     }
/// }
///
/// use typed_emitter::Event;
/// assert_eq!(MeaningOfLife::NAME, "meaningOfLife");
/// ```
///
/// Declaring the same name twice in one map fails to compile.
#[macro_export]
macro_rules! event_map {
    (
        $(#[$meta:meta])*
        $vis:vis struct $map:ident {
            $(
                $(#[$event_meta:meta])*
                $event:ident = $name:literal => $payload:ty
            );* $(;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $map;

        impl $crate::EventMap for $map {
            const EVENT_NAMES: &'static [$crate::EventName] = &[$($name),*];
        }

        const _: () = $crate::event::assert_unique_names(
            <$map as $crate::EventMap>::EVENT_NAMES,
        );

        $(
            $(#[$event_meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            $vis struct $event;

            impl $crate::Event for $event {
                type Map = $map;
                type Payload = $payload;
                const NAME: $crate::EventName = $name;
            }
        )*
    };
}

/// Compile-time guard used by [`event_map!`](crate::event_map).
#[doc(hidden)]
pub const fn assert_unique_names(names: &[EventName]) {
    let mut i = 0;
    while i < names.len() {
        let mut j = i + 1;
        while j < names.len() {
            if str_eq(names[i], names[j]) {
                panic!("duplicate event name in event map");
            }
            j += 1;
        }
        i += 1;
    }
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
