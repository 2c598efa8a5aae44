//! Events delivered to a machine.
//!
//! An event is an immutable signal. Dispatch only looks at its kind; any
//! payload is carried along for hooks that care about it but never takes
//! part in transition selection.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for events processed by a [`Machine`](crate::machine::Machine).
///
/// # Example
///
/// An event with a payload uses a separate kind enum:
///
/// ```rust
/// use statechart::core::Event;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Kind {
///     Lap,
///     Reset,
/// }
///
/// #[derive(Debug)]
/// enum WatchEvent {
///     Lap { label: String },
///     Reset,
/// }
///
/// impl Event for WatchEvent {
///     type Kind = Kind;
///
///     fn kind(&self) -> Kind {
///         match self {
///             Self::Lap { .. } => Kind::Lap,
///             Self::Reset => Kind::Reset,
///         }
///     }
/// }
///
/// let lap = WatchEvent::Lap { label: "first".into() };
/// assert_eq!(lap.kind(), Kind::Lap);
/// ```
///
/// Payload-free events can use [`event_enum!`](crate::event_enum), which
/// makes the enum its own kind.
pub trait Event: Debug {
    /// Tag used as the key of transition tables.
    type Kind: Clone + Eq + Hash + Debug;

    /// The kind of this event.
    fn kind(&self) -> Self::Kind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Kind {
        Tick,
        Stop,
    }

    #[derive(Debug)]
    enum TestEvent {
        Tick(u32),
        Stop,
    }

    impl Event for TestEvent {
        type Kind = Kind;

        fn kind(&self) -> Kind {
            match self {
                Self::Tick(_) => Kind::Tick,
                Self::Stop => Kind::Stop,
            }
        }
    }

    #[test]
    fn kind_ignores_payload() {
        assert_eq!(TestEvent::Tick(1).kind(), TestEvent::Tick(99).kind());
        assert_ne!(TestEvent::Tick(1).kind(), TestEvent::Stop.kind());
    }
}
