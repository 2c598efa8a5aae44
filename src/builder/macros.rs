//! Macros for ergonomic chart construction.

/// Generate a State trait implementation for simple enums.
///
/// # Example
///
/// ```
/// use statechart::core::State;
/// use statechart::state_enum;
///
/// state_enum! {
///     pub enum Watch {
///         Active,
///         Stopped,
///         Running,
///     }
/// }
///
/// assert_eq!(Watch::Stopped.name(), "Stopped");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

/// Generate an Event trait implementation for payload-free enums.
///
/// The enum is its own kind.
///
/// # Example
///
/// ```
/// use statechart::core::Event;
/// use statechart::event_enum;
///
/// event_enum! {
///     pub enum WatchEvent {
///         StartStop,
///         Reset,
///     }
/// }
///
/// assert_eq!(WatchEvent::Reset.kind(), WatchEvent::Reset);
/// ```
#[macro_export]
macro_rules! event_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::Event for $name {
            type Kind = Self;

            fn kind(&self) -> Self {
                *self
            }
        }
    };
}
