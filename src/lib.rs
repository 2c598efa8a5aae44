//! Statechart: a hierarchical state machine engine
//!
//! States own nested substates, react to typed events with declared
//! transitions and run entry/exit hooks in strict nesting order. Values
//! derived from the active states are read through typed capability
//! queries answered by whichever states are currently active.
//!
//! # Core Concepts
//!
//! - **Chart**: Validated, immutable hierarchy of states built with [`ChartBuilder`]
//! - **Activity**: Runtime data created on entry to a state and dropped on exit
//! - **Capability**: Typed question answered by the innermost active provider
//! - **Machine**: The active chain of one running instance of a chart
//!
//! # Example
//!
//! ```rust
//! use statechart::core::Capability;
//! use statechart::machine::{Activity, Machine, Scope};
//! use statechart::{event_enum, state_enum, ChartBuilder};
//!
//! state_enum! {
//!     enum Watch {
//!         Active,
//!         Stopped,
//!         Running,
//!     }
//! }
//!
//! event_enum! {
//!     enum WatchEvent {
//!         StartStop,
//!         Reset,
//!     }
//! }
//!
//! struct Laps;
//!
//! impl Capability for Laps {
//!     type Output = u32;
//! }
//!
//! #[derive(Default)]
//! struct Counter {
//!     laps: u32,
//! }
//!
//! impl Activity<Watch, ()> for Counter {}
//!
//! #[derive(Default)]
//! struct Lap;
//!
//! impl Activity<Watch, ()> for Lap {
//!     fn on_exit(&mut self, scope: &mut Scope<'_, Watch, ()>) {
//!         if let Some(counter) = scope.ancestor_mut::<Counter>() {
//!             counter.laps += 1;
//!         }
//!     }
//! }
//!
//! let chart = ChartBuilder::<Watch, WatchEvent>::new("stopwatch", Watch::Active)
//!     .state(Watch::Active, |s| {
//!         s.initial(Watch::Stopped)
//!             .activity::<Counter>()
//!             .on(WatchEvent::Reset, Watch::Active)
//!             .provides::<Laps, Counter, _>(|c, _| c.laps)
//!     })
//!     .state(Watch::Stopped, |s| s.parent(Watch::Active).on(WatchEvent::StartStop, Watch::Running))
//!     .state(Watch::Running, |s| {
//!         s.parent(Watch::Active)
//!             .activity::<Lap>()
//!             .on(WatchEvent::StartStop, Watch::Stopped)
//!     })
//!     .build()
//!     .unwrap();
//!
//! let mut machine = Machine::new(chart, ());
//! machine.initiate().unwrap();
//! machine.process_event(&WatchEvent::StartStop).unwrap();
//! machine.process_event(&WatchEvent::StartStop).unwrap();
//! assert_eq!(machine.query::<Laps>(), Ok(1));
//!
//! machine.process_event(&WatchEvent::Reset).unwrap();
//! assert_eq!(machine.query::<Laps>(), Ok(0));
//! ```

pub mod builder;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, ChartBuilder, StateBuilder};
pub use core::{Capability, Event, State, TransitionLog, TransitionRecord};
pub use machine::{
    Activity, Ancestors, Chart, Dispatch, Lifecycle, Machine, MachineError, MachineOptions, Scope,
    UnhandledPolicy,
};
