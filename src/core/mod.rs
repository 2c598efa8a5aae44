//! Core vocabulary of the engine.
//!
//! This module contains the value types every chart is built from:
//! - State identifiers via the `State` trait
//! - Events via the `Event` trait
//! - Capability markers for typed queries
//! - The transition log
//!
//! Nothing in here runs hooks or owns runtime data; that is the job of
//! [`machine`](crate::machine).

mod capability;
mod event;
mod state;
mod transition_log;

pub use capability::Capability;
pub use event::Event;
pub use state::State;
pub use transition_log::{TransitionLog, TransitionRecord};
