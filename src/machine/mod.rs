//! Running charts.
//!
//! This module provides the runtime side of the engine:
//! - [`Chart`]: the validated, immutable hierarchy
//! - [`Machine`]: the active chain, event dispatch and capability queries
//! - [`Activity`] and [`Scope`]: per-activation data and what hooks can see

pub(crate) mod chart;
mod engine;
mod error;
mod options;
pub(crate) mod scope;

pub use chart::{Chart, StateNode};
pub use engine::{Dispatch, Lifecycle, Machine};
pub use error::MachineError;
pub use options::{MachineOptions, UnhandledPolicy};
pub use scope::{Activity, Ancestors, Scope};
