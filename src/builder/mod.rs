//! Builder API for chart construction.
//!
//! Charts are registered with fluent builders and checked as a whole before
//! a [`Chart`](crate::machine::Chart) is handed out, so a machine never runs
//! against a malformed hierarchy.

pub mod chart;
pub mod error;
pub mod macros;
pub mod state;

pub use chart::ChartBuilder;
pub use error::BuildError;
pub use state::StateBuilder;
