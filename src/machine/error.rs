//! Runtime errors of a machine.

use thiserror::Error;

/// Errors returned by [`Machine`](crate::machine::Machine) operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("machine has already been initiated")]
    AlreadyInitiated,

    #[error("machine is not running")]
    NotInitiated,

    #[error("no active state provides capability '{capability}'")]
    CapabilityNotFound { capability: String },

    #[error("state '{state}' targets unknown state '{target}'")]
    UnknownTransitionTarget { state: String, target: String },

    #[error("no active state reacts to event '{event}'")]
    UnhandledEvent { event: String },
}
