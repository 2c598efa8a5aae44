//! Build errors for chart registration.

use thiserror::Error;

/// Problems detected while registering a chart.
///
/// States and events are reported by name so the error does not need to be
/// generic over the chart's types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("root state '{state}' is not registered")]
    MissingRoot { state: String },

    #[error("state '{state}' is registered more than once")]
    DuplicateState { state: String },

    #[error("malformed hierarchy at '{state}': {reason}")]
    MalformedHierarchy { state: String, reason: String },

    #[error("state '{state}' reacts to '{event}' with unknown target '{target}'")]
    UnknownTransitionTarget {
        state: String,
        event: String,
        target: String,
    },

    #[error("state '{state}' declares more than one transition for '{event}'")]
    DuplicateTransition { state: String, event: String },

    #[error(
        "state '{state}' provides '{capability}' from '{provider}' but its activity is '{activity}'"
    )]
    CapabilityTypeMismatch {
        state: String,
        capability: String,
        provider: String,
        activity: String,
    },
}
