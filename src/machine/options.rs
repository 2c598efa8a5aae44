//! Machine configuration.

use serde::{Deserialize, Serialize};

/// What a machine does with an event no active state reacts to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnhandledPolicy {
    /// Discard the event and report [`Dispatch::Unhandled`](crate::machine::Dispatch::Unhandled).
    #[default]
    Ignore,
    /// Fail with [`MachineError::UnhandledEvent`](crate::machine::MachineError::UnhandledEvent).
    Reject,
}

/// Runtime options of a [`Machine`](crate::machine::Machine).
///
/// # Example
///
/// ```rust
/// use statechart::machine::{MachineOptions, UnhandledPolicy};
///
/// let options: MachineOptions =
///     serde_json::from_str(r#"{ "unhandled": "reject", "log_capacity": 16 }"#).unwrap();
///
/// assert_eq!(options.unhandled, UnhandledPolicy::Reject);
/// assert!(options.record_transitions);
/// assert_eq!(options.log_capacity, Some(16));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    pub unhandled: UnhandledPolicy,
    /// Keep a [`TransitionLog`](crate::core::TransitionLog) of completed transitions.
    pub record_transitions: bool,
    /// Maximum number of retained records; `None` keeps everything.
    pub log_capacity: Option<usize>,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            unhandled: UnhandledPolicy::Ignore,
            record_transitions: true,
            log_capacity: Some(1024),
        }
    }
}

impl MachineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unhandled(mut self, policy: UnhandledPolicy) -> Self {
        self.unhandled = policy;
        self
    }

    pub fn record_transitions(mut self, record: bool) -> Self {
        self.record_transitions = record;
        self
    }

    pub fn log_capacity(mut self, capacity: Option<usize>) -> Self {
        self.log_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_ignore_and_record() {
        let options = MachineOptions::default();
        assert_eq!(options.unhandled, UnhandledPolicy::Ignore);
        assert!(options.record_transitions);
        assert_eq!(options.log_capacity, Some(1024));
    }

    #[test]
    fn fluent_setters() {
        let options = MachineOptions::new()
            .unhandled(UnhandledPolicy::Reject)
            .record_transitions(false)
            .log_capacity(None);

        assert_eq!(options.unhandled, UnhandledPolicy::Reject);
        assert!(!options.record_transitions);
        assert_eq!(options.log_capacity, None);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let options: MachineOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, MachineOptions::default());
    }

    #[test]
    fn serialization_roundtrip() {
        let options = MachineOptions::new().unhandled(UnhandledPolicy::Reject);
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"reject\""));
        let back: MachineOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
