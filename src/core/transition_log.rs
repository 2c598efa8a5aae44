//! Transition log.
//!
//! Keeps an ordered, optionally bounded record of the transitions a machine
//! has completed. Records name the active leaf before and after each
//! transition, so the sequence of records describes the path the machine
//! took through its leaves.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single completed transition.
///
/// # Example
///
/// ```rust
/// use statechart::core::TransitionRecord;
/// use statechart::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     enum Watch {
///         Active,
///         Stopped,
///         Running,
///     }
/// }
///
/// let record = TransitionRecord {
///     event: "StartStop".to_string(),
///     source: Watch::Stopped,
///     from: Watch::Stopped,
///     to: Watch::Running,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, Watch::Running);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State> {
    /// Debug rendering of the event kind that triggered the transition
    pub event: String,
    /// The state whose transition table matched
    pub source: S,
    /// Active leaf before the transition
    pub from: S,
    /// Active leaf after the transition
    pub to: S,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered log of completed transitions.
///
/// When a capacity is set, the oldest records are evicted first.
///
/// # Example
///
/// ```rust
/// use statechart::core::{TransitionLog, TransitionRecord};
/// use statechart::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     enum Light {
///         Off,
///         On,
///     }
/// }
///
/// let mut log = TransitionLog::with_capacity(Some(1));
/// for (from, to) in [(Light::Off, Light::On), (Light::On, Light::Off)] {
///     log.record(TransitionRecord {
///         event: "Toggle".into(),
///         source: from.clone(),
///         from,
///         to,
///         timestamp: Utc::now(),
///     });
/// }
///
/// assert_eq!(log.len(), 1);
/// assert_eq!(log.get_path(), vec![&Light::On, &Light::Off]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionLog<S: State> {
    records: VecDeque<TransitionRecord<S>>,
    capacity: Option<usize>,
}

impl<S: State> Default for TransitionLog<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> TransitionLog<S> {
    /// Create an empty, unbounded log.
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// Create an empty log keeping at most `capacity` records.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            records: VecDeque::new(),
            capacity,
        }
    }

    /// Append a record, evicting the oldest one if the log is full.
    pub fn record(&mut self, record: TransitionRecord<S>) {
        if self.capacity == Some(0) {
            return;
        }
        if let Some(capacity) = self.capacity {
            while self.records.len() >= capacity {
                self.records.pop_front();
            }
        }
        self.records.push_back(record);
    }

    /// Iterate over the retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord<S>> {
        self.records.iter()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&TransitionRecord<S>> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Get the path of leaves traversed.
    ///
    /// Returns the `from` leaf of the oldest retained record followed by
    /// the `to` leaf of every record.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.records.front() {
            path.push(&first.from);
        }
        for record in &self.records {
            path.push(&record.to);
        }
        path
    }

    /// Time between the oldest and newest retained records.
    ///
    /// Returns `None` if the log is empty.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.records.front()?;
        let last = self.records.back()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Drop all retained records.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
