//! State identifiers.
//!
//! A state identifier names one node of a chart's hierarchy. Identifiers
//! are plain values (usually fieldless enums) and carry no runtime data;
//! per-activation data lives in an [`Activity`](crate::machine::Activity).

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state identifiers.
///
/// All methods are pure. An identifier is stable for the lifetime of the
/// process and is used as a registry key, so it must be hashable.
///
/// # Required Traits
///
/// - `Clone` + `Eq` + `Hash`: identifiers key the chart registry
/// - `Debug`: identifiers appear in diagnostics
/// - `Serialize` + `Deserialize`: identifiers appear in transition records
///
/// # Example
///
/// ```rust
/// use statechart::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Watch {
///     Active,
///     Stopped,
///     Running,
/// }
///
/// impl State for Watch {
///     fn name(&self) -> &str {
///         match self {
///             Self::Active => "Active",
///             Self::Stopped => "Stopped",
///             Self::Running => "Running",
///         }
///     }
/// }
///
/// assert_eq!(Watch::Running.name(), "Running");
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}
