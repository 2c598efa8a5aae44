//! Capability markers.
//!
//! A capability is a typed question that active states may answer, such as
//! "how much time has elapsed?". States register providers for the
//! capabilities they implement, and the machine asks the innermost active
//! provider first.

/// Marker trait naming a queryable capability and its answer type.
///
/// # Example
///
/// ```rust
/// use statechart::core::Capability;
///
/// /// Seconds accumulated by a stopwatch.
/// struct ElapsedTime;
///
/// impl Capability for ElapsedTime {
///     type Output = f64;
/// }
/// ```
pub trait Capability: 'static {
    /// Value returned by a provider of this capability.
    type Output: 'static;

    /// Name used in diagnostics.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}
