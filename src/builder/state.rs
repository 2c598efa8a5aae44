//! Builder for a single state definition.

use crate::core::{Capability, Event, State};
use crate::machine::chart::{ProvideFn, Provider, StateNode};
use crate::machine::scope::{Activity, ActivityVTable, Ancestors, Erased, Hook, Scope};
use std::any::{type_name, Any, TypeId};

/// Builder for one state with a fluent API.
///
/// Usually obtained through [`ChartBuilder::state`](crate::builder::ChartBuilder::state).
pub struct StateBuilder<S: State, E: Event, C> {
    pub(crate) id: S,
    pub(crate) parent: Option<S>,
    pub(crate) initial: Option<S>,
    pub(crate) transitions: Vec<(E::Kind, S)>,
    pub(crate) duplicate_events: Vec<E::Kind>,
    pub(crate) activity: ActivityVTable<S, C>,
    pub(crate) on_enter: Option<Hook<S, C>>,
    pub(crate) on_exit: Option<Hook<S, C>>,
    pub(crate) providers: Vec<Provider<S>>,
}

impl<S: State, E: Event, C> StateBuilder<S, E, C> {
    /// Create a builder for the state `id`.
    pub fn new(id: S) -> Self {
        Self {
            id,
            parent: None,
            initial: None,
            transitions: Vec::new(),
            duplicate_events: Vec::new(),
            activity: ActivityVTable::of::<()>(),
            on_enter: None,
            on_exit: None,
            providers: Vec::new(),
        }
    }

    pub fn id(&self) -> &S {
        &self.id
    }

    /// Nest this state inside `parent` (required for every state but the root).
    pub fn parent(mut self, parent: S) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Inner state entered by default (required for composite states).
    pub fn initial(mut self, child: S) -> Self {
        self.initial = Some(child);
        self
    }

    /// React to events of `kind` by transitioning to `target`.
    ///
    /// A state reacts at most once per kind; repeated kinds are reported
    /// when the chart is built.
    pub fn on(mut self, kind: E::Kind, target: S) -> Self {
        if self.transitions.iter().any(|(declared, _)| declared == &kind) {
            self.duplicate_events.push(kind);
        } else {
            self.transitions.push((kind, target));
        }
        self
    }

    /// Construct a `T` on every entry and drop it on every exit.
    pub fn activity<T>(mut self) -> Self
    where
        T: Activity<S, C> + Default,
    {
        self.activity = ActivityVTable::of::<T>();
        self
    }

    /// Run `hook` on entry, after the activity's own `on_enter`.
    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Scope<'_, S, C>) + Send + Sync + 'static,
    {
        self.on_enter = Some(Box::new(hook));
        self
    }

    /// Run `hook` on exit, before the activity's own `on_exit`.
    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Scope<'_, S, C>) + Send + Sync + 'static,
    {
        self.on_exit = Some(Box::new(hook));
        self
    }

    /// Answer the capability `Cap` while this state is active.
    ///
    /// `T` must be the state's activity type (`()` for states without one);
    /// a mismatch is reported when the chart is built. Registering the same
    /// capability twice keeps the last provider.
    pub fn provides<Cap, T, F>(mut self, provider: F) -> Self
    where
        Cap: Capability,
        T: Any,
        F: Fn(&T, &Ancestors<'_, S>) -> Cap::Output + Send + Sync + 'static,
    {
        let capability = TypeId::of::<Cap>();
        self.providers.retain(|p| p.capability != capability);
        self.providers.push(Provider {
            capability,
            capability_name: Cap::name(),
            data_type: TypeId::of::<T>(),
            data_type_name: type_name::<T>(),
            provide: erase_provider::<S, T, Cap::Output, F>(provider),
        });
        self
    }

    pub(crate) fn into_node(self, children: Vec<S>) -> StateNode<S, E, C> {
        StateNode {
            id: self.id,
            parent: self.parent,
            initial: self.initial,
            children,
            transitions: self.transitions,
            activity: self.activity,
            on_enter: self.on_enter,
            on_exit: self.on_exit,
            providers: self.providers,
        }
    }
}

fn erase_provider<S, T, O, F>(provider: F) -> ProvideFn<S>
where
    S: State,
    T: Any,
    O: 'static,
    F: Fn(&T, &Ancestors<'_, S>) -> O + Send + Sync + 'static,
{
    Box::new(move |data: &Erased, ancestors: &Ancestors<'_, S>| {
        let value = data.downcast_ref::<T>()?;
        Some(Box::new(provider(value, ancestors)) as Box<dyn Any>)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::scope::Activation;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Active,
        Stopped,
        Running,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Active => "Active",
                Self::Stopped => "Stopped",
                Self::Running => "Running",
            }
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum TestEvent {
        StartStop,
        Reset,
    }

    impl Event for TestEvent {
        type Kind = Self;

        fn kind(&self) -> Self {
            *self
        }
    }

    struct Elapsed;

    impl Capability for Elapsed {
        type Output = f64;
    }

    #[derive(Default)]
    struct Timer {
        seconds: f64,
    }

    impl Activity<TestState, ()> for Timer {}

    type Builder = StateBuilder<TestState, TestEvent, ()>;

    #[test]
    fn new_builder_is_bare() {
        let builder = Builder::new(TestState::Active);
        assert_eq!(builder.id(), &TestState::Active);
        assert!(builder.parent.is_none());
        assert!(builder.initial.is_none());
        assert!(builder.transitions.is_empty());
        assert_eq!(builder.activity.type_id, TypeId::of::<()>());
    }

    #[test]
    fn on_keeps_first_and_records_duplicates() {
        let builder = Builder::new(TestState::Stopped)
            .on(TestEvent::StartStop, TestState::Running)
            .on(TestEvent::StartStop, TestState::Active)
            .on(TestEvent::Reset, TestState::Active);

        assert_eq!(
            builder.transitions,
            vec![
                (TestEvent::StartStop, TestState::Running),
                (TestEvent::Reset, TestState::Active),
            ]
        );
        assert_eq!(builder.duplicate_events, vec![TestEvent::StartStop]);
    }

    #[test]
    fn provides_replaces_same_capability() {
        let builder = Builder::new(TestState::Running)
            .activity::<Timer>()
            .provides::<Elapsed, Timer, _>(|t, _| t.seconds)
            .provides::<Elapsed, Timer, _>(|t, _| t.seconds * 2.0);

        assert_eq!(builder.providers.len(), 1);
        assert_eq!(builder.providers[0].data_type, TypeId::of::<Timer>());
        assert_eq!(builder.activity.type_id, TypeId::of::<Timer>());
    }

    #[test]
    fn erased_provider_downcasts_data() {
        let builder = Builder::new(TestState::Running)
            .activity::<Timer>()
            .provides::<Elapsed, Timer, _>(|t, _| t.seconds + 1.0);

        let chain: Vec<Activation<TestState>> = Vec::new();
        let ancestors = Ancestors::new(&chain);
        let data: Box<Erased> = Box::new(Timer { seconds: 2.0 });
        let answer = (builder.providers[0].provide)(&*data, &ancestors).unwrap();
        assert_eq!(*answer.downcast::<f64>().unwrap(), 3.0);

        let wrong: Box<Erased> = Box::new(());
        assert!((builder.providers[0].provide)(&*wrong, &ancestors).is_none());
    }
}
