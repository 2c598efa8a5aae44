//! Per-activation data and the views hooks get of the active chain.

use crate::core::State;
use std::any::{type_name, Any, TypeId};

/// Runtime data owned by one activation of a state.
///
/// A fresh value is built with `Default` every time the state is entered
/// and dropped right after `on_exit` returns, so fields live exactly as
/// long as the state stays active. Hooks may read and write the
/// activities of enclosing states through the [`Scope`].
///
/// # Example
///
/// ```rust
/// use statechart::machine::{Activity, Scope};
/// use statechart::state_enum;
///
/// state_enum! {
///     enum Door {
///         Open,
///     }
/// }
///
/// #[derive(Default)]
/// struct Opened {
///     visits: u32,
/// }
///
/// impl Activity<Door, Vec<String>> for Opened {
///     fn on_enter(&mut self, scope: &mut Scope<'_, Door, Vec<String>>) {
///         self.visits += 1;
///         scope.context_mut().push("creak".to_string());
///     }
/// }
/// ```
pub trait Activity<S: State, C>: Any + Send {
    /// Runs after the activity is constructed, before any inner state is entered.
    fn on_enter(&mut self, _scope: &mut Scope<'_, S, C>) {}

    /// Runs after every inner state has exited, before the activity is dropped.
    fn on_exit(&mut self, _scope: &mut Scope<'_, S, C>) {}
}

/// States without an activity carry the unit value.
impl<S: State, C> Activity<S, C> for () {}

/// Type-erased activity value.
pub(crate) type Erased = dyn Any + Send;

/// Closure hook run on entry or exit.
pub(crate) type Hook<S, C> = Box<dyn Fn(&mut Scope<'_, S, C>) + Send + Sync>;

/// Type-erased constructor and hooks of an activity type.
pub(crate) struct ActivityVTable<S: State, C> {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) create: fn() -> Box<Erased>,
    pub(crate) enter: fn(&mut Erased, &mut Scope<'_, S, C>),
    pub(crate) exit: fn(&mut Erased, &mut Scope<'_, S, C>),
}

impl<S: State, C> ActivityVTable<S, C> {
    pub(crate) fn of<T>() -> Self
    where
        T: Activity<S, C> + Default,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            create: create_activity::<T>,
            enter: enter_activity::<S, C, T>,
            exit: exit_activity::<S, C, T>,
        }
    }
}

fn create_activity<T: Any + Send + Default>() -> Box<Erased> {
    Box::new(T::default())
}

fn enter_activity<S, C, T>(data: &mut Erased, scope: &mut Scope<'_, S, C>)
where
    S: State,
    T: Activity<S, C>,
{
    if let Some(activity) = data.downcast_mut::<T>() {
        activity.on_enter(scope);
    }
}

fn exit_activity<S, C, T>(data: &mut Erased, scope: &mut Scope<'_, S, C>)
where
    S: State,
    T: Activity<S, C>,
{
    if let Some(activity) = data.downcast_mut::<T>() {
        activity.on_exit(scope);
    }
}

/// One element of the active chain.
pub(crate) struct Activation<S> {
    pub(crate) state: S,
    pub(crate) data: Box<Erased>,
}

impl<S> Activation<S> {
    fn data<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.downcast_mut::<T>()
    }
}

/// Read-only view of the states enclosing an active state.
///
/// Lookups walk from the innermost enclosing state outward.
pub struct Ancestors<'a, S> {
    chain: &'a [Activation<S>],
}

impl<'a, S: State> Ancestors<'a, S> {
    pub(crate) fn new(chain: &'a [Activation<S>]) -> Self {
        Self { chain }
    }

    /// Innermost enclosing activity of type `T`.
    pub fn ancestor<T: Any>(&self) -> Option<&'a T> {
        self.chain.iter().rev().find_map(|a| a.data::<T>())
    }

    /// Activity of the enclosing state `state`, if it is of type `T`.
    pub fn ancestor_of<T: Any>(&self, state: &S) -> Option<&'a T> {
        self.chain
            .iter()
            .rev()
            .find(|a| &a.state == state)
            .and_then(|a| a.data::<T>())
    }

    /// Whether `state` encloses the current one.
    pub fn contains(&self, state: &S) -> bool {
        self.chain.iter().any(|a| &a.state == state)
    }

    /// Enclosing states, outermost first.
    pub fn states(&self) -> impl Iterator<Item = &'a S> {
        self.chain.iter().map(|a| &a.state)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

/// What an entry or exit hook can see and touch.
///
/// The scope exposes the machine's user context and the activities of the
/// enclosing states. Inner states are never visible: on entry they do not
/// exist yet, on exit they are already gone.
pub struct Scope<'a, S, C> {
    state: &'a S,
    context: &'a mut C,
    ancestors: &'a mut [Activation<S>],
}

impl<'a, S: State, C> Scope<'a, S, C> {
    pub(crate) fn new(
        state: &'a S,
        context: &'a mut C,
        ancestors: &'a mut [Activation<S>],
    ) -> Self {
        Self {
            state,
            context,
            ancestors,
        }
    }

    /// The state whose hook is running.
    pub fn state(&self) -> &S {
        self.state
    }

    pub fn context(&self) -> &C {
        &*self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut *self.context
    }

    /// Innermost enclosing activity of type `T`.
    pub fn ancestor<T: Any>(&self) -> Option<&T> {
        self.ancestors.iter().rev().find_map(|a| a.data::<T>())
    }

    /// Mutable access to the innermost enclosing activity of type `T`.
    pub fn ancestor_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.ancestors.iter_mut().rev().find_map(|a| a.data_mut::<T>())
    }

    /// Activity of the enclosing state `state`, if it is of type `T`.
    pub fn ancestor_of<T: Any>(&self, state: &S) -> Option<&T> {
        self.ancestors().ancestor_of::<T>(state)
    }

    /// Read-only view of the enclosing states.
    pub fn ancestors(&self) -> Ancestors<'_, S> {
        Ancestors::new(&*self.ancestors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Outer,
        Middle,
        Inner,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Outer => "Outer",
                Self::Middle => "Middle",
                Self::Inner => "Inner",
            }
        }
    }

    #[derive(Default, Debug, PartialEq)]
    struct Counter(u32);

    #[derive(Default)]
    struct Bump;

    impl Activity<TestState, Vec<String>> for Bump {
        fn on_enter(&mut self, scope: &mut Scope<'_, TestState, Vec<String>>) {
            if let Some(counter) = scope.ancestor_mut::<Counter>() {
                counter.0 += 1;
            }
            let name = scope.state().name().to_string();
            scope.context_mut().push(name);
        }
    }

    fn chain() -> Vec<Activation<TestState>> {
        vec![
            Activation {
                state: TestState::Outer,
                data: Box::new(Counter(1)),
            },
            Activation {
                state: TestState::Middle,
                data: Box::new(Counter(10)),
            },
        ]
    }

    #[test]
    fn ancestor_prefers_innermost() {
        let chain = chain();
        let ancestors = Ancestors::new(&chain);

        assert_eq!(ancestors.ancestor::<Counter>(), Some(&Counter(10)));
        assert_eq!(
            ancestors.ancestor_of::<Counter>(&TestState::Outer),
            Some(&Counter(1))
        );
        assert!(ancestors.ancestor::<String>().is_none());
        assert!(ancestors.contains(&TestState::Middle));
        assert!(!ancestors.contains(&TestState::Inner));
        assert_eq!(ancestors.len(), 2);
    }

    #[test]
    fn vtable_runs_activity_hooks() {
        let mut chain = chain();
        let mut log = Vec::new();
        let vtable = ActivityVTable::<TestState, Vec<String>>::of::<Bump>();
        let mut data = (vtable.create)();

        {
            let mut scope = Scope::new(&TestState::Inner, &mut log, &mut chain);
            (vtable.enter)(&mut *data, &mut scope);
        }

        assert_eq!(log, vec!["Inner".to_string()]);
        assert_eq!(chain[1].data::<Counter>(), Some(&Counter(11)));
        assert_eq!(chain[0].data::<Counter>(), Some(&Counter(1)));
        assert_eq!(vtable.type_id, TypeId::of::<Bump>());
    }

    #[test]
    fn unit_activity_is_inert() {
        let mut chain = chain();
        let mut log: Vec<String> = Vec::new();
        let vtable = ActivityVTable::<TestState, Vec<String>>::of::<()>();
        let mut data = (vtable.create)();

        let mut scope = Scope::new(&TestState::Inner, &mut log, &mut chain);
        (vtable.enter)(&mut *data, &mut scope);
        (vtable.exit)(&mut *data, &mut scope);

        assert!(scope.context().is_empty());
    }
}
