//! Validated chart definitions.
//!
//! A [`Chart`] is the immutable registry a machine runs against. Charts are
//! produced by [`ChartBuilder`](crate::builder::ChartBuilder), which checks
//! the hierarchy before handing one out, so lookups here can rely on the
//! tree being well formed.

use crate::builder::ChartBuilder;
use crate::core::{Event, State};
use crate::machine::scope::{ActivityVTable, Ancestors, Erased, Hook};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::Write;

/// Type-erased capability provider.
pub(crate) type ProvideFn<S> =
    Box<dyn Fn(&Erased, &Ancestors<'_, S>) -> Option<Box<dyn Any>> + Send + Sync>;

pub(crate) struct Provider<S> {
    pub(crate) capability: TypeId,
    pub(crate) capability_name: &'static str,
    pub(crate) data_type: TypeId,
    pub(crate) data_type_name: &'static str,
    pub(crate) provide: ProvideFn<S>,
}

/// One registered state.
pub struct StateNode<S: State, E: Event, C> {
    pub(crate) id: S,
    pub(crate) parent: Option<S>,
    pub(crate) initial: Option<S>,
    pub(crate) children: Vec<S>,
    pub(crate) transitions: Vec<(E::Kind, S)>,
    pub(crate) activity: ActivityVTable<S, C>,
    pub(crate) on_enter: Option<Hook<S, C>>,
    pub(crate) on_exit: Option<Hook<S, C>>,
    pub(crate) providers: Vec<Provider<S>>,
}

impl<S: State, E: Event, C> StateNode<S, E, C> {
    pub fn id(&self) -> &S {
        &self.id
    }

    pub fn parent(&self) -> Option<&S> {
        self.parent.as_ref()
    }

    /// Inner state entered by default when this state becomes active.
    pub fn initial(&self) -> Option<&S> {
        self.initial.as_ref()
    }

    /// Direct inner states, in registration order.
    pub fn children(&self) -> &[S] {
        &self.children
    }

    pub fn is_composite(&self) -> bool {
        !self.children.is_empty()
    }

    /// Target of the transition this state declares for `kind`, if any.
    pub fn transition_for(&self, kind: &E::Kind) -> Option<&S> {
        self.transitions
            .iter()
            .find(|(declared, _)| declared == kind)
            .map(|(_, target)| target)
    }

    /// Declared transitions, in declaration order.
    pub fn transitions(&self) -> impl Iterator<Item = (&E::Kind, &S)> {
        self.transitions.iter().map(|(kind, target)| (kind, target))
    }

    /// Whether this state answers the capability identified by `capability`.
    pub fn provides(&self, capability: TypeId) -> bool {
        self.provider(capability).is_some()
    }

    pub(crate) fn provider(&self, capability: TypeId) -> Option<&Provider<S>> {
        self.providers.iter().find(|p| p.capability == capability)
    }

    /// Name of the activity type constructed on entry.
    pub fn activity_type(&self) -> &'static str {
        self.activity.type_name
    }
}

/// Immutable, validated hierarchy of states.
///
/// # Example
///
/// ```rust
/// use statechart::builder::ChartBuilder;
/// use statechart::{event_enum, state_enum};
///
/// state_enum! {
///     enum Watch {
///         Active,
///         Stopped,
///         Running,
///     }
/// }
///
/// event_enum! {
///     enum WatchEvent {
///         StartStop,
///         Reset,
///     }
/// }
///
/// let chart = ChartBuilder::<Watch, WatchEvent>::new("stopwatch", Watch::Active)
///     .state(Watch::Active, |s| s.initial(Watch::Stopped).on(WatchEvent::Reset, Watch::Active))
///     .state(Watch::Stopped, |s| s.parent(Watch::Active).on(WatchEvent::StartStop, Watch::Running))
///     .state(Watch::Running, |s| s.parent(Watch::Active).on(WatchEvent::StartStop, Watch::Stopped))
///     .build()
///     .unwrap();
///
/// assert_eq!(chart.path_to(&Watch::Running), Some(vec![Watch::Active, Watch::Running]));
/// assert_eq!(chart.initial_descent(&Watch::Active), vec![Watch::Stopped]);
/// ```
pub struct Chart<S: State, E: Event, C = ()> {
    name: String,
    root: S,
    nodes: Vec<StateNode<S, E, C>>,
    index: HashMap<S, usize>,
}

impl<S: State, E: Event, C> Chart<S, E, C> {
    /// Start registering a chart rooted at `root`.
    pub fn builder(name: impl Into<String>, root: S) -> ChartBuilder<S, E, C> {
        ChartBuilder::new(name, root)
    }

    pub(crate) fn from_nodes(name: String, root: S, nodes: Vec<StateNode<S, E, C>>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();
        Self {
            name,
            root,
            nodes,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &S {
        &self.root
    }

    pub fn node(&self, state: &S) -> Option<&StateNode<S, E, C>> {
        self.index.get(state).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, state: &S) -> bool {
        self.index.contains_key(state)
    }

    /// Registered states, in registration order.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.nodes.iter().map(|n| &n.id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Path from the root down to `state`, both included.
    ///
    /// Returns `None` if `state` is not registered.
    pub fn path_to(&self, state: &S) -> Option<Vec<S>> {
        let mut path = Vec::new();
        let mut next = Some(state);
        while let Some(current) = next {
            let node = self.node(current)?;
            path.push(node.id.clone());
            next = node.parent.as_ref();
        }
        path.reverse();
        Some(path)
    }

    /// Chain of initial states entered below `state`, outermost first.
    ///
    /// Empty for leaves.
    pub fn initial_descent(&self, state: &S) -> Vec<S> {
        let mut descent = Vec::new();
        let mut next = self.node(state).and_then(|n| n.initial.as_ref());
        while let Some(child) = next {
            descent.push(child.clone());
            next = self.node(child).and_then(|n| n.initial.as_ref());
        }
        descent
    }

    /// Nesting depth of `state`; the root has depth 0.
    pub fn depth_of(&self, state: &S) -> Option<usize> {
        self.path_to(state).map(|path| path.len() - 1)
    }

    /// Render the hierarchy as an indented outline.
    ///
    /// # Example output:
    ///
    /// ```text
    /// stopwatch {
    ///   Active* { Reset => Active
    ///     Stopped* StartStop => Running
    ///     Running StartStop => Stopped
    ///   }
    /// }
    /// ```
    ///
    /// Initial states are marked with `*`.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {{", self.name);
        self.outline_node(&mut out, &self.root, true, 1);
        out.push_str("}\n");
        out
    }

    fn outline_node(&self, out: &mut String, state: &S, initial: bool, indent: usize) {
        let Some(node) = self.node(state) else {
            return;
        };
        let pad = "  ".repeat(indent);
        let _ = write!(out, "{pad}{}", state.name());
        if initial {
            out.push('*');
        }
        if node.is_composite() {
            out.push_str(" {");
        }
        let transitions: Vec<String> = node
            .transitions()
            .map(|(kind, target)| format!("{kind:?} => {}", target.name()))
            .collect();
        if !transitions.is_empty() {
            let _ = write!(out, " {}", transitions.join(", "));
        }
        out.push('\n');

        if node.is_composite() {
            for child in &node.children {
                let is_initial = node.initial.as_ref() == Some(child);
                self.outline_node(out, child, is_initial, indent + 1);
            }
            let _ = writeln!(out, "{pad}}}");
        }
    }
}

impl<S: State, E: Event, C> std::fmt::Debug for Chart<S, E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chart")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("states", &self.states().collect::<Vec<_>>())
            .finish()
    }
}
