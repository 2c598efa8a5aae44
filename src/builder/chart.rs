//! Builder for constructing charts.

use crate::builder::error::BuildError;
use crate::builder::state::StateBuilder;
use crate::core::{Event, State};
use crate::machine::Chart;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<BuildError>>;

/// Builder for registering a chart's states with a fluent API.
///
/// All structural problems are collected by [`validate`](Self::validate);
/// [`build`](Self::build) refuses to produce a chart while any remain.
pub struct ChartBuilder<S: State, E: Event, C = ()> {
    name: String,
    root: S,
    states: Vec<StateBuilder<S, E, C>>,
}

impl<S: State, E: Event, C> ChartBuilder<S, E, C> {
    /// Create a builder for a chart rooted at `root`.
    pub fn new(name: impl Into<String>, root: S) -> Self {
        Self {
            name: name.into(),
            root,
            states: Vec::new(),
        }
    }

    /// Register the state `id`, configured by `configure`.
    pub fn state<F>(mut self, id: S, configure: F) -> Self
    where
        F: FnOnce(StateBuilder<S, E, C>) -> StateBuilder<S, E, C>,
    {
        self.states.push(configure(StateBuilder::new(id)));
        self
    }

    /// Register a pre-built state.
    pub fn add_state(mut self, state: StateBuilder<S, E, C>) -> Self {
        self.states.push(state);
        self
    }

    /// Check the registered hierarchy, accumulating every problem found.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<BuildError>> {
        let mut checks: Vec<Check> = Vec::new();
        let mut registered: HashMap<&S, &StateBuilder<S, E, C>> = HashMap::new();
        let mut unique = Vec::new();

        for state in &self.states {
            match registered.entry(&state.id) {
                Entry::Occupied(_) => checks.push(Validation::fail(BuildError::DuplicateState {
                    state: state.id.name().to_string(),
                })),
                Entry::Vacant(slot) => {
                    slot.insert(state);
                    unique.push(state);
                }
            }
        }

        if !registered.contains_key(&self.root) {
            checks.push(Validation::fail(BuildError::MissingRoot {
                state: self.root.name().to_string(),
            }));
        }

        let mut children: HashMap<&S, usize> = HashMap::new();
        for &state in &unique {
            if let Some(parent) = &state.parent {
                *children.entry(parent).or_default() += 1;
            }
        }

        for &state in &unique {
            checks.push(self.check_parent(state, &registered));
            checks.push(check_cycle(state, &registered));
            checks.push(check_initial(state, &registered));
            if children.contains_key(&state.id) && state.initial.is_none() {
                checks.push(malformed(&state.id, "composite state has no initial state"));
            }
            checks.extend(check_transitions(state, &registered));
            checks.extend(check_providers(state));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Every problem [`validate`](Self::validate) reports, in discovery order.
    pub fn problems(&self) -> Vec<BuildError> {
        match self.validate() {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        }
    }

    /// Build the chart.
    /// Returns the first problem found if the hierarchy is not well formed.
    pub fn build(self) -> Result<Chart<S, E, C>, BuildError> {
        if let Some(problem) = self.problems().into_iter().next() {
            return Err(problem);
        }

        let ChartBuilder { name, root, states } = self;

        let mut children: HashMap<S, Vec<S>> = HashMap::new();
        for state in &states {
            if let Some(parent) = &state.parent {
                children
                    .entry(parent.clone())
                    .or_default()
                    .push(state.id.clone());
            }
        }

        let nodes: Vec<_> = states
            .into_iter()
            .map(|state| {
                let inner = children.remove(&state.id).unwrap_or_default();
                state.into_node(inner)
            })
            .collect();

        tracing::debug!(chart = %name, root = root.name(), states = nodes.len(), "chart built");
        Ok(Chart::from_nodes(name, root, nodes))
    }

    fn check_parent(
        &self,
        state: &StateBuilder<S, E, C>,
        registered: &HashMap<&S, &StateBuilder<S, E, C>>,
    ) -> Check {
        match &state.parent {
            Some(_) if state.id == self.root => {
                malformed(&state.id, "root state cannot have a parent")
            }
            None if state.id != self.root => {
                malformed(&state.id, "state has no parent and is not the root")
            }
            Some(parent) if !registered.contains_key(parent) => malformed(
                &state.id,
                &format!("parent '{}' is not registered", parent.name()),
            ),
            _ => Validation::success(()),
        }
    }
}

fn malformed<S: State>(state: &S, reason: &str) -> Check {
    Validation::fail(BuildError::MalformedHierarchy {
        state: state.name().to_string(),
        reason: reason.to_string(),
    })
}

fn check_cycle<S: State, E: Event, C>(
    state: &StateBuilder<S, E, C>,
    registered: &HashMap<&S, &StateBuilder<S, E, C>>,
) -> Check {
    let mut next = state.parent.as_ref();
    let mut steps = 0;
    while let Some(current) = next {
        if current == &state.id {
            return malformed(&state.id, "state is its own ancestor");
        }
        // a loop above this state is reported by the states on it
        if steps > registered.len() {
            break;
        }
        steps += 1;
        next = registered.get(current).and_then(|s| s.parent.as_ref());
    }
    Validation::success(())
}

fn check_initial<S: State, E: Event, C>(
    state: &StateBuilder<S, E, C>,
    registered: &HashMap<&S, &StateBuilder<S, E, C>>,
) -> Check {
    let Some(initial) = &state.initial else {
        return Validation::success(());
    };
    match registered.get(initial) {
        None => malformed(
            &state.id,
            &format!("initial state '{}' is not registered", initial.name()),
        ),
        Some(child) if child.parent.as_ref() != Some(&state.id) => malformed(
            &state.id,
            &format!("initial state '{}' is not a direct child", initial.name()),
        ),
        Some(_) => Validation::success(()),
    }
}

fn check_transitions<S: State, E: Event, C>(
    state: &StateBuilder<S, E, C>,
    registered: &HashMap<&S, &StateBuilder<S, E, C>>,
) -> Vec<Check> {
    let unknown = state
        .transitions
        .iter()
        .filter(|(_, target)| !registered.contains_key(target))
        .map(|(kind, target)| {
            Validation::fail(BuildError::UnknownTransitionTarget {
                state: state.id.name().to_string(),
                event: format!("{kind:?}"),
                target: target.name().to_string(),
            })
        });
    let duplicates = state.duplicate_events.iter().map(|kind| {
        Validation::fail(BuildError::DuplicateTransition {
            state: state.id.name().to_string(),
            event: format!("{kind:?}"),
        })
    });
    unknown.chain(duplicates).collect()
}

fn check_providers<S: State, E: Event, C>(state: &StateBuilder<S, E, C>) -> Vec<Check> {
    state
        .providers
        .iter()
        .filter(|p| p.data_type != state.activity.type_id)
        .map(|p| {
            Validation::fail(BuildError::CapabilityTypeMismatch {
                state: state.id.name().to_string(),
                capability: p.capability_name.to_string(),
                provider: p.data_type_name.to_string(),
                activity: state.activity.type_name.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Capability;
    use crate::machine::Activity;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Active,
        Stopped,
        Running,
        Elsewhere,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Active => "Active",
                Self::Stopped => "Stopped",
                Self::Running => "Running",
                Self::Elsewhere => "Elsewhere",
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
    struct Timer;

    impl Activity<TestState, ()> for Timer {}

    type Builder = ChartBuilder<TestState, TestEvent>;

    fn stopwatch() -> Builder {
        Builder::new("stopwatch", TestState::Active)
            .state(TestState::Active, |s| {
                s.initial(TestState::Stopped)
                    .on(TestEvent::Reset, TestState::Active)
            })
            .state(TestState::Stopped, |s| {
                s.parent(TestState::Active)
                    .on(TestEvent::StartStop, TestState::Running)
            })
            .state(TestState::Running, |s| {
                s.parent(TestState::Active)
                    .on(TestEvent::StartStop, TestState::Stopped)
            })
    }

    #[test]
    fn valid_chart_builds() {
        let chart = stopwatch().build().unwrap();

        assert_eq!(chart.name(), "stopwatch");
        assert_eq!(chart.root(), &TestState::Active);
        assert_eq!(
            chart.node(&TestState::Active).unwrap().children(),
            &[TestState::Stopped, TestState::Running]
        );
    }

    #[test]
    fn valid_chart_has_no_problems() {
        assert!(stopwatch().problems().is_empty());
        assert!(matches!(stopwatch().validate(), Validation::Success(_)));
    }

    #[test]
    fn missing_root_is_reported() {
        let result = Builder::new("empty", TestState::Active).build();

        assert_eq!(
            result.unwrap_err(),
            BuildError::MissingRoot {
                state: "Active".to_string()
            }
        );
    }

    #[test]
    fn duplicate_state_is_reported() {
        let result = stopwatch()
            .state(TestState::Running, |s| s.parent(TestState::Stopped))
            .build();

        assert_eq!(
            result.unwrap_err(),
            BuildError::DuplicateState {
                state: "Running".to_string()
            }
        );
    }

    #[test]
    fn unknown_transition_target_is_reported() {
        let result = Builder::new("broken", TestState::Active)
            .state(TestState::Active, |s| {
                s.on(TestEvent::Reset, TestState::Elsewhere)
            })
            .build();

        assert_eq!(
            result.unwrap_err(),
            BuildError::UnknownTransitionTarget {
                state: "Active".to_string(),
                event: "Reset".to_string(),
                target: "Elsewhere".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_transition_is_reported() {
        let result = Builder::new("broken", TestState::Active)
            .state(TestState::Active, |s| {
                s.on(TestEvent::Reset, TestState::Active)
                    .on(TestEvent::Reset, TestState::Active)
            })
            .build();

        assert!(matches!(
            result,
            Err(BuildError::DuplicateTransition { .. })
        ));
    }

    #[test]
    fn root_with_parent_is_malformed() {
        let result = Builder::new("broken", TestState::Active)
            .state(TestState::Active, |s| s.parent(TestState::Active))
            .build();

        assert!(matches!(
            result,
            Err(BuildError::MalformedHierarchy { .. })
        ));
    }

    #[test]
    fn detached_state_is_malformed() {
        let problems = Builder::new("broken", TestState::Active)
            .state(TestState::Active, |s| s)
            .state(TestState::Elsewhere, |s| s)
            .problems();

        assert_eq!(
            problems,
            vec![BuildError::MalformedHierarchy {
                state: "Elsewhere".to_string(),
                reason: "state has no parent and is not the root".to_string(),
            }]
        );
    }

    #[test]
    fn unknown_parent_is_malformed() {
        let problems = Builder::new("broken", TestState::Active)
            .state(TestState::Active, |s| s)
            .state(TestState::Stopped, |s| s.parent(TestState::Elsewhere))
            .problems();

        assert_eq!(
            problems,
            vec![BuildError::MalformedHierarchy {
                state: "Stopped".to_string(),
                reason: "parent 'Elsewhere' is not registered".to_string(),
            }]
        );
    }

    #[test]
    fn cycle_is_malformed() {
        let problems = Builder::new("broken", TestState::Active)
            .state(TestState::Active, |s| s)
            .state(TestState::Stopped, |s| {
                s.parent(TestState::Running).initial(TestState::Running)
            })
            .state(TestState::Running, |s| {
                s.parent(TestState::Stopped).initial(TestState::Stopped)
            })
            .problems();

        let cycles = problems
            .iter()
            .filter(|p| {
                matches!(p, BuildError::MalformedHierarchy { reason, .. } if reason == "state is its own ancestor")
            })
            .count();
        assert_eq!(cycles, 2);
    }

    #[test]
    fn composite_without_initial_is_malformed() {
        let problems = Builder::new("broken", TestState::Active)
            .state(TestState::Active, |s| s)
            .state(TestState::Stopped, |s| s.parent(TestState::Active))
            .problems();

        assert_eq!(
            problems,
            vec![BuildError::MalformedHierarchy {
                state: "Active".to_string(),
                reason: "composite state has no initial state".to_string(),
            }]
        );
    }

    #[test]
    fn initial_must_be_direct_child() {
        let problems = Builder::new("broken", TestState::Active)
            .state(TestState::Active, |s| s.initial(TestState::Running))
            .state(TestState::Stopped, |s| {
                s.parent(TestState::Active).initial(TestState::Running)
            })
            .state(TestState::Running, |s| s.parent(TestState::Stopped))
            .problems();

        assert_eq!(
            problems,
            vec![BuildError::MalformedHierarchy {
                state: "Active".to_string(),
                reason: "initial state 'Running' is not a direct child".to_string(),
            }]
        );
    }

    #[test]
    fn capability_type_mismatch_is_reported() {
        let result = stopwatch()
            .state(TestState::Elsewhere, |s| {
                s.parent(TestState::Active)
                    .activity::<Timer>()
                    .provides::<Elapsed, (), _>(|_, _| 0.0)
            })
            .build();

        assert!(matches!(
            result,
            Err(BuildError::CapabilityTypeMismatch { .. })
        ));
    }

    #[test]
    fn validate_accumulates_all_problems() {
        let problems = Builder::new("broken", TestState::Active)
            .state(TestState::Active, |s| {
                s.initial(TestState::Elsewhere)
                    .on(TestEvent::Reset, TestState::Elsewhere)
                    .on(TestEvent::Reset, TestState::Active)
            })
            .state(TestState::Stopped, |s| s)
            .problems();

        assert_eq!(problems.len(), 4);
        assert!(problems
            .iter()
            .any(|p| matches!(p, BuildError::UnknownTransitionTarget { .. })));
        assert!(problems
            .iter()
            .any(|p| matches!(p, BuildError::DuplicateTransition { .. })));
        assert!(problems
            .iter()
            .any(|p| matches!(p, BuildError::MalformedHierarchy { state, .. } if state == "Stopped")));
        assert!(problems
            .iter()
            .any(|p| matches!(p, BuildError::MalformedHierarchy { state, .. } if state == "Active")));
    }
}
