//! The running machine.
//!
//! A [`Machine`] owns the active chain (one [`Activation`] per active
//! state, root first), the user context and the transition log. Every
//! operation runs to completion before returning.

use crate::core::{Capability, Event, State, TransitionLog, TransitionRecord};
use crate::machine::chart::Chart;
use crate::machine::error::MachineError;
use crate::machine::options::{MachineOptions, UnhandledPolicy};
use crate::machine::scope::{Activation, Ancestors, Scope};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::sync::Arc;
use uuid::Uuid;

/// Where a machine is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Uninitiated,
    Live,
    Terminated,
}

/// Outcome of a successfully processed event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch<S> {
    /// `source` reacted; the active leaf moved from `from` to `to`.
    Transitioned { source: S, from: S, to: S },
    /// No active state reacts to the event; nothing changed.
    Unhandled,
}

impl<S> Dispatch<S> {
    pub fn is_transitioned(&self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }
}

/// A hierarchical state machine running against a [`Chart`].
///
/// # Example
///
/// ```rust
/// use statechart::builder::ChartBuilder;
/// use statechart::machine::{Dispatch, Machine};
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
/// let mut machine = Machine::new(chart, ());
/// machine.initiate().unwrap();
/// assert_eq!(machine.leaf(), Some(&Watch::Stopped));
///
/// let dispatch = machine.process_event(&WatchEvent::StartStop).unwrap();
/// assert_eq!(
///     dispatch,
///     Dispatch::Transitioned {
///         source: Watch::Stopped,
///         from: Watch::Stopped,
///         to: Watch::Running,
///     }
/// );
/// assert!(machine.is_in(&Watch::Active));
/// ```
pub struct Machine<S: State, E: Event, C = ()> {
    id: Uuid,
    chart: Arc<Chart<S, E, C>>,
    context: C,
    options: MachineOptions,
    lifecycle: Lifecycle,
    chain: Vec<Activation<S>>,
    log: TransitionLog<S>,
}

impl<S: State, E: Event, C> Machine<S, E, C> {
    /// Bind a new machine to `chart` with default options.
    pub fn new(chart: Chart<S, E, C>, context: C) -> Self {
        Self::shared(Arc::new(chart), context, MachineOptions::default())
    }

    pub fn with_options(chart: Chart<S, E, C>, context: C, options: MachineOptions) -> Self {
        Self::shared(Arc::new(chart), context, options)
    }

    /// Bind a new machine to a chart other machines may also run against.
    pub fn shared(chart: Arc<Chart<S, E, C>>, context: C, options: MachineOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            chart,
            context,
            log: TransitionLog::with_capacity(options.log_capacity),
            options,
            lifecycle: Lifecycle::Uninitiated,
            chain: Vec::new(),
        }
    }

    /// Enter the root and its initial descent.
    ///
    /// A machine is initiated at most once.
    pub fn initiate(&mut self) -> Result<(), MachineError> {
        if self.lifecycle != Lifecycle::Uninitiated {
            return Err(MachineError::AlreadyInitiated);
        }

        let root = self.chart.root().clone();
        tracing::info!(
            machine = %self.id,
            chart = self.chart.name(),
            state = root.name(),
            "initiating machine"
        );

        let descent = self.chart.initial_descent(&root);
        self.enter(root);
        for state in descent {
            self.enter(state);
        }
        self.lifecycle = Lifecycle::Live;
        Ok(())
    }

    /// Deliver `event` to the innermost active state reacting to its kind.
    ///
    /// The states below the transition domain are exited innermost first,
    /// then the path down to the target and the target's initial descent
    /// are entered outermost first. The target path is resolved before any
    /// hook runs, so a transition either happens completely or not at all.
    pub fn process_event(&mut self, event: &E) -> Result<Dispatch<S>, MachineError> {
        if !self.is_live() {
            return Err(MachineError::NotInitiated);
        }

        let kind = event.kind();
        let reaction = self.chain.iter().enumerate().rev().find_map(|(index, a)| {
            self.chart
                .node(&a.state)
                .and_then(|node| node.transition_for(&kind))
                .map(|target| (index, target.clone()))
        });

        let Some((source_index, target)) = reaction else {
            return self.unhandled(event);
        };

        let source = self.chain[source_index].state.clone();
        let target_path =
            self.chart
                .path_to(&target)
                .ok_or_else(|| MachineError::UnknownTransitionTarget {
                    state: source.name().to_string(),
                    target: target.name().to_string(),
                })?;
        let descent = self.chart.initial_descent(&target);

        let shared = self.chain[..=source_index]
            .iter()
            .zip(&target_path)
            .take_while(|(active, state)| &active.state == *state)
            .count();
        let keep = shared
            .min(source_index)
            .min(target_path.len().saturating_sub(1));

        let from = self.chain[self.chain.len() - 1].state.clone();

        while self.chain.len() > keep {
            self.exit_innermost();
        }
        for state in target_path.into_iter().skip(keep).chain(descent) {
            self.enter(state);
        }

        let to = self.chain[self.chain.len() - 1].state.clone();
        tracing::debug!(
            machine = %self.id,
            chart = self.chart.name(),
            event = ?kind,
            from = from.name(),
            to = to.name(),
            "transition complete"
        );

        if self.options.record_transitions {
            self.log.record(TransitionRecord {
                event: format!("{kind:?}"),
                source: source.clone(),
                from: from.clone(),
                to: to.clone(),
                timestamp: Utc::now(),
            });
        }

        Ok(Dispatch::Transitioned { source, from, to })
    }

    fn unhandled(&self, event: &E) -> Result<Dispatch<S>, MachineError> {
        match self.options.unhandled {
            UnhandledPolicy::Ignore => {
                tracing::debug!(
                    machine = %self.id,
                    chart = self.chart.name(),
                    event = ?event,
                    "event unhandled"
                );
                Ok(Dispatch::Unhandled)
            }
            UnhandledPolicy::Reject => {
                tracing::warn!(
                    machine = %self.id,
                    chart = self.chart.name(),
                    event = ?event,
                    "event rejected"
                );
                Err(MachineError::UnhandledEvent {
                    event: format!("{:?}", event.kind()),
                })
            }
        }
    }

    /// Ask the active states for `Cap`, innermost first.
    pub fn query<Cap: Capability>(&self) -> Result<Cap::Output, MachineError> {
        if !self.is_live() {
            return Err(MachineError::NotInitiated);
        }

        let capability = TypeId::of::<Cap>();
        for (index, activation) in self.chain.iter().enumerate().rev() {
            let Some(provider) = self
                .chart
                .node(&activation.state)
                .and_then(|node| node.provider(capability))
            else {
                continue;
            };

            let ancestors = Ancestors::new(&self.chain[..index]);
            let answer = (provider.provide)(&*activation.data, &ancestors)
                .and_then(|answer| answer.downcast::<Cap::Output>().ok());
            if let Some(value) = answer {
                tracing::trace!(
                    machine = %self.id,
                    capability = Cap::name(),
                    state = activation.state.name(),
                    "capability resolved"
                );
                return Ok(*value);
            }
        }

        Err(MachineError::CapabilityNotFound {
            capability: Cap::name().to_string(),
        })
    }

    /// Exit every active state, innermost first.
    ///
    /// A terminated machine cannot be initiated again.
    pub fn terminate(&mut self) -> Result<(), MachineError> {
        if !self.is_live() {
            return Err(MachineError::NotInitiated);
        }

        tracing::info!(machine = %self.id, chart = self.chart.name(), "terminating machine");
        while self.exit_innermost().is_some() {}
        self.lifecycle = Lifecycle::Terminated;
        Ok(())
    }

    fn enter(&mut self, state: S) {
        let Some(node) = self.chart.node(&state) else {
            return;
        };
        tracing::debug!(
            machine = %self.id,
            chart = self.chart.name(),
            state = state.name(),
            "entering state"
        );

        let mut data = (node.activity.create)();
        {
            let mut scope = Scope::new(&state, &mut self.context, &mut self.chain);
            (node.activity.enter)(&mut *data, &mut scope);
            if let Some(hook) = &node.on_enter {
                hook(&mut scope);
            }
        }
        self.chain.push(Activation { state, data });
    }

    fn exit_innermost(&mut self) -> Option<S> {
        let Activation { state, mut data } = self.chain.pop()?;
        if let Some(node) = self.chart.node(&state) {
            tracing::debug!(
                machine = %self.id,
                chart = self.chart.name(),
                state = state.name(),
                "exiting state"
            );
            let mut scope = Scope::new(&state, &mut self.context, &mut self.chain);
            if let Some(hook) = &node.on_exit {
                hook(&mut scope);
            }
            (node.activity.exit)(&mut *data, &mut scope);
        }
        Some(state)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn chart(&self) -> &Chart<S, E, C> {
        &self.chart
    }

    pub fn options(&self) -> &MachineOptions {
        &self.options
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_live(&self) -> bool {
        self.lifecycle == Lifecycle::Live
    }

    /// Active states, root first.
    pub fn active_states(&self) -> impl Iterator<Item = &S> {
        self.chain.iter().map(|a| &a.state)
    }

    /// The innermost active state.
    pub fn leaf(&self) -> Option<&S> {
        self.chain.last().map(|a| &a.state)
    }

    pub fn is_in(&self, state: &S) -> bool {
        self.chain.iter().any(|a| &a.state == state)
    }

    /// Innermost active activity of type `T`.
    pub fn activity<T: Any>(&self) -> Option<&T> {
        self.chain
            .iter()
            .rev()
            .find_map(|a| a.data.downcast_ref::<T>())
    }

    /// Activity of the active state `state`, if it is of type `T`.
    pub fn activity_of<T: Any>(&self, state: &S) -> Option<&T> {
        self.chain
            .iter()
            .find(|a| &a.state == state)
            .and_then(|a| a.data.downcast_ref::<T>())
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Completed transitions, oldest first.
    pub fn transition_log(&self) -> &TransitionLog<S> {
        &self.log
    }
}

impl<S: State, E: Event, C> Drop for Machine<S, E, C> {
    fn drop(&mut self) {
        if self.is_live() {
            let _ = self.terminate();
        }
    }
}

impl<S: State, E: Event, C> std::fmt::Debug for Machine<S, E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("id", &self.id)
            .field("chart", &self.chart.name())
            .field("lifecycle", &self.lifecycle)
            .field("active", &self.active_states().collect::<Vec<_>>())
            .finish()
    }
}
