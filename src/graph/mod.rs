//! Graph definition: the mutable builder, the frozen graph, and the
//! registry for sharing definitions by name.

pub mod builder;
pub mod error;
pub mod registry;

pub use builder::StateGraphBuilder;
pub use error::ConfigError;
pub use registry::GraphRegistry;

use crate::core::{State, Trigger};
use std::collections::HashMap;

/// Immutable `state → (trigger → state)` edge mapping, plus the designated
/// initial state, an optional start trigger, and an optional name.
///
/// A graph is produced by [`StateGraphBuilder::build`] and never changes
/// afterwards; it is typically wrapped in an `Arc` and shared read-only
/// across machine instances.
#[derive(Debug)]
pub struct StateGraph<S: State, T: Trigger> {
    name: Option<String>,
    initial: S,
    start_trigger: Option<T>,
    edges: HashMap<S, HashMap<T, S>>,
}

impl<S: State, T: Trigger> StateGraph<S, T> {
    pub(crate) fn new(
        name: Option<String>,
        initial: S,
        start_trigger: Option<T>,
        edges: HashMap<S, HashMap<T, S>>,
    ) -> Self {
        Self {
            name,
            initial,
            start_trigger,
            edges,
        }
    }

    /// Start a new graph definition.
    pub fn builder() -> StateGraphBuilder<S, T> {
        StateGraphBuilder::new()
    }

    /// Resolve the edge from `from` labeled `trigger`, if defined.
    pub fn edge(&self, from: &S, trigger: &T) -> Option<&S> {
        self.edges.get(from)?.get(trigger)
    }

    /// The triggers defined from a state.
    pub fn triggers_from<'a>(&'a self, state: &S) -> impl Iterator<Item = &'a T> {
        self.edges.get(state).into_iter().flat_map(|m| m.keys())
    }

    /// Whether the state has an edge definition in this graph.
    pub fn contains(&self, state: &S) -> bool {
        self.edges.contains_key(state)
    }

    /// The states with edge definitions.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.edges.keys()
    }

    /// The designated initial state.
    pub fn initial_state(&self) -> &S {
        &self.initial
    }

    /// The trigger fired automatically after the initial commit, if any.
    pub fn start_trigger(&self) -> Option<&T> {
        self.start_trigger.as_ref()
    }

    /// The graph's name, if one was configured.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_enum;

    state_enum! {
        enum TestState {
            Idle,
            Active,
            Done,
        }
        initial: [Idle]
        final: [Done]
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
    enum TestTrigger {
        Start,
        Finish,
    }

    fn graph() -> StateGraph<TestState, TestTrigger> {
        StateGraph::builder()
            .transitions(TestState::Idle, [(TestTrigger::Start, TestState::Active)])
            .transitions(TestState::Active, [(TestTrigger::Finish, TestState::Done)])
            .initial_state(TestState::Idle)
            .unwrap()
            .starts_with(TestTrigger::Start)
            .unwrap()
            .named("test")
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn edge_resolves_defined_transitions() {
        let graph = graph();

        assert_eq!(
            graph.edge(&TestState::Idle, &TestTrigger::Start),
            Some(&TestState::Active)
        );
        assert_eq!(graph.edge(&TestState::Idle, &TestTrigger::Finish), None);
        assert_eq!(graph.edge(&TestState::Done, &TestTrigger::Start), None);
    }

    #[test]
    fn metadata_is_exposed() {
        let graph = graph();

        assert_eq!(graph.initial_state(), &TestState::Idle);
        assert_eq!(graph.start_trigger(), Some(&TestTrigger::Start));
        assert_eq!(graph.name(), Some("test"));
    }

    #[test]
    fn triggers_from_lists_outgoing_triggers() {
        let graph = graph();

        let triggers: Vec<&TestTrigger> = graph.triggers_from(&TestState::Idle).collect();
        assert_eq!(triggers, vec![&TestTrigger::Start]);
        assert_eq!(graph.triggers_from(&TestState::Done).count(), 0);
    }
}
