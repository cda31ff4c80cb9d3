//! Mutable builder for state graphs.
//!
//! Graph definition is two-phase: edges and metadata accumulate in a
//! `StateGraphBuilder`, then `build()` snapshots them into an immutable
//! [`StateGraph`]. Edge definitions are insert-if-absent throughout:
//! duplicates are ignored, never merged.

use super::error::ConfigError;
use super::StateGraph;
use crate::core::{State, StateType, Trigger};
use std::collections::HashMap;

/// Builder for [`StateGraph`] with a fluent API.
///
/// Fallible setters return `Result<Self, ConfigError>`, so a definition
/// chains with `?`:
///
/// ```rust
/// use switchyard::graph::StateGraphBuilder;
/// use switchyard::state_enum;
///
/// state_enum! {
///     enum Door { Closed, Open }
///     initial: [Closed]
/// }
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
/// enum Push { Open, Close }
///
/// # fn main() -> Result<(), switchyard::graph::ConfigError> {
/// let graph = StateGraphBuilder::new()
///     .transitions(Door::Closed, [(Push::Open, Door::Open)])
///     .transitions(Door::Open, [(Push::Close, Door::Closed)])
///     .initial_state(Door::Closed)?
///     .build()?;
///
/// assert_eq!(graph.edge(&Door::Closed, &Push::Open), Some(&Door::Open));
/// # Ok(())
/// # }
/// ```
pub struct StateGraphBuilder<S: State, T: Trigger> {
    edges: HashMap<S, HashMap<T, S>>,
    initial: Option<S>,
    start_trigger: Option<T>,
    name: Option<String>,
}

impl<S: State, T: Trigger> StateGraphBuilder<S, T> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            edges: HashMap::new(),
            initial: None,
            start_trigger: None,
            name: None,
        }
    }

    /// Define a state's outgoing edges.
    ///
    /// If the state already has edges defined, the new definition is
    /// ignored. Within one definition the first edge per trigger wins.
    pub fn transitions(mut self, state: S, edges: impl IntoIterator<Item = (T, S)>) -> Self {
        if !self.edges.contains_key(&state) {
            self.edges.insert(state, collect_edges(edges));
        }
        self
    }

    /// Define the same outgoing edges for each of a group of states,
    /// insert-if-absent per state.
    pub fn shared_transitions(
        mut self,
        states: impl IntoIterator<Item = S>,
        edges: impl IntoIterator<Item = (T, S)>,
    ) -> Self {
        let shared = collect_edges(edges);
        for state in states {
            self.edges.entry(state).or_insert_with(|| shared.clone());
        }
        self
    }

    /// Copy `source`'s full edge map verbatim onto `alias`.
    ///
    /// No-op when `source` has no edges defined, or when `alias` already
    /// has its own.
    pub fn copy_transitions(mut self, alias: S, source: &S) -> Self {
        if let Some(map) = self.edges.get(source).cloned() {
            self.edges.entry(alias).or_insert(map);
        }
        self
    }

    /// Copy `source`'s edge map onto `alias`, dropping any edge whose
    /// destination is `alias` itself. Copying a state that transitions to
    /// the alias would otherwise manufacture a self-loop.
    pub fn copy_similar_transitions(mut self, alias: S, source: &S) -> Self {
        if let Some(map) = self.edges.get(source) {
            let filtered: HashMap<T, S> = map
                .iter()
                .filter(|(_, dest)| **dest != alias)
                .map(|(t, s)| (t.clone(), s.clone()))
                .collect();
            self.edges.entry(alias).or_insert(filtered);
        }
        self
    }

    /// Designate the graph's initial state. Settable once; the state must
    /// report [`StateType::Initial`].
    pub fn initial_state(mut self, state: S) -> Result<Self, ConfigError> {
        if let Some(current) = &self.initial {
            return Err(ConfigError::InitialStateAlreadySet {
                current: current.name().to_string(),
                attempted: state.name().to_string(),
            });
        }
        if state.state_type() != StateType::Initial {
            return Err(ConfigError::NotAnInitialState {
                state: state.name().to_string(),
                actual: state.state_type(),
            });
        }
        self.initial = Some(state);
        Ok(self)
    }

    /// Configure a trigger to fire automatically right after `initiate`
    /// commits the initial state. Settable once.
    pub fn starts_with(mut self, trigger: T) -> Result<Self, ConfigError> {
        if self.start_trigger.is_some() {
            return Err(ConfigError::StartTriggerAlreadySet);
        }
        self.start_trigger = Some(trigger);
        Ok(self)
    }

    /// Name the graph, for logging and for registry publication. Settable
    /// once.
    pub fn named(mut self, name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if let Some(current) = &self.name {
            return Err(ConfigError::NameAlreadySet {
                current: current.clone(),
                attempted: name,
            });
        }
        self.name = Some(name);
        Ok(self)
    }

    /// Freeze the definition into an immutable [`StateGraph`].
    pub fn build(self) -> Result<StateGraph<S, T>, ConfigError> {
        let initial = self.initial.ok_or(ConfigError::MissingInitialState)?;
        Ok(StateGraph::new(
            self.name,
            initial,
            self.start_trigger,
            self.edges,
        ))
    }
}

impl<S: State, T: Trigger> Default for StateGraphBuilder<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_edges<S: State, T: Trigger>(
    edges: impl IntoIterator<Item = (T, S)>,
) -> HashMap<T, S> {
    let mut map = HashMap::new();
    for (trigger, dest) in edges {
        map.entry(trigger).or_insert(dest);
    }
    map
}
