//! Named registry for sharing graph definitions across machines.
//!
//! The registry is an explicitly constructed value with its own lifecycle:
//! create one, share it where needed, drop it when done. Storage is
//! type-erased so a single registry can hold graphs over different state
//! and trigger types.

use super::error::ConfigError;
use super::StateGraph;
use crate::core::{State, Trigger};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Publishes finished [`StateGraph`]s under unique names.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use switchyard::graph::{GraphRegistry, StateGraph};
/// use switchyard::state_enum;
///
/// state_enum! {
///     enum Door { Closed, Open }
///     initial: [Closed]
/// }
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
/// enum Push { Toggle }
///
/// # fn main() -> Result<(), switchyard::graph::ConfigError> {
/// let graph = StateGraph::builder()
///     .transitions(Door::Closed, [(Push::Toggle, Door::Open)])
///     .initial_state(Door::Closed)?
///     .named("door")?
///     .build()?;
///
/// let registry = GraphRegistry::new();
/// registry.register(Arc::new(graph))?;
///
/// let shared: Arc<StateGraph<Door, Push>> = registry.require("door")?;
/// assert_eq!(shared.edge(&Door::Closed, &Push::Toggle), Some(&Door::Open));
/// # Ok(())
/// # }
/// ```
pub struct GraphRegistry {
    graphs: Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl GraphRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            graphs: Mutex::new(HashMap::new()),
        }
    }

    /// Publish a graph under its configured name.
    ///
    /// Fails with [`ConfigError::UnnamedGraph`] if the graph was never
    /// `named`, and with [`ConfigError::DefinitionExists`] if the name is
    /// taken; remove it or clear the registry first.
    pub fn register<S: State, T: Trigger>(
        &self,
        graph: Arc<StateGraph<S, T>>,
    ) -> Result<(), ConfigError> {
        let name = graph.name().ok_or(ConfigError::UnnamedGraph)?.to_string();
        let mut graphs = self.graphs.lock();
        if graphs.contains_key(&name) {
            return Err(ConfigError::DefinitionExists { name });
        }
        graphs.insert(name, graph);
        Ok(())
    }

    /// Look up a graph by name.
    ///
    /// Returns `None` for an unknown name, and likewise for a name that was
    /// registered under different state/trigger types.
    pub fn lookup<S: State, T: Trigger>(&self, name: &str) -> Option<Arc<StateGraph<S, T>>> {
        let erased = self.graphs.lock().get(name).cloned()?;
        erased.downcast::<StateGraph<S, T>>().ok()
    }

    /// Like [`lookup`](Self::lookup), but an absent or mismatched name is a
    /// [`ConfigError::UnknownDefinition`].
    pub fn require<S: State, T: Trigger>(
        &self,
        name: &str,
    ) -> Result<Arc<StateGraph<S, T>>, ConfigError> {
        self.lookup(name).ok_or_else(|| ConfigError::UnknownDefinition {
            name: name.to_string(),
        })
    }

    /// Remove one named graph. Unknown names are ignored.
    pub fn remove(&self, name: &str) {
        self.graphs.lock().remove(name);
    }

    /// Remove every registered graph.
    pub fn clear(&self) {
        self.graphs.lock().clear();
    }

    /// Number of registered graphs.
    pub fn len(&self) -> usize {
        self.graphs.lock().len()
    }

    /// True when no graph is registered.
    pub fn is_empty(&self) -> bool {
        self.graphs.lock().is_empty()
    }
}

impl Default for GraphRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_enum;

    state_enum! {
        enum TestState {
            Idle,
            Done,
        }
        initial: [Idle]
        final: [Done]
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
    enum TestTrigger {
        Finish,
    }

    fn named_graph(name: &str) -> Arc<StateGraph<TestState, TestTrigger>> {
        Arc::new(
            StateGraph::builder()
                .transitions(TestState::Idle, [(TestTrigger::Finish, TestState::Done)])
                .initial_state(TestState::Idle)
                .unwrap()
                .named(name)
                .unwrap()
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn register_and_lookup_round_trip() {
        let registry = GraphRegistry::new();
        registry.register(named_graph("workflow")).unwrap();

        let found: Arc<StateGraph<TestState, TestTrigger>> =
            registry.lookup("workflow").unwrap();
        assert_eq!(found.initial_state(), &TestState::Idle);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let registry = GraphRegistry::new();
        registry.register(named_graph("workflow")).unwrap();

        assert_eq!(
            registry.register(named_graph("workflow")).err(),
            Some(ConfigError::DefinitionExists {
                name: "workflow".to_string(),
            })
        );
    }

    #[test]
    fn unnamed_graph_is_rejected() {
        let graph = Arc::new(
            StateGraph::<TestState, TestTrigger>::builder()
                .initial_state(TestState::Idle)
                .unwrap()
                .build()
                .unwrap(),
        );

        let registry = GraphRegistry::new();
        assert_eq!(registry.register(graph).err(), Some(ConfigError::UnnamedGraph));
    }

    #[test]
    fn remove_frees_the_name() {
        let registry = GraphRegistry::new();
        registry.register(named_graph("workflow")).unwrap();
        registry.remove("workflow");

        assert!(registry
            .lookup::<TestState, TestTrigger>("workflow")
            .is_none());
        assert!(registry.register(named_graph("workflow")).is_ok());
    }

    #[test]
    fn clear_empties_the_registry() {
        let registry = GraphRegistry::new();
        registry.register(named_graph("one")).unwrap();
        registry.register(named_graph("two")).unwrap();
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn require_reports_unknown_names() {
        let registry = GraphRegistry::new();

        assert_eq!(
            registry.require::<TestState, TestTrigger>("ghost").err(),
            Some(ConfigError::UnknownDefinition {
                name: "ghost".to_string(),
            })
        );
    }

    #[test]
    fn type_mismatch_reads_as_unknown() {
        state_enum! {
            enum OtherState { Start }
            initial: [Start]
        }

        let registry = GraphRegistry::new();
        registry.register(named_graph("workflow")).unwrap();

        assert!(registry
            .lookup::<OtherState, TestTrigger>("workflow")
            .is_none());
    }
}
