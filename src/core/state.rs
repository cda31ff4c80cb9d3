//! Core state and trigger traits.
//!
//! States are caller-defined enumerations. Beyond identity, a state carries
//! a [`StateType`] (initial / normal / final) and an optional ordered set of
//! sub-states it is composed of, used for hierarchical equivalence queries.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Classification of a state within a graph.
///
/// Exactly one state in a graph is designated initial, and it must report
/// `StateType::Initial`. Committing a `Final` state terminates the machine's
/// reactive bindings.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum StateType {
    /// The state a machine starts in.
    Initial,
    /// An ordinary intermediate state.
    Normal,
    /// A terminal state; committing one releases reactive subscriptions.
    Final,
}

/// Trait for state machine states.
///
/// # Required Traits
///
/// - `Clone` + `Eq` + `Hash`: states key the edge maps and hook tables
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states appear in journal entries
///
/// # Example
///
/// ```rust
/// use switchyard::core::{State, StateType};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum DoorState {
///     Closed,
///     Open,
///     Broken,
/// }
///
/// impl State for DoorState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Closed => "Closed",
///             Self::Open => "Open",
///             Self::Broken => "Broken",
///         }
///     }
///
///     fn state_type(&self) -> StateType {
///         match self {
///             Self::Closed => StateType::Initial,
///             Self::Broken => StateType::Final,
///             _ => StateType::Normal,
///         }
///     }
/// }
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Classify this state within its graph.
    ///
    /// Default implementation returns [`StateType::Normal`].
    fn state_type(&self) -> StateType {
        StateType::Normal
    }

    /// The ordered set of sub-states this state is an alias for.
    ///
    /// Composition feeds equivalence queries only ([`equivalents`],
    /// [`StateMachine::is_in`](crate::machine::StateMachine::is_in)); it
    /// never participates in transition resolution.
    ///
    /// Default implementation returns no sub-states.
    fn composed_of(&self) -> Vec<Self> {
        Vec::new()
    }
}

/// Marker trait for transition triggers.
///
/// Triggers are opaque comparable tokens. Any type satisfying the bounds
/// is a trigger; there is nothing to implement.
pub trait Trigger:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
}

impl<T> Trigger for T where
    T: Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
}

/// Expand a state into its full equivalence set: itself plus, recursively,
/// every state it is composed of, depth-first in declaration order.
///
/// The expansion tracks visited states, so a cyclic `composed_of`
/// relationship terminates instead of recursing forever; a state is never
/// expanded twice.
///
/// # Example
///
/// ```rust
/// use switchyard::core::equivalents;
/// use switchyard::state_enum;
///
/// state_enum! {
///     enum Player {
///         Idle,
///         Playing,
///         Stopped,
///     }
///     composite: { Stopped => [Idle] }
/// }
///
/// let set = equivalents(&Player::Stopped);
/// assert_eq!(set, vec![Player::Stopped, Player::Idle]);
/// ```
pub fn equivalents<S: State>(state: &S) -> Vec<S> {
    let mut seen = Vec::new();
    expand(state, &mut seen);
    seen
}

fn expand<S: State>(state: &S, seen: &mut Vec<S>) {
    if seen.contains(state) {
        return;
    }
    seen.push(state.clone());
    for sub in state.composed_of() {
        expand(&sub, seen);
    }
}

/// Check whether `other` belongs to the equivalence set of `state`.
pub fn is_equivalent<S: State>(state: &S, other: &S) -> bool {
    equivalents(state).contains(other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_enum;

    state_enum! {
        enum TestState {
            Idle,
            Active,
            Paused,
            Done,
        }
        initial: [Idle]
        final: [Done]
        composite: { Paused => [Idle, Active] }
    }

    #[test]
    fn state_name_returns_variant_name() {
        assert_eq!(TestState::Idle.name(), "Idle");
        assert_eq!(TestState::Paused.name(), "Paused");
    }

    #[test]
    fn state_type_classifies_variants() {
        assert_eq!(TestState::Idle.state_type(), StateType::Initial);
        assert_eq!(TestState::Active.state_type(), StateType::Normal);
        assert_eq!(TestState::Done.state_type(), StateType::Final);
    }

    #[test]
    fn equivalents_includes_self_and_composition() {
        let set = equivalents(&TestState::Paused);
        assert_eq!(
            set,
            vec![TestState::Paused, TestState::Idle, TestState::Active]
        );
    }

    #[test]
    fn equivalents_of_plain_state_is_singleton() {
        assert_eq!(equivalents(&TestState::Active), vec![TestState::Active]);
    }

    #[test]
    fn is_equivalent_matches_members() {
        assert!(is_equivalent(&TestState::Paused, &TestState::Idle));
        assert!(is_equivalent(&TestState::Paused, &TestState::Paused));
        assert!(!is_equivalent(&TestState::Paused, &TestState::Done));
        assert!(!is_equivalent(&TestState::Idle, &TestState::Paused));
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
    enum Cyclic {
        A,
        B,
    }

    impl State for Cyclic {
        fn name(&self) -> &str {
            match self {
                Self::A => "A",
                Self::B => "B",
            }
        }

        fn composed_of(&self) -> Vec<Self> {
            match self {
                Self::A => vec![Self::B],
                Self::B => vec![Self::A],
            }
        }
    }

    #[test]
    fn cyclic_composition_terminates() {
        assert_eq!(equivalents(&Cyclic::A), vec![Cyclic::A, Cyclic::B]);
        assert_eq!(equivalents(&Cyclic::B), vec![Cyclic::B, Cyclic::A]);
    }
}
