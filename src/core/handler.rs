//! Enter/exit hooks and the handler protocol.
//!
//! Hooks observe a transition in flight and may veto it. An exit hook runs
//! while leaving a state, keyed by the destination; an enter hook runs while
//! entering one, keyed by the source. A `None` key is the wildcard, matched
//! when no hook is registered for the specific peer state.

use super::state::{State, Trigger};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome signaled by a hook or by the unhandled-trigger callback.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HandlerResult {
    /// Proceed with the transition (or treat an unhandled trigger as done).
    Continue,
    /// Abort silently; the caller sees failure but no error is reported.
    Fail,
    /// Abort and report an error on the notification channel.
    Exception,
}

/// The transition a hook observes: the trigger that caused it, the state it
/// leaves, and the state it enters (`None` when no edge or guard matched).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State, T: Trigger> {
    /// The trigger that caused the attempt.
    pub trigger: T,
    /// The state being left.
    pub from: S,
    /// The resolved destination; absent for an unhandled trigger.
    pub to: Option<S>,
}

/// Hook invoked while a transition is in flight.
pub type StateHook<S, T> = Arc<dyn Fn(&StateTransition<S, T>) -> HandlerResult + Send + Sync>;

/// Enter and exit hooks for a single state.
///
/// Exit hooks are keyed by destination, enter hooks by source. At most one
/// hook per key; the first registration wins.
struct StateHooks<S: State, T: Trigger> {
    on_enter: HashMap<Option<S>, StateHook<S, T>>,
    on_exit: HashMap<Option<S>, StateHook<S, T>>,
}

impl<S: State, T: Trigger> StateHooks<S, T> {
    fn new() -> Self {
        Self {
            on_enter: HashMap::new(),
            on_exit: HashMap::new(),
        }
    }
}

/// Per-state hook maps with wildcard fallback.
pub struct HandlerTable<S: State, T: Trigger> {
    hooks: HashMap<S, StateHooks<S, T>>,
}

impl<S: State, T: Trigger> HandlerTable<S, T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Register an enter hook on `state`, keyed by the source state
    /// (`None` = wildcard). First registration per key wins.
    pub fn set_enter(&mut self, state: S, from: Option<S>, hook: StateHook<S, T>) {
        self.hooks
            .entry(state)
            .or_insert_with(StateHooks::new)
            .on_enter
            .entry(from)
            .or_insert(hook);
    }

    /// Register an exit hook on `state`, keyed by the destination state
    /// (`None` = wildcard). First registration per key wins.
    pub fn set_exit(&mut self, state: S, to: Option<S>, hook: StateHook<S, T>) {
        self.hooks
            .entry(state)
            .or_insert_with(StateHooks::new)
            .on_exit
            .entry(to)
            .or_insert(hook);
    }

    /// The enter hook to run when entering `state` from `from`: the hook
    /// keyed by `from` if registered, else the wildcard hook.
    pub fn enter_handler(&self, state: &S, from: &S) -> Option<StateHook<S, T>> {
        let hooks = self.hooks.get(state)?;
        hooks
            .on_enter
            .get(&Some(from.clone()))
            .or_else(|| hooks.on_enter.get(&None))
            .cloned()
    }

    /// The exit hook to run when leaving `state` toward `to`: the hook
    /// keyed by `to` if registered, else the wildcard hook.
    pub fn exit_handler(&self, state: &S, to: &S) -> Option<StateHook<S, T>> {
        let hooks = self.hooks.get(state)?;
        hooks
            .on_exit
            .get(&Some(to.clone()))
            .or_else(|| hooks.on_exit.get(&None))
            .cloned()
    }
}

impl<S: State, T: Trigger> Default for HandlerTable<S, T> {
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
            A,
            B,
            C,
        }
        initial: [A]
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
    enum TestTrigger {
        Next,
    }

    fn record() -> StateTransition<TestState, TestTrigger> {
        StateTransition {
            trigger: TestTrigger::Next,
            from: TestState::A,
            to: Some(TestState::B),
        }
    }

    #[test]
    fn specific_key_beats_wildcard() {
        let mut table: HandlerTable<TestState, TestTrigger> = HandlerTable::new();
        table.set_enter(TestState::B, None, Arc::new(|_| HandlerResult::Fail));
        table.set_enter(
            TestState::B,
            Some(TestState::A),
            Arc::new(|_| HandlerResult::Continue),
        );

        let hook = table.enter_handler(&TestState::B, &TestState::A).unwrap();
        assert_eq!(hook(&record()), HandlerResult::Continue);

        let fallback = table.enter_handler(&TestState::B, &TestState::C).unwrap();
        assert_eq!(fallback(&record()), HandlerResult::Fail);
    }

    #[test]
    fn missing_state_has_no_handler() {
        let table: HandlerTable<TestState, TestTrigger> = HandlerTable::new();

        assert!(table.enter_handler(&TestState::B, &TestState::A).is_none());
        assert!(table.exit_handler(&TestState::A, &TestState::B).is_none());
    }

    #[test]
    fn first_registration_wins_per_key() {
        let mut table: HandlerTable<TestState, TestTrigger> = HandlerTable::new();
        table.set_exit(
            TestState::A,
            Some(TestState::B),
            Arc::new(|_| HandlerResult::Fail),
        );
        table.set_exit(
            TestState::A,
            Some(TestState::B),
            Arc::new(|_| HandlerResult::Continue),
        );

        let hook = table.exit_handler(&TestState::A, &TestState::B).unwrap();
        assert_eq!(hook(&record()), HandlerResult::Fail);
    }

    #[test]
    fn wildcard_only_matches_any_peer() {
        let mut table: HandlerTable<TestState, TestTrigger> = HandlerTable::new();
        table.set_exit(TestState::A, None, Arc::new(|_| HandlerResult::Continue));

        assert!(table.exit_handler(&TestState::A, &TestState::B).is_some());
        assert!(table.exit_handler(&TestState::A, &TestState::C).is_some());
    }
}
