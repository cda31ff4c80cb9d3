//! Guard predicates for vetoing otherwise-valid transitions.
//!
//! A guard is a pure boolean function of the current state, registered per
//! trigger. An edge whose trigger is guarded only fires when the predicate
//! passes; a rejecting guard is indistinguishable from a missing edge.

use super::state::{State, Trigger};
use std::collections::HashMap;
use std::sync::Arc;

/// Predicate that can veto a transition for a given trigger.
///
/// # Example
///
/// ```rust
/// use switchyard::core::Guard;
/// use switchyard::state_enum;
///
/// state_enum! {
///     enum WorkState {
///         Idle,
///         Busy,
///     }
/// }
///
/// let only_from_idle = Guard::new(|s: &WorkState| matches!(s, WorkState::Idle));
///
/// assert!(only_from_idle.check(&WorkState::Idle));
/// assert!(!only_from_idle.check(&WorkState::Busy));
/// ```
pub struct Guard<S: State> {
    predicate: Arc<dyn Fn(&S) -> bool + Send + Sync>,
}

impl<S: State> Guard<S> {
    /// Create a guard from a predicate function.
    ///
    /// The predicate should be deterministic; it may be re-evaluated by
    /// non-mutating probes between transitions.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the guard against the current state.
    pub fn check(&self, state: &S) -> bool {
        (self.predicate)(state)
    }
}

impl<S: State> Clone for Guard<S> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

/// One guard per trigger, first registration wins.
pub struct GuardRegistry<S: State, T: Trigger> {
    guards: HashMap<T, Guard<S>>,
}

impl<S: State, T: Trigger> GuardRegistry<S, T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            guards: HashMap::new(),
        }
    }

    /// Register a guard for a trigger. A guard already registered for the
    /// same trigger is kept; the new one is ignored.
    pub fn register(&mut self, trigger: T, guard: Guard<S>) {
        self.guards.entry(trigger).or_insert(guard);
    }

    /// Look up the guard registered for a trigger, if any.
    ///
    /// Callers holding a lock around the registry should clone the guard
    /// out and release the lock before evaluating it.
    pub fn guard(&self, trigger: &T) -> Option<Guard<S>> {
        self.guards.get(trigger).cloned()
    }

    /// Evaluate the trigger's guard against the current state.
    ///
    /// Returns true when no guard is registered.
    pub fn evaluate(&self, trigger: &T, current: &S) -> bool {
        self.guards.get(trigger).map_or(true, |g| g.check(current))
    }
}

impl<S: State, T: Trigger> Default for GuardRegistry<S, T> {
    fn default() -> Self {
        Self::new()
    }
}
