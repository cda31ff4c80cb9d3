//! The transition-resolution and reentrant-dispatch engine.
//!
//! A machine owns its current state, a busy flag, and a FIFO of pending
//! triggers. Trigger processing is strictly serialized per machine: a
//! trigger submitted while another is being resolved (from inside a hook,
//! the unhandled-trigger callback, or a subscriber callback) is queued and
//! runs only after the in-flight trigger and everything queued ahead of it
//! have fully completed.

use crate::core::{
    equivalents, Guard, GuardRegistry, HandlerResult, HandlerTable, JournalEntry, State,
    StateHook, StateTransition, StateType, TransitionJournal, Trigger,
};
use crate::graph::{ConfigError, GraphRegistry, StateGraph};
use crate::machine::MachineError;
use crate::notify::{EventSource, NotificationChannel, Subscription};
use chrono::Utc;
use log::{debug, trace, warn};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A state machine bound to one graph.
///
/// `StateMachine` is a cheap cloneable handle; clones drive the same
/// underlying machine, which is what lets hooks and observers submit
/// triggers re-entrantly.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use switchyard::graph::StateGraph;
/// use switchyard::machine::StateMachine;
/// use switchyard::state_enum;
///
/// state_enum! {
///     enum Job { Queued, Running, Done }
///     initial: [Queued]
///     final: [Done]
/// }
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
/// enum Cmd { Start, Finish }
///
/// # fn main() -> Result<(), switchyard::graph::ConfigError> {
/// let graph = StateGraph::builder()
///     .transitions(Job::Queued, [(Cmd::Start, Job::Running)])
///     .transitions(Job::Running, [(Cmd::Finish, Job::Done)])
///     .initial_state(Job::Queued)?
///     .build()?;
///
/// let machine = StateMachine::new(Arc::new(graph));
/// machine.initiate();
///
/// assert_eq!(machine.trigger(Cmd::Start), Some(true));
/// assert_eq!(machine.state(), Some(Job::Running));
/// # Ok(())
/// # }
/// ```
pub struct StateMachine<S: State, T: Trigger> {
    inner: Arc<MachineInner<S, T>>,
}

struct MachineInner<S: State, T: Trigger> {
    graph: Arc<StateGraph<S, T>>,
    current: Mutex<Option<S>>,
    busy: AtomicBool,
    queue: Mutex<VecDeque<T>>,
    guards: Mutex<GuardRegistry<S, T>>,
    handlers: Mutex<HandlerTable<S, T>>,
    unhandled: Mutex<Option<StateHook<S, T>>>,
    channel: NotificationChannel<S, T>,
    subscriptions: Mutex<Vec<Subscription>>,
    journal: Mutex<TransitionJournal<S, T>>,
}

impl<S: State, T: Trigger> StateMachine<S, T> {
    /// Create a machine bound to a graph. The machine starts uninitialized;
    /// call [`initiate`](Self::initiate) to commit the initial state.
    pub fn new(graph: Arc<StateGraph<S, T>>) -> Self {
        Self {
            inner: Arc::new(MachineInner {
                graph,
                current: Mutex::new(None),
                busy: AtomicBool::new(false),
                queue: Mutex::new(VecDeque::new()),
                guards: Mutex::new(GuardRegistry::new()),
                handlers: Mutex::new(HandlerTable::new()),
                unhandled: Mutex::new(None),
                channel: NotificationChannel::new(),
                subscriptions: Mutex::new(Vec::new()),
                journal: Mutex::new(TransitionJournal::new()),
            }),
        }
    }

    /// Create a machine from a graph published in a registry.
    pub fn from_registry(registry: &GraphRegistry, name: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(registry.require(name)?))
    }

    /// The graph this machine runs on.
    pub fn graph(&self) -> &Arc<StateGraph<S, T>> {
        &self.inner.graph
    }

    /// The current committed state; `None` before [`initiate`](Self::initiate).
    pub fn state(&self) -> Option<S> {
        self.inner.current.lock().clone()
    }

    /// The triggers the graph defines from the current state. Empty before
    /// `initiate`.
    pub fn triggers(&self) -> Vec<T> {
        match self.state() {
            Some(current) => self.inner.graph.triggers_from(&current).cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Composite-aware membership: whether the current state is `state` or
    /// one of its equivalence aliases.
    pub fn is_in(&self, state: &S) -> bool {
        match self.state() {
            Some(current) => equivalents(state).contains(&current),
            None => false,
        }
    }

    /// Snapshot of the journal of committed transitions.
    pub fn journal(&self) -> TransitionJournal<S, T> {
        self.inner.journal.lock().clone()
    }

    /// Commit the graph's initial state and, if a start trigger was
    /// configured, synchronously fire it as the first trigger.
    ///
    /// No-op when a current state is already set, including after a final
    /// state has been reached.
    pub fn initiate(&self) {
        if self.inner.current.lock().is_some() {
            return;
        }
        if self
            .inner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        if self.inner.current.lock().is_some() {
            // Another initiate finished between the check and the claim.
            self.inner.busy.store(false, Ordering::Release);
            return;
        }
        let initial = self.inner.graph.initial_state().clone();
        debug!("{}: initiating in [{}]", self.debug_name(), initial.name());
        self.commit(None, None, initial);
        if let Some(start) = self.inner.graph.start_trigger().cloned() {
            trace!("{}: firing start trigger {:?}", self.debug_name(), start);
            self.process_trigger(start);
        }
        self.drain_queue();
    }

    /// Submit a trigger.
    ///
    /// Returns `Some(outcome)` when this call processed the trigger itself:
    /// `true` if a transition committed (or the unhandled callback signaled
    /// `Continue`), `false` otherwise. Returns `None` when the machine was
    /// already processing a trigger and this one was queued; its outcome is
    /// then observable only through the notification channel.
    pub fn trigger(&self, trigger: T) -> Option<bool> {
        if self
            .inner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("{}: deferring {:?}", self.debug_name(), trigger);
            self.inner.queue.lock().push_back(trigger);
            return None;
        }
        let result = self.process_trigger(trigger);
        self.drain_queue();
        Some(result)
    }

    /// Whether firing `trigger` right now would resolve to an edge whose
    /// guard (if any) passes.
    pub fn can_trigger(&self, trigger: &T) -> bool {
        match self.state() {
            Some(current) => self.next_state(trigger, &current, true).is_some(),
            None => false,
        }
    }

    /// Whether the graph defines an edge for `trigger` from the current
    /// state, ignoring guards. Deliberately distinct from
    /// [`can_trigger`](Self::can_trigger).
    pub fn might_trigger(&self, trigger: &T) -> bool {
        match self.state() {
            Some(current) => self.next_state(trigger, &current, false).is_some(),
            None => false,
        }
    }

    /// Register a guard for `trigger`: the edge only fires while the
    /// predicate holds. First registration per trigger wins.
    pub fn only_if<F>(&self, trigger: T, predicate: F)
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.inner.guards.lock().register(trigger, Guard::new(predicate));
    }

    /// Set the unhandled-trigger callback. Unlike the hook maps this is a
    /// plain field: the last registration wins.
    pub fn unhandled<F>(&self, callback: F)
    where
        F: Fn(&StateTransition<S, T>) -> HandlerResult + Send + Sync + 'static,
    {
        *self.inner.unhandled.lock() = Some(Arc::new(callback));
    }

    /// Register a wildcard enter hook on `state`, run when entering it from
    /// any source without a more specific hook.
    pub fn on_enter<F>(&self, state: S, hook: F)
    where
        F: Fn(&StateTransition<S, T>) -> HandlerResult + Send + Sync + 'static,
    {
        self.inner.handlers.lock().set_enter(state, None, Arc::new(hook));
    }

    /// Register an enter hook on `state` for transitions arriving from
    /// `from`.
    pub fn on_enter_from<F>(&self, state: S, from: S, hook: F)
    where
        F: Fn(&StateTransition<S, T>) -> HandlerResult + Send + Sync + 'static,
    {
        self.inner
            .handlers
            .lock()
            .set_enter(state, Some(from), Arc::new(hook));
    }

    /// Register a wildcard exit hook on `state`, run when leaving it toward
    /// any destination without a more specific hook.
    pub fn on_exit<F>(&self, state: S, hook: F)
    where
        F: Fn(&StateTransition<S, T>) -> HandlerResult + Send + Sync + 'static,
    {
        self.inner.handlers.lock().set_exit(state, None, Arc::new(hook));
    }

    /// Register an exit hook on `state` for transitions leaving toward `to`.
    pub fn on_exit_to<F>(&self, state: S, to: S, hook: F)
    where
        F: Fn(&StateTransition<S, T>) -> HandlerResult + Send + Sync + 'static,
    {
        self.inner
            .handlers
            .lock()
            .set_exit(state, Some(to), Arc::new(hook));
    }

    /// Observe committed states. The returned handle is caller-owned; it is
    /// not released by the machine's finalization.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.inner.channel.subscribe(Arc::new(observer))
    }

    /// Observe reported errors.
    pub fn on_error<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&MachineError<S, T>) + Send + Sync + 'static,
    {
        self.inner.channel.subscribe_errors(Arc::new(observer))
    }

    /// Observe changes of composite-aware membership in `states`: the
    /// callback fires with the new membership value whenever a commit moves
    /// the machine into or out of the watched set. Membership starts out
    /// assumed false.
    pub fn watch_state_is<F>(&self, states: &[S], observer: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.watch_membership(states, false, observer)
    }

    /// Dual of [`watch_state_is`](Self::watch_state_is): fires on changes
    /// of *non*-membership, starting out assumed true.
    pub fn watch_state_is_not<F>(&self, states: &[S], observer: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.watch_membership(states, true, observer)
    }

    fn watch_membership<F>(&self, states: &[S], negated: bool, observer: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let watched: Vec<S> = states.iter().flat_map(equivalents).collect();
        let previous = Mutex::new(negated);
        self.inner.channel.subscribe(Arc::new(move |current: &S| {
            let mut now = watched.contains(current);
            if negated {
                now = !now;
            }
            let changed = {
                let mut prev = previous.lock();
                if *prev != now {
                    *prev = now;
                    true
                } else {
                    false
                }
            };
            if changed {
                observer(now);
            }
        }))
    }

    /// Bind an external event source: every emitted value is mapped to a
    /// trigger and submitted. The binding is tracked by the machine and
    /// released when a final state commits or on [`close`](Self::close).
    pub fn react<E: 'static, F>(&self, source: &impl EventSource<E>, map: F)
    where
        F: Fn(&E) -> T + Send + Sync + 'static,
    {
        let machine = self.clone();
        let subscription = source.subscribe(Arc::new(move |event: &E| {
            machine.trigger(map(event));
        }));
        self.inner.subscriptions.lock().push(subscription);
    }

    /// Release every reactive binding. The current state is untouched and
    /// the machine keeps answering queries.
    pub fn close(&self) {
        self.finalize();
    }

    fn debug_name(&self) -> &str {
        self.inner.graph.name().unwrap_or("machine")
    }

    /// Resolve the next state for a trigger, optionally applying its guard.
    /// A rejecting guard reads the same as a missing edge.
    fn next_state(&self, trigger: &T, current: &S, guarded: bool) -> Option<S> {
        let next = self.inner.graph.edge(current, trigger)?.clone();
        if guarded {
            // Cloned out so the registry lock is released before the
            // predicate runs; the predicate is caller code and may probe
            // the machine.
            let guard = self.inner.guards.lock().guard(trigger);
            if let Some(guard) = guard {
                if !guard.check(current) {
                    return None;
                }
            }
        }
        Some(next)
    }

    fn process_trigger(&self, trigger: T) -> bool {
        let Some(current) = self.state() else {
            warn!(
                "{}: {:?} submitted before initiate, ignoring",
                self.debug_name(),
                trigger
            );
            return false;
        };
        let next = self.next_state(&trigger, &current, true);
        let record = StateTransition {
            trigger: trigger.clone(),
            from: current.clone(),
            to: next.clone(),
        };

        let Some(next) = next else {
            let callback = self.inner.unhandled.lock().clone();
            return match callback.map_or(HandlerResult::Fail, |cb| cb(&record)) {
                HandlerResult::Continue => true,
                HandlerResult::Fail => false,
                HandlerResult::Exception => {
                    self.inner.channel.publish_error(&MachineError::TriggerRejected {
                        trigger,
                        state: current,
                    });
                    false
                }
            };
        };

        trace!(
            "{}: [{}] --{:?}--> [{}]",
            self.debug_name(),
            current.name(),
            trigger,
            next.name()
        );

        let exit = self.inner.handlers.lock().exit_handler(&current, &next);
        match exit.map_or(HandlerResult::Continue, |hook| hook(&record)) {
            HandlerResult::Fail => return false,
            HandlerResult::Exception => {
                self.inner.channel.publish_error(&MachineError::ExitHandlerFailed {
                    trigger,
                    from: current,
                    to: next,
                });
                return false;
            }
            HandlerResult::Continue => {}
        }

        let enter = self.inner.handlers.lock().enter_handler(&next, &current);
        match enter.map_or(HandlerResult::Continue, |hook| hook(&record)) {
            HandlerResult::Fail => false,
            HandlerResult::Exception => {
                self.inner.channel.publish_error(&MachineError::EnterHandlerFailed {
                    trigger,
                    from: current,
                    to: next,
                });
                false
            }
            HandlerResult::Continue => {
                self.commit(Some(trigger), Some(current), next);
                true
            }
        }
    }

    /// Process queued triggers in arrival order until none remain, then
    /// clear the busy flag.
    fn drain_queue(&self) {
        loop {
            let next = self.inner.queue.lock().pop_front();
            match next {
                Some(trigger) => {
                    self.process_trigger(trigger);
                }
                None => {
                    self.inner.busy.store(false, Ordering::Release);
                    // A trigger enqueued between the empty check and the
                    // flag clear would otherwise sit until the next call;
                    // reclaim and keep draining.
                    if !self.inner.queue.lock().is_empty()
                        && self
                            .inner
                            .busy
                            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                            .is_ok()
                    {
                        continue;
                    }
                    break;
                }
            }
        }
    }

    fn commit(&self, trigger: Option<T>, from: Option<S>, next: S) {
        *self.inner.current.lock() = Some(next.clone());
        {
            let mut journal = self.inner.journal.lock();
            *journal = journal.record(JournalEntry {
                trigger,
                from,
                to: next.clone(),
                at: Utc::now(),
            });
        }
        debug!("{}: committed [{}]", self.debug_name(), next.name());
        self.inner.channel.publish(&next);
        if next.state_type() == StateType::Final {
            debug!(
                "{}: [{}] is final, releasing reactive bindings",
                self.debug_name(),
                next.name()
            );
            self.finalize();
        }
    }

    fn finalize(&self) {
        let subscriptions: Vec<Subscription> =
            self.inner.subscriptions.lock().drain(..).collect();
        for subscription in subscriptions {
            subscription.cancel();
        }
    }
}

impl<S: State, T: Trigger> Clone for StateMachine<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
