//! Publish/subscribe plumbing for committed states and reported errors.
//!
//! Delivery is callback-based and synchronous: `emit` invokes every current
//! observer in subscription order before returning. Observer lists are
//! snapshotted before invocation, so a callback may subscribe, unsubscribe,
//! or emit again without deadlocking the publisher.

use crate::core::{State, Trigger};
use crate::machine::MachineError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Callback receiving published values.
pub type Observer<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Anything observers can be attached to.
///
/// [`Publisher`] implements this; so can any caller-supplied event source
/// that a machine should [`react`](crate::machine::StateMachine::react) to.
pub trait EventSource<E: 'static> {
    /// Attach an observer, returning the handle that detaches it.
    fn subscribe(&self, observer: Observer<E>) -> Subscription;
}

/// Cancel handle for one attached observer.
///
/// Dropping a subscription does not detach the observer; call
/// [`cancel`](Subscription::cancel). Machines track the subscriptions they
/// create and cancel them together on reaching a final state or on
/// [`close`](crate::machine::StateMachine::close).
pub struct Subscription {
    id: Uuid,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a cancel action under a fresh id.
    pub fn new(id: Uuid, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// The subscription's unique id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Detach the observer.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Synchronous fan-out publisher.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use switchyard::notify::{EventSource, Publisher};
///
/// let publisher: Publisher<u32> = Publisher::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// let subscription = publisher.subscribe(Arc::new(move |n: &u32| {
///     sink.lock().push(*n);
/// }));
///
/// publisher.emit(&1);
/// publisher.emit(&2);
/// subscription.cancel();
/// publisher.emit(&3);
///
/// assert_eq!(*seen.lock(), vec![1, 2]);
/// ```
pub struct Publisher<E: 'static> {
    observers: Arc<Mutex<Vec<(Uuid, Observer<E>)>>>,
}

impl<E: 'static> Publisher<E> {
    /// Create a publisher with no observers.
    pub fn new() -> Self {
        Self {
            observers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Deliver a value to every current observer, in subscription order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Observer<E>> = self
            .observers
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in snapshot {
            observer(event);
        }
    }

    /// Number of currently attached observers.
    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }
}

impl<E: 'static> EventSource<E> for Publisher<E> {
    fn subscribe(&self, observer: Observer<E>) -> Subscription {
        let id = Uuid::new_v4();
        self.observers.lock().push((id, observer));
        let observers = Arc::clone(&self.observers);
        Subscription::new(id, move || {
            observers.lock().retain(|(entry_id, _)| *entry_id != id);
        })
    }
}

impl<E: 'static> Clone for Publisher<E> {
    fn clone(&self) -> Self {
        Self {
            observers: Arc::clone(&self.observers),
        }
    }
}

impl<E: 'static> Default for Publisher<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// The channel a machine publishes through: committed states on one path,
/// reported errors on the other.
///
/// Only committed states are published; failed or rejected attempts never
/// appear as state changes.
pub struct NotificationChannel<S: State, T: Trigger> {
    states: Publisher<S>,
    errors: Publisher<MachineError<S, T>>,
}

impl<S: State, T: Trigger> NotificationChannel<S, T> {
    /// Create a channel with no subscribers.
    pub fn new() -> Self {
        Self {
            states: Publisher::new(),
            errors: Publisher::new(),
        }
    }

    /// Publish a committed state.
    pub fn publish(&self, state: &S) {
        self.states.emit(state);
    }

    /// Report an error.
    pub fn publish_error(&self, error: &MachineError<S, T>) {
        self.errors.emit(error);
    }

    /// Observe committed states.
    pub fn subscribe(&self, observer: Observer<S>) -> Subscription {
        self.states.subscribe(observer)
    }

    /// Observe reported errors.
    pub fn subscribe_errors(&self, observer: Observer<MachineError<S, T>>) -> Subscription {
        self.errors.subscribe(observer)
    }
}

impl<S: State, T: Trigger> Default for NotificationChannel<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_reaches_observers_in_subscription_order() {
        let publisher: Publisher<&str> = Publisher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        let _a = publisher.subscribe(Arc::new(move |e: &&str| {
            first.lock().push(format!("a:{e}"));
        }));
        let second = Arc::clone(&seen);
        let _b = publisher.subscribe(Arc::new(move |e: &&str| {
            second.lock().push(format!("b:{e}"));
        }));

        publisher.emit(&"x");

        assert_eq!(*seen.lock(), vec!["a:x", "b:x"]);
    }

    #[test]
    fn cancel_detaches_the_observer() {
        let publisher: Publisher<u32> = Publisher::new();
        let seen = Arc::new(Mutex::new(0u32));

        let sink = Arc::clone(&seen);
        let subscription = publisher.subscribe(Arc::new(move |n: &u32| {
            *sink.lock() += n;
        }));
        publisher.emit(&1);
        subscription.cancel();
        publisher.emit(&10);

        assert_eq!(*seen.lock(), 1);
        assert_eq!(publisher.observer_count(), 0);
    }

    #[test]
    fn dropping_a_subscription_keeps_the_observer() {
        let publisher: Publisher<u32> = Publisher::new();
        let seen = Arc::new(Mutex::new(0u32));

        let sink = Arc::clone(&seen);
        drop(publisher.subscribe(Arc::new(move |n: &u32| {
            *sink.lock() += n;
        })));
        publisher.emit(&5);

        assert_eq!(*seen.lock(), 5);
    }

    #[test]
    fn observer_may_emit_reentrantly() {
        let publisher: Publisher<u32> = Publisher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = publisher.clone();
        let sink = Arc::clone(&seen);
        let _sub = publisher.subscribe(Arc::new(move |n: &u32| {
            sink.lock().push(*n);
            if *n == 1 {
                inner.emit(&2);
            }
        }));

        publisher.emit(&1);

        assert_eq!(*seen.lock(), vec![1, 2]);
    }
}
