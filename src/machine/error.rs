//! Errors reported on the notification channel's error path.

use crate::core::{State, Trigger};
use thiserror::Error;

/// Failures produced while resolving a trigger.
///
/// These are only ever produced when a hook or the unhandled-trigger
/// callback signals `Exception`; a `Fail` aborts silently. They are
/// delivered asynchronously through the channel's error path, never
/// returned from `trigger()`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MachineError<S: State, T: Trigger> {
    /// No edge (or a vetoing guard) matched the trigger and the
    /// unhandled-trigger callback signaled `Exception`.
    #[error("invalid trigger {trigger:?} for current state {state:?}")]
    TriggerRejected { trigger: T, state: S },

    /// The exit hook of `from` signaled `Exception` while handling
    /// `trigger` toward `to`.
    #[error("exiting {from:?} raised an exception transitioning to {to:?} on {trigger:?}")]
    ExitHandlerFailed { trigger: T, from: S, to: S },

    /// The enter hook of `to` signaled `Exception` while handling
    /// `trigger` from `from`.
    #[error("entering {to:?} raised an exception transitioning from {from:?} on {trigger:?}")]
    EnterHandlerFailed { trigger: T, from: S, to: S },
}
