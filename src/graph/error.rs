//! Configuration errors raised while defining or sharing state graphs.

use crate::core::StateType;
use thiserror::Error;

/// Errors that can occur while building a graph or using the registry.
///
/// All of these are raised synchronously at configuration time; none of
/// them can surface once a machine is running.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{state} is not an Initial state, it is of type {actual:?}")]
    NotAnInitialState { state: String, actual: StateType },

    #[error("initial state is already set to {current} and cannot be reset to {attempted}")]
    InitialStateAlreadySet { current: String, attempted: String },

    #[error("start trigger is already set and cannot be reset")]
    StartTriggerAlreadySet,

    #[error("graph name is already set to \"{current}\" and cannot be reset to \"{attempted}\"")]
    NameAlreadySet { current: String, attempted: String },

    #[error("initial state not specified. Call .initial_state(state) before .build()")]
    MissingInitialState,

    #[error("cannot register an unnamed graph. Call .named(name) before .build()")]
    UnnamedGraph,

    #[error("a graph named \"{name}\" already exists. Remove it or clear the registry to redefine it")]
    DefinitionExists { name: String },

    #[error("no graph named \"{name}\" is registered")]
    UnknownDefinition { name: String },
}
