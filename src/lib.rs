//! Switchyard: a reentrant, trigger-driven finite state machine engine.
//!
//! Callers declare a directed graph of states and trigger-labeled edges
//! (optionally with hierarchical composite states, guarded edges, and
//! enter/exit hooks), then drive a machine by feeding it triggers one at a
//! time. Each accepted transition is resolved, hooked, committed, and
//! republished to observers. Triggers submitted re-entrantly (from inside a
//! hook or a subscriber callback) are serialized through a FIFO queue rather
//! than interleaved or lost.
//!
//! # Core Concepts
//!
//! - **StateGraph**: immutable edge mapping, built once via
//!   [`StateGraphBuilder`](graph::StateGraphBuilder)
//! - **Guards**: per-trigger predicates that can veto an edge
//! - **Hooks**: enter/exit callbacks that observe and may abort a transition
//! - **Reentrancy**: a busy flag plus trigger queue guarantee strict arrival
//!   order for triggers raised mid-transition
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use switchyard::graph::StateGraph;
//! use switchyard::machine::StateMachine;
//! use switchyard::state_enum;
//!
//! state_enum! {
//!     enum Light { Red, Green, Yellow }
//!     initial: [Red]
//! }
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
//! enum Tick {
//!     Advance,
//! }
//!
//! # fn main() -> Result<(), switchyard::graph::ConfigError> {
//! let graph = StateGraph::builder()
//!     .transitions(Light::Red, [(Tick::Advance, Light::Green)])
//!     .transitions(Light::Green, [(Tick::Advance, Light::Yellow)])
//!     .transitions(Light::Yellow, [(Tick::Advance, Light::Red)])
//!     .initial_state(Light::Red)?
//!     .build()?;
//!
//! let machine = StateMachine::new(Arc::new(graph));
//! machine.initiate();
//! machine.trigger(Tick::Advance);
//!
//! assert_eq!(machine.state(), Some(Light::Green));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod graph;
pub mod machine;
pub mod notify;

// Re-export commonly used types
pub use core::{
    equivalents, Guard, HandlerResult, State, StateTransition, StateType, TransitionJournal,
    Trigger,
};
pub use graph::{ConfigError, GraphRegistry, StateGraph, StateGraphBuilder};
pub use machine::{MachineError, StateMachine};
pub use notify::{EventSource, NotificationChannel, Publisher, Subscription};
