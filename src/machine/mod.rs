//! The transition engine.

pub mod engine;
pub mod error;

pub use engine::StateMachine;
pub use error::MachineError;
