//! Processor state built on top of memory.

/// Status-register flag masks.
pub mod flags;
/// Register placement and lookup.
pub mod registers;
/// Execution-state machine.
pub mod run_state;

pub use flags::Flags;
pub use registers::{Register, RegisterFile, RegisterKey, RegisterSpec};
pub use run_state::RunState;
