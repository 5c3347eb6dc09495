//! Core instruction-set simulator for the xsim toy architecture.

/// Observable, hierarchical byte storage with views and access restrictions.
pub mod memory;
pub use memory::{
    Access, AccessKind, Endianness, HookEvent, HookId, Memory, ParentLink, RangeEntry, RangeMap,
    SpaceId, DUMP_BYTES_PER_ROW, MAX_ACCESS_BYTES,
};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{CoreConfig, Debugger, RunOutcome, StepOutcome, DEFAULT_FLAGS, DEFAULT_MEMORY_SIZE};

/// Register file, flag table and execution state.
pub mod state;
pub use state::{Flags, Register, RegisterFile, RegisterKey, RegisterSpec, RunState};

/// Decoded program records.
pub mod program;
pub use program::{Instruction, Operand, OperandKind, Operands, Role};

/// Fault taxonomy shared by memory, registers and execution.
pub mod fault;
pub use fault::{Fault, FaultClass};

/// Instruction semantics and the mnemonic registry.
pub mod execute;
pub use execute::{ArithmeticFlags, Handler, InstructionSet};

/// Fetch-decode-execute engine.
pub mod processor;
pub use processor::Processor;

/// Display and keyboard peripherals.
pub mod peripherals;
pub use peripherals::{Display, DisplayConfig, KeyBuffer, Keyboard, KeyboardConfig};

#[cfg(test)]
use proptest as _;
