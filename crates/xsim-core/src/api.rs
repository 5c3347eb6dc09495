//! Public host-facing API contracts for embedding the simulator.

use std::ops::{ControlFlow, Range};

use crate::memory::Endianness;
use crate::processor::Processor;
use crate::program::Instruction;
use crate::state::RegisterSpec;

/// Default main-memory size in bytes.
pub const DEFAULT_MEMORY_SIZE: usize = 2048;

/// Default flag names, most significant first (`C` is bit 0).
pub const DEFAULT_FLAGS: [&str; 8] = ["I", "T", "H", "S", "V", "P", "Z", "C"];

/// Top-level configuration for a processor instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoreConfig {
    /// Main memory size in bytes.
    pub memory_size: usize,
    /// Byte order of main memory and of every register.
    pub endianness: Endianness,
    /// Register declarations in placement order.
    pub registers: Vec<RegisterSpec>,
    /// Window `[start, stop)` of main memory registers are mapped into.
    pub memory_mapped: Range<usize>,
    /// Flag names, most significant first.
    pub flags: Vec<String>,
    /// Register holding the flags.
    pub status_register: String,
    /// Register holding the index of the next instruction.
    pub program_counter: String,
    /// Register holding the stack top.
    pub stack_pointer: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::basic(DEFAULT_MEMORY_SIZE)
    }
}

impl CoreConfig {
    /// The basic processor layout over `memory_size` bytes of memory.
    ///
    /// Eight general registers fill the 16-byte mapped window; the special
    /// registers spill into private storage, and the stack starts at the top
    /// of memory.
    #[must_use]
    pub fn basic(memory_size: usize) -> Self {
        let mut registers: Vec<RegisterSpec> =
            (0..8).map(|index| RegisterSpec::new(format!("r{index}"), 2)).collect();
        registers.extend(["pc", "ir", "mar", "mdr"].map(|name| RegisterSpec::new(name, 2)));
        registers.push(RegisterSpec::new("sp", 2).with_default(memory_size as u64));
        registers.extend(["sr", "lr"].map(|name| RegisterSpec::new(name, 2)));
        registers.push(RegisterSpec::new("sreg", 1));

        Self {
            memory_size,
            endianness: Endianness::Big,
            registers,
            memory_mapped: 0..16,
            flags: DEFAULT_FLAGS.iter().map(|flag| (*flag).to_owned()).collect(),
            status_register: "sreg".to_owned(),
            program_counter: "pc".to_owned(),
            stack_pointer: "sp".to_owned(),
        }
    }
}

/// Result of one call to [`Processor::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StepOutcome {
    /// An instruction executed and the program continues.
    Continued,
    /// `HALT` executed, now or earlier.
    Halted,
    /// The program counter is past the end of the program.
    Exhausted,
}

impl StepOutcome {
    /// Returns `true` when further steps will not execute anything.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Continued)
    }
}

/// Aggregated outcome from running multiple steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RunOutcome {
    /// Instructions executed during this run call.
    pub steps: u64,
    /// Last step-level status observed before returning.
    pub final_step: StepOutcome,
}

/// Observer invoked after every executed instruction.
///
/// Returning [`ControlFlow::Break`] stops [`Processor::run`] after the
/// current step; single-stepping hosts may ignore it.
pub trait Debugger {
    /// Called with the processor state right after `instruction` executed.
    fn on_step(&mut self, cpu: &Processor, instruction: &Instruction) -> ControlFlow<()>;
}

impl<F> Debugger for F
where
    F: FnMut(&Processor, &Instruction) -> ControlFlow<()>,
{
    fn on_step(&mut self, cpu: &Processor, instruction: &Instruction) -> ControlFlow<()> {
        self(cpu, instruction)
    }
}
