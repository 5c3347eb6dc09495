//! The execution engine: memory, registers, flags and the step loop.
//!
//! One step reads the program counter, fetches that record, advances the
//! counter *before* executing (so jumps are not overwritten), dispatches the
//! mnemonic and notifies the attached debugger. The caller paces execution
//! by calling [`Processor::step`] or one of the run helpers.

use std::fmt;
use std::ops::ControlFlow;
use std::rc::Rc;

use crate::api::{CoreConfig, Debugger, RunOutcome, StepOutcome};
use crate::execute::InstructionSet;
use crate::memory::{Memory, SpaceId};
use crate::program::Instruction;
use crate::state::{Flags, RegisterFile, RegisterKey, RunState};
use crate::Fault;

#[derive(Debug, Clone)]
struct SpecialRegisters {
    status: String,
    program_counter: String,
    stack_pointer: String,
}

/// A simulated processor owning its memory graph.
pub struct Processor {
    memory: Memory,
    main: SpaceId,
    registers: RegisterFile,
    flags: Flags,
    special: SpecialRegisters,
    instruction_set: InstructionSet,
    program: Rc<[Instruction]>,
    halt: bool,
    run_state: RunState,
    steps: u64,
    debugger: Option<Box<dyn Debugger>>,
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("main", &self.main)
            .field("registers", &self.registers)
            .field("flags", &self.flags)
            .field("program_len", &self.program.len())
            .field("halt", &self.halt)
            .field("run_state", &self.run_state)
            .field("steps", &self.steps)
            .field("debugger", &self.debugger.is_some())
            .finish_non_exhaustive()
    }
}

impl Processor {
    /// Builds a processor with the basic instruction set.
    ///
    /// # Errors
    ///
    /// Fails when the register layout is invalid or a special register named
    /// by `config` is not declared.
    pub fn new(config: &CoreConfig) -> Result<Self, Fault> {
        Self::with_instruction_set(config, InstructionSet::basic())
    }

    /// Builds a processor with a custom instruction set.
    ///
    /// # Errors
    ///
    /// Same as [`Processor::new`].
    pub fn with_instruction_set(config: &CoreConfig, instruction_set: InstructionSet) -> Result<Self, Fault> {
        let mut memory = Memory::new();
        let main = memory.allocate(config.memory_size, config.endianness);
        let registers = RegisterFile::new(
            &mut memory,
            main,
            &config.registers,
            config.memory_mapped.clone(),
        )?;
        for name in [
            &config.status_register,
            &config.program_counter,
            &config.stack_pointer,
        ] {
            registers.require(name)?;
        }

        tracing::debug!(
            memory_size = config.memory_size,
            registers = registers.len(),
            instructions = instruction_set.len(),
            "constructed processor"
        );
        Ok(Self {
            memory,
            main,
            registers,
            flags: Flags::new(&config.flags),
            special: SpecialRegisters {
                status: config.status_register.clone(),
                program_counter: config.program_counter.clone(),
                stack_pointer: config.stack_pointer.clone(),
            },
            instruction_set,
            program: Rc::from(Vec::new()),
            halt: false,
            run_state: RunState::Ready,
            steps: 0,
            debugger: None,
        })
    }

    /// Replaces the program and restarts from instruction 0.
    ///
    /// # Errors
    ///
    /// Propagates faults from resetting the program counter.
    pub fn load_program(&mut self, program: impl Into<Rc<[Instruction]>>) -> Result<(), Fault> {
        self.program = program.into();
        tracing::debug!(instructions = self.program.len(), "loaded program");
        self.restart()
    }

    /// Clears the halt flag, zeroes the program counter and returns to `Ready`.
    ///
    /// # Errors
    ///
    /// Propagates faults from writing the program counter.
    pub fn restart(&mut self) -> Result<(), Fault> {
        self.halt = false;
        self.run_state = RunState::Ready;
        self.set_program_counter(0)
    }

    /// Attaches an observer called after every executed instruction.
    pub fn attach_debugger(&mut self, debugger: impl Debugger + 'static) {
        self.debugger = Some(Box::new(debugger));
    }

    /// Detaches and returns the current debugger.
    pub fn detach_debugger(&mut self) -> Option<Box<dyn Debugger>> {
        self.debugger.take()
    }

    /// Executes one instruction.
    ///
    /// A halted processor returns [`StepOutcome::Halted`] without executing.
    ///
    /// # Errors
    ///
    /// Returns the fault raised by the fetched instruction. Side effects
    /// applied before the fault stay in place, including the advanced
    /// program counter.
    pub fn step(&mut self) -> Result<StepOutcome, Fault> {
        self.advance().map(|(outcome, _)| outcome)
    }

    /// Steps until `HALT`, program exhaustion, or a debugger break.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first fault.
    pub fn run(&mut self) -> Result<RunOutcome, Fault> {
        self.drive(None)
    }

    /// Like [`Processor::run`], executing at most `limit` instructions.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first fault.
    pub fn run_steps(&mut self, limit: u64) -> Result<RunOutcome, Fault> {
        self.drive(Some(limit))
    }

    fn drive(&mut self, limit: Option<u64>) -> Result<RunOutcome, Fault> {
        let start = self.steps;
        let mut final_step = if self.halt {
            StepOutcome::Halted
        } else {
            StepOutcome::Continued
        };
        while limit.map_or(true, |limit| self.steps - start < limit) {
            let (outcome, flow) = self.advance()?;
            final_step = outcome;
            if outcome.is_terminal() || flow.is_break() {
                break;
            }
        }
        Ok(RunOutcome {
            steps: self.steps - start,
            final_step,
        })
    }

    fn advance(&mut self) -> Result<(StepOutcome, ControlFlow<()>), Fault> {
        if self.halt {
            self.run_state = RunState::Halted;
            return Ok((StepOutcome::Halted, ControlFlow::Break(())));
        }

        let pc = self.program_counter()?;
        let program = Rc::clone(&self.program);
        let Some(instruction) = usize::try_from(pc).ok().and_then(|index| program.get(index)) else {
            self.run_state = RunState::Halted;
            tracing::debug!(pc, steps = self.steps, "program exhausted");
            return Ok((StepOutcome::Exhausted, ControlFlow::Break(())));
        };

        self.set_program_counter(pc.wrapping_add(1))?;
        self.run_state = RunState::Running;
        tracing::trace!(pc, instruction = %instruction, "executing");
        if let Err(fault) = self.execute(instruction) {
            tracing::warn!(pc, instruction = %instruction, %fault, "step failed");
            return Err(fault);
        }
        self.steps += 1;

        let flow = match self.debugger.take() {
            Some(mut debugger) => {
                let flow = debugger.on_step(self, instruction);
                self.debugger = Some(debugger);
                flow
            }
            None => ControlFlow::Continue(()),
        };

        if self.halt {
            self.run_state = RunState::Halted;
            tracing::debug!(pc, steps = self.steps, "halted");
            return Ok((StepOutcome::Halted, flow));
        }
        Ok((StepOutcome::Continued, flow))
    }

    /// Dispatches a single record without touching the program counter.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownInstruction`] or the handler's fault.
    pub fn execute(&mut self, instruction: &Instruction) -> Result<(), Fault> {
        let handler = self.instruction_set.lookup(&instruction.name)?;
        handler(self, &instruction.operands)
    }

    /// Sets the halt flag; the run loop stops after the current step.
    pub fn halt(&mut self) {
        self.halt = true;
    }

    /// Returns `true` once `HALT` executed.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halt
    }

    /// Current execution state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Instructions executed since construction.
    #[must_use]
    pub const fn steps_executed(&self) -> u64 {
        self.steps
    }

    /// Reads a register, firing hooks.
    ///
    /// # Errors
    ///
    /// Returns a register fault for unknown names or unmapped offsets.
    pub fn register<'k>(&mut self, key: impl Into<RegisterKey<'k>>) -> Result<u64, Fault> {
        self.registers.get(&mut self.memory, key)
    }

    /// Writes a register, firing hooks.
    ///
    /// # Errors
    ///
    /// Returns a register fault for unknown names or unmapped offsets.
    pub fn set_register<'k>(&mut self, key: impl Into<RegisterKey<'k>>, value: u64) -> Result<(), Fault> {
        self.registers.set(&mut self.memory, key, value)
    }

    /// Reads a register without firing hooks.
    ///
    /// # Errors
    ///
    /// Returns a register fault for unknown names or unmapped offsets.
    pub fn peek_register<'k>(&self, key: impl Into<RegisterKey<'k>>) -> Result<u64, Fault> {
        self.registers.peek(&self.memory, key)
    }

    /// Program counter value.
    ///
    /// # Errors
    ///
    /// Propagates register faults.
    pub fn program_counter(&mut self) -> Result<u64, Fault> {
        self.registers
            .get(&mut self.memory, self.special.program_counter.as_str())
    }

    /// Writes the program counter.
    ///
    /// # Errors
    ///
    /// Propagates register faults.
    pub fn set_program_counter(&mut self, value: u64) -> Result<(), Fault> {
        self.registers
            .set(&mut self.memory, self.special.program_counter.as_str(), value)
    }

    /// Stack pointer value.
    ///
    /// # Errors
    ///
    /// Propagates register faults.
    pub fn stack_pointer(&mut self) -> Result<u64, Fault> {
        self.registers
            .get(&mut self.memory, self.special.stack_pointer.as_str())
    }

    /// Writes the stack pointer.
    ///
    /// # Errors
    ///
    /// Propagates register faults.
    pub fn set_stack_pointer(&mut self, value: u64) -> Result<(), Fault> {
        self.registers
            .set(&mut self.memory, self.special.stack_pointer.as_str(), value)
    }

    /// Status register value.
    ///
    /// # Errors
    ///
    /// Propagates register faults.
    pub fn status(&mut self) -> Result<u64, Fault> {
        self.registers.get(&mut self.memory, self.special.status.as_str())
    }

    /// Whether flag `name` is set. Unconfigured flags read as clear.
    ///
    /// # Errors
    ///
    /// Propagates register faults.
    pub fn flag(&mut self, name: &str) -> Result<bool, Fault> {
        let status = self.status()?;
        Ok(self.flags.is_set(status, name))
    }

    /// Whether flag `name` is set, without firing hooks.
    ///
    /// # Errors
    ///
    /// Propagates register faults.
    pub fn peek_flag(&self, name: &str) -> Result<bool, Fault> {
        let status = self.peek_register(self.special.status.as_str())?;
        Ok(self.flags.is_set(status, name))
    }

    /// Clears every configured flag, then sets the `seated` ones.
    ///
    /// # Errors
    ///
    /// Propagates register faults.
    pub fn update_flags(&mut self, seated: &[&str]) -> Result<(), Fault> {
        let status = self.status()?;
        let status = self.flags.compose(status, seated);
        self.registers
            .set(&mut self.memory, self.special.status.as_str(), status)
    }

    /// Reads `size` bytes of main memory.
    ///
    /// # Errors
    ///
    /// Propagates memory faults.
    pub fn read_memory(&mut self, address: usize, size: usize) -> Result<u64, Fault> {
        self.memory.read(self.main, address, size)
    }

    /// Writes `size` bytes of main memory.
    ///
    /// # Errors
    ///
    /// Propagates memory faults.
    pub fn write_memory(&mut self, address: usize, value: u64, size: usize) -> Result<(), Fault> {
        self.memory.write(self.main, address, value, size)
    }

    /// The memory arena.
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// The memory arena, for attaching views, hooks and peripherals.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Handle of main memory.
    #[must_use]
    pub const fn main_memory(&self) -> SpaceId {
        self.main
    }

    /// The register file.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// The flag table.
    #[must_use]
    pub const fn flags(&self) -> &Flags {
        &self.flags
    }

    /// The instruction registry.
    #[must_use]
    pub const fn instruction_set(&self) -> &InstructionSet {
        &self.instruction_set
    }

    /// The instruction registry, for registering extra mnemonics.
    pub fn instruction_set_mut(&mut self) -> &mut InstructionSet {
        &mut self.instruction_set
    }

    /// The loaded program.
    #[must_use]
    pub fn program(&self) -> &[Instruction] {
        &self.program
    }
}
