//! Instruction semantics and the mnemonic registry.
//!
//! Each handler resolves its operands against the processor, computes, and
//! writes back. Handlers apply side effects as they go: a failing handler
//! leaves whatever it already wrote.

#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::unnecessary_wraps
)]

mod arithmetic;
mod bitwise;
mod control;
mod data;
mod flags;
mod helpers;
mod jumps;
mod stack;

pub use flags::{mask, ArithmeticFlags};
pub use helpers::{
    effective_address, pop, push, required_size, resolve, resolve_role, store, to_address,
    POINTER_WIDTH, WORD_MASK,
};

use indexmap::IndexMap;

use crate::processor::Processor;
use crate::program::Operands;
use crate::Fault;

/// Signature of an instruction implementation.
pub type Handler = fn(&mut Processor, &Operands) -> Result<(), Fault>;

/// Mnemonic to handler table, populated once per processor.
#[derive(Clone)]
pub struct InstructionSet {
    handlers: IndexMap<String, Handler>,
}

impl std::fmt::Debug for InstructionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl Default for InstructionSet {
    fn default() -> Self {
        Self::basic()
    }
}

impl InstructionSet {
    /// Table with no instructions.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }

    /// The basic processor's instruction set.
    #[must_use]
    pub fn basic() -> Self {
        let table: [(&str, Handler); 30] = [
            ("MOV", data::mov),
            ("DB", data::db),
            ("ADD", arithmetic::add),
            ("SUB", arithmetic::sub),
            ("MUL", arithmetic::mul),
            ("DIV", arithmetic::div),
            ("INC", arithmetic::inc),
            ("DEC", arithmetic::dec),
            ("CMP", arithmetic::cmp),
            ("AND", bitwise::and),
            ("OR", bitwise::or),
            ("XOR", bitwise::xor),
            ("NOT", bitwise::not),
            ("SHL", bitwise::shl),
            ("SHR", bitwise::shr),
            ("JMP", jumps::jmp),
            ("JZ", jumps::jz),
            ("JEQ", jumps::jz),
            ("JNE", jumps::jnz),
            ("JNZ", jumps::jnz),
            ("JL", jumps::jl),
            ("JG", jumps::jg),
            ("JGE", jumps::jge),
            ("JLE", jumps::jle),
            ("PUSH", stack::push_op),
            ("POP", stack::pop_op),
            ("CALL", stack::call),
            ("RET", stack::ret),
            ("NOP", control::nop),
            ("HALT", control::halt),
        ];
        let mut set = Self::empty();
        for (name, handler) in table {
            set.register(name, handler);
        }
        set
    }

    /// Adds or replaces a handler. Returns the handler it replaced.
    pub fn register(&mut self, name: &str, handler: Handler) -> Option<Handler> {
        self.handlers.insert(name.to_uppercase(), handler)
    }

    /// Handler for a mnemonic, matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownInstruction`] when nothing is registered.
    pub fn lookup(&self, name: &str) -> Result<Handler, Fault> {
        self.handlers
            .get(&name.to_uppercase())
            .copied()
            .ok_or_else(|| Fault::UnknownInstruction(name.to_owned()))
    }

    /// Returns `true` when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(&name.to_uppercase())
    }

    /// Registered mnemonics in registration order.
    pub fn mnemonics(&self) -> impl Iterator<Item = &str> + '_ {
        self.handlers.keys().map(String::as_str)
    }

    /// Number of registered mnemonics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::InstructionSet;
    use crate::program::{Instruction, Operands};
    use crate::{CoreConfig, Fault, Processor};

    #[test]
    fn basic_set_covers_every_family() {
        let set = InstructionSet::basic();
        for name in ["mov", "DB", "add", "CMP", "not", "JLE", "push", "CALL", "ret", "nop", "HALT"] {
            assert!(set.contains(name), "{name} missing");
        }
        assert_eq!(set.len(), 30);
        assert_eq!(set.mnemonics().next(), Some("MOV"));
    }

    #[test]
    fn unknown_mnemonics_are_reported_verbatim() {
        let set = InstructionSet::basic();
        assert_eq!(
            set.lookup("Frob").map(|_| ()),
            Err(Fault::UnknownInstruction("Frob".into()))
        );
        assert!(InstructionSet::empty().is_empty());
    }

    #[test]
    fn custom_handlers_extend_the_set() {
        fn clear_r0(cpu: &mut Processor, _: &Operands) -> Result<(), Fault> {
            cpu.set_register("r0", 0)
        }

        let mut cpu = Processor::new(&CoreConfig::default()).expect("default config");
        cpu.set_register("r0", 9).expect("r0");
        assert!(cpu.instruction_set_mut().register("clr", clear_r0).is_none());
        cpu.execute(&Instruction::bare("CLR")).expect("executes");
        assert_eq!(cpu.register("r0"), Ok(0));
    }
}
