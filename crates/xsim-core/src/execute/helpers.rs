//! Operand resolution and write-back shared by the instruction handlers.

use crate::processor::Processor;
use crate::program::{Operand, OperandKind, Role};
use crate::Fault;

/// Width of a memory pointer on this architecture.
pub const POINTER_WIDTH: usize = 2;
/// Word mask applied to arithmetic and bitwise results.
pub const WORD_MASK: u64 = 0xFFFF;

/// Number of bytes an operand occupies when used as a destination.
///
/// Addresses are pointer-wide, registers use their configured width, and
/// everything else is a single byte.
///
/// # Errors
///
/// Returns [`Fault::UnknownRegister`] for an unconfigured register name.
pub fn required_size(cpu: &Processor, operand: &Operand) -> Result<usize, Fault> {
    match operand {
        Operand::Address(_) => Ok(POINTER_WIDTH),
        Operand::Register(name) => Ok(cpu.registers().require(name)?.size()),
        Operand::Const(_) | Operand::String(_) => Ok(1),
    }
}

/// Converts a computed value into a main-memory address.
///
/// Values that do not fit `usize` map to `usize::MAX`, which every space
/// rejects as out of range.
#[must_use]
pub fn to_address(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Resolves an operand to a value.
///
/// `size` is the width read through an [`Operand::Address`]; its inner
/// operand is resolved at its own required size first.
///
/// # Errors
///
/// Returns [`Fault::InvalidOperand`] for a string operand and propagates
/// register and memory faults.
pub fn resolve(cpu: &mut Processor, operand: &Operand, role: Role, size: usize) -> Result<u64, Fault> {
    match operand {
        Operand::Const(value) => Ok(*value),
        Operand::Register(name) => cpu.register(name),
        Operand::Address(inner) => {
            let address = effective_address(cpu, inner, role)?;
            cpu.read_memory(address, size)
        }
        Operand::String(_) => Err(Fault::InvalidOperand {
            role,
            kind: OperandKind::String,
        }),
    }
}

/// Resolves the operand in `role`, failing when it is absent.
///
/// # Errors
///
/// Returns [`Fault::MissingOperand`] and anything [`resolve`] returns.
pub fn resolve_role(
    cpu: &mut Processor,
    operands: &crate::program::Operands,
    role: Role,
    size: usize,
) -> Result<u64, Fault> {
    let operand = operands.require(role)?;
    resolve(cpu, operand, role, size)
}

/// Resolves the inner operand of an [`Operand::Address`] to a main-memory address.
///
/// # Errors
///
/// Propagates faults from [`resolve`].
pub fn effective_address(cpu: &mut Processor, inner: &Operand, role: Role) -> Result<usize, Fault> {
    let width = required_size(cpu, inner)?;
    resolve(cpu, inner, role, width).map(to_address)
}

/// Writes `value` to a register or memory destination.
///
/// # Errors
///
/// Returns [`Fault::InvalidOperand`] for constant and string destinations
/// and propagates register and memory faults.
pub fn store(cpu: &mut Processor, operand: &Operand, role: Role, value: u64, size: usize) -> Result<(), Fault> {
    match operand {
        Operand::Register(name) => cpu.set_register(name, value),
        Operand::Address(inner) => {
            let address = effective_address(cpu, inner, role)?;
            cpu.write_memory(address, value, size)
        }
        Operand::Const(_) | Operand::String(_) => Err(Fault::InvalidOperand {
            role,
            kind: operand.kind(),
        }),
    }
}

/// Pushes a pointer-wide value: decrements the stack pointer, then writes.
///
/// # Errors
///
/// Propagates register and memory faults; stack exhaustion surfaces as
/// [`Fault::AddressOutOfRange`].
pub fn push(cpu: &mut Processor, value: u64) -> Result<(), Fault> {
    let sp = cpu.stack_pointer()?;
    cpu.set_stack_pointer(sp.wrapping_sub(POINTER_WIDTH as u64))?;
    let sp = cpu.stack_pointer()?;
    cpu.write_memory(to_address(sp), value, POINTER_WIDTH)
}

/// Pops a pointer-wide value: reads at the stack pointer, then increments it.
///
/// # Errors
///
/// Propagates register and memory faults.
pub fn pop(cpu: &mut Processor) -> Result<u64, Fault> {
    let sp = cpu.stack_pointer()?;
    let value = cpu.read_memory(to_address(sp), POINTER_WIDTH)?;
    cpu.set_stack_pointer(sp.wrapping_add(POINTER_WIDTH as u64))?;
    Ok(value)
}
