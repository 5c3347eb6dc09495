//! `ADD`, `SUB`, `MUL`, `DIV`, `INC`, `DEC` and `CMP`.
//!
//! Operands are read as 16-bit values and combined in `i64`, so the flags see
//! the unmasked result. Every configured flag is recomputed; the masked result
//! is stored unless the instruction only compares.

use super::flags::{mask, ArithmeticFlags};
use super::helpers::{resolve, resolve_role, store, to_address, POINTER_WIDTH, WORD_MASK};
use crate::processor::Processor;
use crate::program::{Operand, Operands, Role};
use crate::Fault;

type BinaryOp = fn(i64, i64) -> Result<i64, Fault>;

fn binary(cpu: &mut Processor, operands: &Operands, op: BinaryOp, write_back: bool) -> Result<(), Fault> {
    let source = match &operands.source {
        Some(operand) => resolve(cpu, operand, Role::Source, POINTER_WIDTH)?,
        None => 0,
    };
    let destination = resolve_role(cpu, operands, Role::Destination, POINTER_WIDTH)?;
    let result = op(word(destination), word(source))?;
    commit(cpu, operands, result, write_back)
}

fn unary(cpu: &mut Processor, operands: &Operands, delta: i64) -> Result<(), Fault> {
    let destination = resolve_role(cpu, operands, Role::Destination, POINTER_WIDTH)?;
    commit(cpu, operands, word(destination) + delta, true)
}

const fn word(value: u64) -> i64 {
    (value & WORD_MASK) as i64
}

fn commit(cpu: &mut Processor, operands: &Operands, result: i64, write_back: bool) -> Result<(), Fault> {
    cpu.update_flags(&ArithmeticFlags::from_result(result).seated())?;
    if !write_back {
        return Ok(());
    }

    let value = mask(result);
    match operands.require(Role::Destination)? {
        // A bare constant destination names a single memory cell.
        Operand::Const(address) => cpu.write_memory(to_address(*address), value, 1),
        operand => store(cpu, operand, Role::Destination, value, POINTER_WIDTH),
    }
}

pub(super) fn add(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    binary(cpu, operands, |d, s| Ok(d + s), true)
}

pub(super) fn sub(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    binary(cpu, operands, |d, s| Ok(d - s), true)
}

pub(super) fn mul(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    binary(cpu, operands, |d, s| Ok(d * s), true)
}

pub(super) fn div(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    binary(
        cpu,
        operands,
        |d, s| d.checked_div(s).ok_or(Fault::DivisionByZero),
        true,
    )
}

pub(super) fn cmp(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    binary(cpu, operands, |d, s| Ok(d - s), false)
}

pub(super) fn inc(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    unary(cpu, operands, 1)
}

pub(super) fn dec(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    unary(cpu, operands, -1)
}
