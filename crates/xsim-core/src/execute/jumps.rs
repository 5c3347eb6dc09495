//! Unconditional and flag-conditional jumps.

use super::helpers::{resolve, POINTER_WIDTH};
use crate::processor::Processor;
use crate::program::{Operands, Role};
use crate::Fault;

fn jump_if(cpu: &mut Processor, operands: &Operands, taken: bool) -> Result<(), Fault> {
    if !taken {
        return Ok(());
    }
    let target = resolve(cpu, operands.target()?, Role::Address, POINTER_WIDTH)?;
    cpu.set_program_counter(target)
}

struct Condition {
    zero: bool,
    sign: bool,
}

fn condition(cpu: &mut Processor) -> Result<Condition, Fault> {
    Ok(Condition {
        zero: cpu.flag("Z")?,
        sign: cpu.flag("S")?,
    })
}

pub(super) fn jmp(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    jump_if(cpu, operands, true)
}

pub(super) fn jz(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    let taken = condition(cpu)?.zero;
    jump_if(cpu, operands, taken)
}

pub(super) fn jnz(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    let taken = !condition(cpu)?.zero;
    jump_if(cpu, operands, taken)
}

pub(super) fn jl(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    let taken = condition(cpu)?.sign;
    jump_if(cpu, operands, taken)
}

pub(super) fn jg(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    let Condition { zero, sign } = condition(cpu)?;
    jump_if(cpu, operands, !zero && !sign)
}

pub(super) fn jge(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    let taken = !condition(cpu)?.sign;
    jump_if(cpu, operands, taken)
}

pub(super) fn jle(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    let Condition { zero, sign } = condition(cpu)?;
    jump_if(cpu, operands, zero || sign)
}
