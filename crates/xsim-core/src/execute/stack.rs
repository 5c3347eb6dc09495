//! Downward-growing stack: `PUSH`, `POP`, `CALL` and `RET`.

use super::helpers::{pop, push, required_size, resolve, POINTER_WIDTH};
use crate::processor::Processor;
use crate::program::{Operand, Operands, Role};
use crate::Fault;

pub(super) fn push_op(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    let source = operands.source.as_ref().or(operands.destination.as_ref());
    let source = source.ok_or(Fault::MissingOperand(Role::Source))?;
    let width = required_size(cpu, source)?;
    let value = resolve(cpu, source, Role::Source, width)?;
    push(cpu, value)
}

pub(super) fn pop_op(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    match operands.require(Role::Destination)? {
        Operand::Register(name) => {
            let value = pop(cpu)?;
            cpu.set_register(name, value)
        }
        operand => Err(Fault::InvalidOperand {
            role: Role::Destination,
            kind: operand.kind(),
        }),
    }
}

pub(super) fn call(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    let target = resolve(cpu, operands.target()?, Role::Address, POINTER_WIDTH)?;
    let return_address = cpu.program_counter()?;
    push(cpu, return_address)?;
    cpu.set_program_counter(target)
}

pub(super) fn ret(cpu: &mut Processor, _operands: &Operands) -> Result<(), Fault> {
    let return_address = pop(cpu)?;
    cpu.set_program_counter(return_address)
}
