//! Data movement: `MOV` and the `DB` data definition.

use super::helpers::{effective_address, required_size, resolve, resolve_role, store, to_address};
use crate::processor::Processor;
use crate::program::{Operand, Operands, Role};
use crate::Fault;

pub(super) fn mov(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    let destination = operands.require(Role::Destination)?;
    let width = required_size(cpu, destination)?;
    let value = resolve_role(cpu, operands, Role::Source, width)?;
    store(cpu, destination, Role::Destination, value, width)
}

pub(super) fn db(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    let address = match operands.require(Role::Destination)? {
        Operand::Address(inner) => effective_address(cpu, inner, Role::Destination)?,
        operand => to_address(resolve(cpu, operand, Role::Destination, 1)?),
    };

    match operands.require(Role::Source)? {
        Operand::Const(value) => cpu.write_memory(address, *value, 1),
        Operand::String(text) => {
            for (offset, byte) in text.bytes().enumerate() {
                cpu.write_memory(address.saturating_add(offset), u64::from(byte), 1)?;
            }
            Ok(())
        }
        operand => Err(Fault::InvalidOperand {
            role: Role::Source,
            kind: operand.kind(),
        }),
    }
}
