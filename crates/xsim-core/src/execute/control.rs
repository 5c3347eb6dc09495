//! `NOP` and `HALT`.

use crate::processor::Processor;
use crate::program::Operands;
use crate::Fault;

pub(super) fn nop(_cpu: &mut Processor, _operands: &Operands) -> Result<(), Fault> {
    Ok(())
}

pub(super) fn halt(cpu: &mut Processor, _operands: &Operands) -> Result<(), Fault> {
    cpu.halt();
    Ok(())
}
