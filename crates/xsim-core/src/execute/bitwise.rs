//! `AND`, `OR`, `XOR`, `NOT`, `SHL` and `SHR`. None of these touch the flags.

use super::helpers::{resolve_role, store, POINTER_WIDTH, WORD_MASK};
use crate::processor::Processor;
use crate::program::{Operands, Role};
use crate::Fault;

fn apply(cpu: &mut Processor, operands: &Operands, op: fn(u64, u64) -> u64) -> Result<(), Fault> {
    let source = resolve_role(cpu, operands, Role::Source, POINTER_WIDTH)? & WORD_MASK;
    let destination = resolve_role(cpu, operands, Role::Destination, POINTER_WIDTH)? & WORD_MASK;
    let result = op(destination, source) & WORD_MASK;
    store(
        cpu,
        operands.require(Role::Destination)?,
        Role::Destination,
        result,
        POINTER_WIDTH,
    )
}

/// Shift amounts of 16 or more clear the word.
fn shift(amount: u64) -> Option<u32> {
    u32::try_from(amount).ok().filter(|amount| *amount < 16)
}

pub(super) fn and(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    apply(cpu, operands, |d, s| d & s)
}

pub(super) fn or(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    apply(cpu, operands, |d, s| d | s)
}

pub(super) fn xor(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    apply(cpu, operands, |d, s| d ^ s)
}

pub(super) fn not(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    apply(cpu, operands, |_, s| !s)
}

pub(super) fn shl(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    apply(cpu, operands, |d, s| shift(d).map_or(0, |d| s << d))
}

pub(super) fn shr(cpu: &mut Processor, operands: &Operands) -> Result<(), Fault> {
    apply(cpu, operands, |d, s| shift(d).map_or(0, |d| s >> d))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::program::{Instruction, Operand, OperandKind, Operands, Role};
    use crate::{CoreConfig, Fault, Processor};

    fn run(name: &str, destination: u64, source: u64) -> u64 {
        let mut cpu = Processor::new(&CoreConfig::default()).expect("default config");
        cpu.set_register("r0", destination).expect("r0");
        let instruction = Instruction::new(
            name,
            Operands::none()
                .with_destination(Operand::register("r0"))
                .with_source(Operand::constant(source)),
        );
        cpu.execute(&instruction).expect("executes");
        cpu.register("r0").expect("r0")
    }

    #[rstest]
    #[case("AND", 0b1100, 0b1010, 0b1000)]
    #[case("OR", 0b1100, 0b1010, 0b1110)]
    #[case("XOR", 0b1100, 0b1010, 0b0110)]
    #[case("NOT", 0x1234, 0x00FF, 0xFF00)]
    #[case("SHL", 1, 0x8001, 0x0002)]
    #[case("SHR", 15, 0x8000, 0x0001)]
    #[case("SHL", 2, 3, 12)]
    #[case("SHR", 1, 8, 4)]
    #[case("SHL", 16, 0x0001, 0)]
    #[case("SHR", 99, 0xFFFF, 0)]
    fn bitwise_results_are_sixteen_bit(
        #[case] name: &str,
        #[case] destination: u64,
        #[case] source: u64,
        #[case] expected: u64,
    ) {
        assert_eq!(run(name, destination, source), expected);
    }

    #[test]
    fn flags_are_left_alone() {
        let mut cpu = Processor::new(&CoreConfig::default()).expect("default config");
        cpu.set_register("sreg", 0xA5).expect("sreg");
        let xor = Instruction::new(
            "XOR",
            Operands::none()
                .with_destination(Operand::register("r3"))
                .with_source(Operand::register("r3")),
        );
        cpu.execute(&xor).expect("executes");
        assert_eq!(cpu.register("r3"), Ok(0));
        assert_eq!(cpu.register("sreg"), Ok(0xA5));
    }

    #[test]
    fn shifts_move_the_source_by_the_destination_register() {
        let mut cpu = Processor::new(&CoreConfig::default()).expect("default config");
        cpu.set_register("r0", 2).expect("r0");
        cpu.set_register("r1", 3).expect("r1");
        let shl = Instruction::new(
            "SHL",
            Operands::none()
                .with_destination(Operand::register("r0"))
                .with_source(Operand::register("r1")),
        );
        cpu.execute(&shl).expect("executes");
        assert_eq!(cpu.register("r0"), Ok(12));
        assert_eq!(cpu.register("r1"), Ok(3));

        cpu.set_register("r0", 1).expect("r0");
        cpu.set_register("r1", 8).expect("r1");
        let shr = Instruction::new("SHR", shl.operands.clone());
        cpu.execute(&shr).expect("executes");
        assert_eq!(cpu.register("r0"), Ok(4));
    }

    #[test]
    fn constant_destination_is_rejected() {
        let mut cpu = Processor::new(&CoreConfig::default()).expect("default config");
        let and = Instruction::new(
            "AND",
            Operands::none()
                .with_destination(Operand::constant(4))
                .with_source(Operand::constant(1)),
        );
        assert_eq!(
            cpu.execute(&and),
            Err(Fault::InvalidOperand {
                role: Role::Destination,
                kind: OperandKind::Const
            })
        );
    }

    #[test]
    fn memory_destination_writes_a_word() {
        let mut cpu = Processor::new(&CoreConfig::default()).expect("default config");
        let main = cpu.main_memory();
        cpu.memory_mut().write(main, 0x40, 0x0F0F, 2).expect("in range");
        cpu.set_register("r1", 0x40).expect("r1");
        let or = Instruction::new(
            "OR",
            Operands::none()
                .with_destination(Operand::address(Operand::register("r1")))
                .with_source(Operand::constant(0xF000)),
        );
        cpu.execute(&or).expect("executes");
        assert_eq!(cpu.memory().peek(main, 0x40, 2), Ok(0xFF0F));
    }
}
