#![no_main]

use libfuzzer_sys::fuzz_target;
use xsim_core::{CoreConfig, Instruction, InstructionSet, Operand, Operands, Processor};

const REGISTERS: [&str; 6] = ["r0", "r1", "r2", "sp", "sreg", "pc"];

fn operand(bytes: &[u8]) -> Operand {
    let &[tag, a, b] = bytes else {
        return Operand::constant(0);
    };
    let value = u64::from(u16::from_be_bytes([a, b]));
    let register = || Operand::register(REGISTERS[usize::from(a) % REGISTERS.len()]);
    match tag % 4 {
        0 => Operand::constant(value),
        1 => register(),
        2 => Operand::address(Operand::constant(value)),
        _ => Operand::address(register()),
    }
}

fuzz_target!(|data: &[u8]| {
    let mnemonics: Vec<String> = InstructionSet::basic()
        .mnemonics()
        .map(str::to_owned)
        .collect();

    let program: Vec<Instruction> = data
        .chunks_exact(7)
        .map(|chunk| {
            let name = &mnemonics[usize::from(chunk[0]) % mnemonics.len()];
            let operands = Operands::none()
                .with_destination(operand(&chunk[1..4]))
                .with_source(operand(&chunk[4..7]));
            Instruction::new(name.as_str(), operands)
        })
        .collect();

    let Ok(mut cpu) = Processor::new(&CoreConfig::default()) else {
        return;
    };
    if cpu.load_program(program).is_err() {
        return;
    }
    let _ = cpu.run_steps(256);
});
