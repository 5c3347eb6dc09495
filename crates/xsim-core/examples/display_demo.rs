//! Runs a short program that greets on the display and echoes two key presses.

#![allow(clippy::cast_possible_truncation)]

use indexmap as _;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;
use tracing_test as _;
use xsim_core::{
    CoreConfig, Display, DisplayConfig, Instruction, Keyboard, KeyboardConfig, Operand, Operands,
    Processor,
};

const VIDEO: u64 = 0x400;
const KEYBOARD: u64 = 0x3F0;

fn instruction(name: &str, destination: Operand, source: Operand) -> Instruction {
    Instruction::new(
        name,
        Operands::none()
            .with_destination(destination)
            .with_source(source),
    )
}

fn program() -> Vec<Instruction> {
    let key = || Operand::address(Operand::constant(KEYBOARD));
    vec![
        instruction("DB", Operand::constant(VIDEO), Operand::string("Hello, world!")),
        instruction("MOV", Operand::register("r0"), key()),
        instruction("DB", Operand::constant(VIDEO + 16), Operand::string(">")),
        instruction(
            "MOV",
            Operand::address(Operand::constant(VIDEO + 17)),
            Operand::register("r0"),
        ),
        instruction("MOV", Operand::register("r0"), key()),
        instruction(
            "MOV",
            Operand::address(Operand::constant(VIDEO + 18)),
            Operand::register("r0"),
        ),
        Instruction::bare("HALT"),
    ]
}

fn main() {
    let mut cpu = Processor::new(&CoreConfig::basic(4096)).expect("basic layout is valid");
    let main = cpu.main_memory();
    let display = Display::attach(
        cpu.memory_mut(),
        main,
        DisplayConfig {
            address: VIDEO as usize,
            width: 16,
            height: 4,
        },
    )
    .expect("display fits in main memory");
    let keyboard = Keyboard::attach(
        cpu.memory_mut(),
        main,
        KeyboardConfig {
            address: KEYBOARD as usize,
            buffer_size: 10,
        },
    )
    .expect("keyboard fits in main memory");

    for key in *b"hi" {
        keyboard.press(cpu.memory_mut(), key).expect("same arena");
    }

    cpu.load_program(program()).expect("program counter is writable");
    let outcome = cpu.run().expect("demo program runs");

    println!("{}", display.render(cpu.memory()).expect("same arena"));
    println!(
        "steps={} final={:?} keys={:?}",
        outcome.steps,
        outcome.final_step,
        keyboard.buffer().preview()
    );
}
