//! Programs driving the memory-mapped display and keyboard.

#![allow(clippy::pedantic, clippy::nursery)]

use indexmap as _;
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;
use tracing_test::traced_test;
use xsim_core::{
    CoreConfig, Display, DisplayConfig, Instruction, Keyboard, KeyboardConfig, Operand, Operands,
    Processor, StepOutcome,
};

const KEYBOARD_PORT: u64 = 0x100;
const VIDEO: u64 = 0x180;

fn op(name: &str, destination: Operand, source: Operand) -> Instruction {
    Instruction::new(
        name,
        Operands::none()
            .with_destination(destination)
            .with_source(source),
    )
}

fn wired() -> (Processor, Display, Keyboard) {
    let mut cpu = Processor::new(&CoreConfig::default()).unwrap();
    let main = cpu.main_memory();
    let display = Display::attach(
        cpu.memory_mut(),
        main,
        DisplayConfig {
            address: VIDEO as usize,
            width: 4,
            height: 2,
        },
    )
    .unwrap();
    let keyboard = Keyboard::attach(
        cpu.memory_mut(),
        main,
        KeyboardConfig {
            address: KEYBOARD_PORT as usize,
            buffer_size: 4,
        },
    )
    .unwrap();
    (cpu, display, keyboard)
}

/// Echoes `count` keys from the keyboard port onto the first display row.
fn echo(count: usize) -> Vec<Instruction> {
    let mut program = vec![op("MOV", Operand::register("r1"), Operand::constant(VIDEO))];
    for _ in 0..count {
        program.push(op(
            "MOV",
            Operand::register("r0"),
            Operand::address(Operand::constant(KEYBOARD_PORT)),
        ));
        program.push(op(
            "MOV",
            Operand::address(Operand::register("r1")),
            Operand::register("r0"),
        ));
        program.push(Instruction::new(
            "INC",
            Operands::none().with_destination(Operand::register("r1")),
        ));
    }
    program.push(Instruction::bare("HALT"));
    program
}

#[test]
fn db_string_lands_on_the_display() {
    let (mut cpu, display, _) = wired();
    assert!(display.take_dirty());

    cpu.load_program(vec![
        Instruction::new(
            "DB",
            Operands::none()
                .with_destination(Operand::constant(VIDEO + 4))
                .with_source(Operand::string("ok")),
        ),
        Instruction::bare("HALT"),
    ])
    .unwrap();
    assert_eq!(cpu.run().unwrap().final_step, StepOutcome::Halted);

    assert!(display.take_dirty());
    assert!(!display.take_dirty());
    assert_eq!(display.rows(cpu.memory()).unwrap(), vec!["    ", "ok  "]);
    assert_eq!(
        display.render(cpu.memory()).unwrap(),
        "/----\\\n|    |\n|ok  |\n\\----/"
    );
}

#[rstest]
#[case(b"ab", "ab  ")]
#[case(b"xyz", "xyz ")]
fn keys_are_echoed_in_press_order(#[case] keys: &[u8], #[case] row: &str) {
    let (mut cpu, display, keyboard) = wired();
    for key in keys {
        keyboard.press(cpu.memory_mut(), *key).unwrap();
    }

    cpu.load_program(echo(keys.len())).unwrap();
    cpu.run().unwrap();

    assert_eq!(display.rows(cpu.memory()).unwrap()[0], row);
}

#[test]
fn wide_register_writes_reach_the_display_one_byte_at_a_time() {
    let (mut cpu, display, _) = wired();
    cpu.load_program(vec![
        op("MOV", Operand::register("r0"), Operand::constant(0x4142)),
        op(
            "MOV",
            Operand::address(Operand::constant(VIDEO)),
            Operand::register("r0"),
        ),
    ])
    .unwrap();
    cpu.run().unwrap();

    // Video memory is byte-wide, so only the low byte of the word lands.
    let main = cpu.main_memory();
    assert_eq!(cpu.memory().effective_width(main, VIDEO as usize, 2), Ok(1));
    assert_eq!(display.rows(cpu.memory()).unwrap()[0], "B   ");
}

#[traced_test]
#[test]
fn attaching_peripherals_is_logged() {
    let _ = wired();
    assert!(logs_contain("attached display"));
    assert!(logs_contain("attached keyboard"));
}
