//! Memory-mapped peripherals attached to views through hooks.
//!
//! The processor knows nothing about them: each peripheral carves a view out
//! of main memory and reacts to the reads and writes that reach it.

/// Character display backed by a video buffer.
pub mod display;
/// Single-port keyboard with a ring buffer.
pub mod keyboard;

pub use display::{Display, DisplayConfig};
pub use keyboard::{KeyBuffer, Keyboard, KeyboardConfig};
