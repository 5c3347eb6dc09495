//! Keyboard exposed through a single byte-wide port.
//!
//! Key presses land in a ring buffer. Every read of the port delivers the byte
//! under the read cursor and moves the cursor on, wrapping at the end of the
//! buffer.

use std::cell::RefCell;
use std::rc::Rc;

use crate::memory::{HookId, Memory, SpaceId};
use crate::Fault;

/// Byte a fresh buffer is filled with.
pub const EMPTY_KEY: u8 = 0x20;

/// Placement of a keyboard port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct KeyboardConfig {
    /// Offset of the port inside the parent space.
    pub address: usize,
    /// Ring buffer capacity in bytes.
    pub buffer_size: usize,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            address: 0,
            buffer_size: 10,
        }
    }
}

/// Ring buffer of pressed keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuffer {
    bytes: Vec<u8>,
    cursor: Option<usize>,
    read_cursor: Option<usize>,
}

impl KeyBuffer {
    /// Buffer of `size` slots (at least one), all [`EMPTY_KEY`].
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![EMPTY_KEY; size.max(1)],
            cursor: None,
            read_cursor: None,
        }
    }

    /// Stores a key. Returns `true` for the first key, which primes reading.
    pub fn push(&mut self, key: u8) -> bool {
        let slot = self.cursor.map_or(0, |cursor| (cursor + 1) % self.bytes.len());
        self.bytes[slot] = key;
        self.cursor = Some(slot);
        if self.read_cursor.is_none() {
            self.read_cursor = Some(slot);
            return true;
        }
        false
    }

    /// Byte under the read cursor, advancing the cursor. `None` before any key.
    pub fn next_byte(&mut self) -> Option<u8> {
        let current = self.read_cursor?;
        self.read_cursor = Some((current + 1) % self.bytes.len());
        Some(self.bytes[current])
    }

    /// Raw slots in buffer order.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.bytes
    }

    /// Slots as text, for previews.
    #[must_use]
    pub fn preview(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// A keyboard attached to a byte-wide port view.
#[derive(Debug, Clone)]
pub struct Keyboard {
    port: SpaceId,
    buffer: Rc<RefCell<KeyBuffer>>,
    hook: HookId,
}

impl Keyboard {
    /// Carves the one-byte port out of `parent` and starts serving reads.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::AddressOutOfRange`] when the port does not fit in `parent`.
    pub fn attach(memory: &mut Memory, parent: SpaceId, config: KeyboardConfig) -> Result<Self, Fault> {
        let port = memory.view(parent, config.address, 1, Some(1))?;
        let buffer = Rc::new(RefCell::new(KeyBuffer::new(config.buffer_size)));

        let keys = Rc::clone(&buffer);
        let hook = memory.on_read(port, move |memory, event| {
            let next = keys.borrow_mut().next_byte();
            if let Some(key) = next {
                if let Err(fault) = memory.write(event.space, 0, u64::from(key), 1) {
                    tracing::warn!(%fault, "keyboard port refresh failed");
                }
            }
        })?;
        tracing::debug!(
            address = config.address,
            buffer_size = config.buffer_size,
            "attached keyboard"
        );
        Ok(Self { port, buffer, hook })
    }

    /// View holding the port byte.
    #[must_use]
    pub const fn port(&self) -> SpaceId {
        self.port
    }

    /// Hook serving port reads.
    #[must_use]
    pub const fn hook(&self) -> HookId {
        self.hook
    }

    /// Stores a key press; the first press also loads the port.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownSpace`] when `memory` is not the arena the
    /// keyboard was attached to.
    pub fn press(&self, memory: &mut Memory, key: u8) -> Result<(), Fault> {
        let primed = self.buffer.borrow_mut().push(key);
        if primed {
            memory.write(self.port, 0, u64::from(key), 1)?;
        }
        Ok(())
    }

    /// Snapshot of the ring buffer.
    #[must_use]
    pub fn buffer(&self) -> KeyBuffer {
        self.buffer.borrow().clone()
    }
}
