//! Text display over a video buffer.

use std::cell::Cell;
use std::rc::Rc;

use crate::memory::{HookId, Memory, SpaceId};
use crate::Fault;

/// Byte every cell holds after attaching.
pub const BLANK: u8 = b' ';

/// Placement and geometry of a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisplayConfig {
    /// Offset of the video buffer inside the parent space.
    pub address: usize,
    /// Columns per row.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl DisplayConfig {
    /// Bytes of video memory the display occupies, `None` when the
    /// geometry overflows `usize`.
    #[must_use]
    pub const fn size(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }
}

/// A character grid rendered from a byte-wide view of memory.
#[derive(Debug, Clone)]
pub struct Display {
    space: SpaceId,
    config: DisplayConfig,
    dirty: Rc<Cell<bool>>,
    hook: HookId,
}

impl Display {
    /// Carves the video buffer out of `parent`, blanks it and starts watching writes.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::AddressOutOfRange`] when the buffer does not fit in
    /// `parent`, including geometries whose size overflows.
    pub fn attach(memory: &mut Memory, parent: SpaceId, config: DisplayConfig) -> Result<Self, Fault> {
        let Some(size) = config.size() else {
            return Err(Fault::AddressOutOfRange {
                address: config.address,
                size: usize::MAX,
                space_size: memory.size(parent)?,
            });
        };
        let space = memory.view(parent, config.address, size, Some(1))?;
        for cell in 0..size {
            memory.write(space, cell, u64::from(BLANK), 1)?;
        }

        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        let hook = memory.on_write(space, move |_, _| flag.set(true))?;
        tracing::debug!(
            address = config.address,
            width = config.width,
            height = config.height,
            "attached display"
        );
        Ok(Self {
            space,
            config,
            dirty,
            hook,
        })
    }

    /// View holding the video buffer.
    #[must_use]
    pub const fn space(&self) -> SpaceId {
        self.space
    }

    /// Geometry the display was attached with.
    #[must_use]
    pub const fn config(&self) -> DisplayConfig {
        self.config
    }

    /// Hook that marks the display dirty.
    #[must_use]
    pub const fn hook(&self) -> HookId {
        self.hook
    }

    /// Returns whether the buffer was written since the last call, and clears the mark.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    /// Rows of text, one per display line.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownSpace`] when `memory` is not the arena the
    /// display was attached to.
    pub fn rows(&self, memory: &Memory) -> Result<Vec<String>, Fault> {
        let bytes = memory.bytes(self.space)?;
        Ok(bytes
            .chunks(self.config.width.max(1))
            .map(|row| String::from_utf8_lossy(row).into_owned())
            .collect())
    }

    /// Renders the grid inside a frame: `/---\`, `|row|` lines, `\---/`.
    ///
    /// # Errors
    ///
    /// Same as [`Display::rows`].
    pub fn render(&self, memory: &Memory) -> Result<String, Fault> {
        let border = "-".repeat(self.config.width);
        let mut lines = Vec::with_capacity(self.config.height + 2);
        lines.push(format!("/{border}\\"));
        lines.extend(self.rows(memory)?.into_iter().map(|row| format!("|{row}|")));
        lines.push(format!("\\{border}/"));
        Ok(lines.join("\n"))
    }
}
