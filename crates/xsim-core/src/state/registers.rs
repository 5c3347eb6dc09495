//! Named registers placed over memory.
//!
//! Registers are assigned to the mapped window of main memory in
//! specification order. The first register that no longer fits starts a run
//! that lives, in the same order, in a private buffer sized to that run.

use std::fmt;
use std::ops::Range;

use indexmap::IndexMap;

use crate::memory::{Memory, SpaceId};
use crate::Fault;

/// Declaration of one register.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterSpec {
    /// Register name, matched case-insensitively.
    pub name: String,
    /// Width in bytes.
    pub size: usize,
    /// Value stored right after placement.
    #[cfg_attr(feature = "serde", serde(default))]
    pub default: Option<u64>,
}

impl RegisterSpec {
    /// Declares a register with no default value.
    #[must_use]
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            default: None,
        }
    }

    /// Sets the value stored right after placement.
    #[must_use]
    pub const fn with_default(mut self, value: u64) -> Self {
        self.default = Some(value);
        self
    }
}

/// A placed register: a view of exactly `size` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    name: String,
    size: usize,
    space: SpaceId,
    mapped_offset: Option<usize>,
}

impl Register {
    /// Lower-cased register name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Space backing the register.
    #[must_use]
    pub const fn space(&self) -> SpaceId {
        self.space
    }

    /// Offset inside the mapped window, `None` for privately stored registers.
    #[must_use]
    pub const fn mapped_offset(&self) -> Option<usize> {
        self.mapped_offset
    }

    /// Reads the full width, firing read hooks.
    ///
    /// # Errors
    ///
    /// Propagates memory faults from the backing space.
    pub fn get(&self, memory: &mut Memory) -> Result<u64, Fault> {
        memory.read(self.space, 0, self.size)
    }

    /// Writes the full width (truncating `value`), firing write hooks.
    ///
    /// # Errors
    ///
    /// Propagates memory faults from the backing space.
    pub fn set(&self, memory: &mut Memory, value: u64) -> Result<(), Fault> {
        memory.write(self.space, 0, value, self.size)
    }

    /// Reads the full width without hooks.
    ///
    /// # Errors
    ///
    /// Propagates memory faults from the backing space.
    pub fn peek(&self, memory: &Memory) -> Result<u64, Fault> {
        memory.peek(self.space, 0, self.size)
    }
}

/// Register lookup key: a name or an offset inside the mapped window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterKey<'a> {
    /// Case-insensitive register name.
    Name(&'a str),
    /// Start offset of a mapped register.
    Offset(usize),
}

impl<'a> From<&'a str> for RegisterKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for RegisterKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for RegisterKey<'_> {
    fn from(offset: usize) -> Self {
        Self::Offset(offset)
    }
}

impl fmt::Display for RegisterKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Offset(offset) => write!(f, "{offset:#06x}"),
        }
    }
}

/// Every configured register, addressable by name or mapped offset.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    registers: IndexMap<String, Register>,
    offsets: IndexMap<usize, String>,
    window: Option<SpaceId>,
    private: Option<SpaceId>,
}

impl RegisterFile {
    /// Places `specs` over `window` of `main`, spilling the rest to a private buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::DuplicateRegister`] when a name repeats (ignoring case),
    /// [`Fault::AddressOutOfRange`] when `window` escapes `main`, and
    /// [`Fault::UnsupportedWidth`] for a register wider than eight bytes or
    /// zero bytes wide.
    pub fn new(
        memory: &mut Memory,
        main: SpaceId,
        specs: &[RegisterSpec],
        window: Range<usize>,
    ) -> Result<Self, Fault> {
        let mut seen = Vec::with_capacity(specs.len());
        for spec in specs {
            crate::memory::validate_width(spec.size)?;
            let name = spec.name.to_lowercase();
            if seen.contains(&name) {
                return Err(Fault::DuplicateRegister(name));
            }
            seen.push(name);
        }

        let window = if window.is_empty() {
            None
        } else {
            Some(memory.view(main, window.start, window.len(), None)?)
        };
        let capacity = window.map_or(Ok(0), |id| memory.size(id))?;

        let mut cursor = 0;
        let split = specs
            .iter()
            .position(|spec| {
                let fits = cursor + spec.size <= capacity;
                cursor += spec.size;
                !fits
            })
            .unwrap_or(specs.len());
        let (mapped, spilled) = specs.split_at(split);

        let mut file = Self {
            registers: IndexMap::with_capacity(specs.len()),
            offsets: IndexMap::with_capacity(mapped.len()),
            window,
            private: None,
        };

        if let Some(window) = window {
            file.place(memory, window, mapped, true)?;
        }
        if !spilled.is_empty() {
            let total = spilled.iter().map(|spec| spec.size).sum();
            let private = memory.allocate(total, memory.endianness(main)?);
            file.private = Some(private);
            file.place(memory, private, spilled, false)?;
        }

        for spec in specs {
            if let Some(value) = spec.default {
                file.set(memory, spec.name.as_str(), value)?;
            }
        }

        tracing::debug!(
            mapped = file.offsets.len(),
            private = spilled.len(),
            "placed register file"
        );
        Ok(file)
    }

    fn place(
        &mut self,
        memory: &mut Memory,
        backing: SpaceId,
        specs: &[RegisterSpec],
        mapped: bool,
    ) -> Result<(), Fault> {
        let mut offset = 0;
        for spec in specs {
            let name = spec.name.to_lowercase();
            let space = memory.view(backing, offset, spec.size, None)?;
            if mapped {
                self.offsets.insert(offset, name.clone());
            }
            self.registers.insert(
                name.clone(),
                Register {
                    name,
                    size: spec.size,
                    space,
                    mapped_offset: mapped.then_some(offset),
                },
            );
            offset += spec.size;
        }
        Ok(())
    }

    /// Looks a register up by name or mapped offset.
    ///
    /// An unknown offset is reported as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownRegister`] for an unconfigured name.
    pub fn take<'k>(&self, key: impl Into<RegisterKey<'k>>) -> Result<Option<&Register>, Fault> {
        match key.into() {
            RegisterKey::Name(name) => self
                .registers
                .get(&name.to_lowercase())
                .map(Some)
                .ok_or_else(|| Fault::UnknownRegister(name.to_owned())),
            RegisterKey::Offset(offset) => Ok(self
                .offsets
                .get(&offset)
                .and_then(|name| self.registers.get(name))),
        }
    }

    /// Looks a register up, treating an unknown offset as an error too.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownRegister`] or [`Fault::UnmappedRegisterOffset`].
    pub fn require<'k>(&self, key: impl Into<RegisterKey<'k>>) -> Result<&Register, Fault> {
        let key = key.into();
        self.take(key)?.ok_or_else(|| match key {
            RegisterKey::Offset(offset) => Fault::UnmappedRegisterOffset(offset),
            RegisterKey::Name(name) => Fault::UnknownRegister(name.to_owned()),
        })
    }

    /// Reads a register, firing hooks.
    ///
    /// # Errors
    ///
    /// Fails like [`RegisterFile::require`].
    pub fn get<'k>(&self, memory: &mut Memory, key: impl Into<RegisterKey<'k>>) -> Result<u64, Fault> {
        self.require(key)?.get(memory)
    }

    /// Writes a register, firing hooks.
    ///
    /// # Errors
    ///
    /// Fails like [`RegisterFile::require`].
    pub fn set<'k>(
        &self,
        memory: &mut Memory,
        key: impl Into<RegisterKey<'k>>,
        value: u64,
    ) -> Result<(), Fault> {
        self.require(key)?.set(memory, value)
    }

    /// Reads a register without firing hooks.
    ///
    /// # Errors
    ///
    /// Fails like [`RegisterFile::require`].
    pub fn peek<'k>(&self, memory: &Memory, key: impl Into<RegisterKey<'k>>) -> Result<u64, Fault> {
        self.require(key)?.peek(memory)
    }

    /// Registers in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &Register> + '_ {
        self.registers.values()
    }

    /// Number of registers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Returns `true` when no register is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// View over the mapped window, if the window is non-empty.
    #[must_use]
    pub const fn window(&self) -> Option<SpaceId> {
        self.window
    }

    /// Root space holding the registers that did not fit the window.
    #[must_use]
    pub const fn private_space(&self) -> Option<SpaceId> {
        self.private
    }
}

#[cfg(test)]
mod tests {
    use super::{RegisterFile, RegisterKey, RegisterSpec};
    use crate::memory::{Endianness, Memory, SpaceId};
    use crate::Fault;

    fn setup(specs: &[RegisterSpec], window: std::ops::Range<usize>) -> (Memory, SpaceId, RegisterFile) {
        let mut memory = Memory::new();
        let main = memory.allocate(64, Endianness::Big);
        let file = RegisterFile::new(&mut memory, main, specs, window).expect("valid registers");
        (memory, main, file)
    }

    #[test]
    fn registers_past_the_first_overflow_are_all_private() {
        let specs = [
            RegisterSpec::new("a", 2),
            RegisterSpec::new("b", 2),
            RegisterSpec::new("c", 2),
            RegisterSpec::new("d", 1),
        ];
        let (memory, _, file) = setup(&specs, 0..5);

        let offsets: Vec<_> = file.iter().map(|reg| reg.mapped_offset()).collect();
        assert_eq!(offsets, vec![Some(0), Some(2), None, None]);
        let private = file.private_space().expect("spilled registers");
        assert_eq!(memory.size(private), Ok(3));
        let names: Vec<_> = file.iter().map(|reg| reg.name().to_owned()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn mapped_registers_alias_main_memory() {
        let specs = [RegisterSpec::new("r0", 2), RegisterSpec::new("r1", 2)];
        let (mut memory, main, file) = setup(&specs, 4..8);

        file.set(&mut memory, "r1", 0xBEEF).expect("known register");
        assert_eq!(memory.read(main, 6, 2), Ok(0xBEEF));

        memory.write(main, 4, 0x0102, 2).expect("in range");
        assert_eq!(file.get(&mut memory, "R0"), Ok(0x0102));
        assert_eq!(file.get(&mut memory, 2usize), Ok(0xBEEF));
    }

    #[test]
    fn lookups_distinguish_unknown_names_from_unknown_offsets() {
        let specs = [RegisterSpec::new("PC", 2)];
        let (mut memory, _, file) = setup(&specs, 0..2);

        assert_eq!(file.take("pc").expect("known").map(|reg| reg.name()), Some("pc"));
        assert_eq!(file.take(1usize), Ok(None));
        assert_eq!(file.take("sp"), Err(Fault::UnknownRegister("sp".into())));
        assert_eq!(file.get(&mut memory, 7usize), Err(Fault::UnmappedRegisterOffset(7)));
        assert_eq!(RegisterKey::Offset(16).to_string(), "0x0010");
    }

    #[test]
    fn defaults_are_applied_and_values_truncate_to_width() {
        let specs = [
            RegisterSpec::new("sp", 2).with_default(0x0800),
            RegisterSpec::new("flags", 1),
        ];
        let (mut memory, _, file) = setup(&specs, 0..0);

        assert_eq!(file.window(), None);
        assert_eq!(file.peek(&memory, "sp"), Ok(0x0800));
        file.set(&mut memory, "flags", 0x1FF).expect("known register");
        assert_eq!(file.get(&mut memory, "flags"), Ok(0xFF));
    }

    #[test]
    fn duplicate_names_are_rejected_ignoring_case() {
        let mut memory = Memory::new();
        let main = memory.allocate(8, Endianness::Big);
        let specs = [RegisterSpec::new("pc", 2), RegisterSpec::new("PC", 2)];
        assert_eq!(
            RegisterFile::new(&mut memory, main, &specs, 0..4).map(|file| file.len()),
            Err(Fault::DuplicateRegister("pc".into()))
        );
    }
}
