//! Observable, hierarchical byte storage.
//!
//! A [`Memory`] arena owns every backing buffer. Root spaces own a buffer of
//! their own; views alias a contiguous slice of a parent's bytes and are
//! addressed through the same [`SpaceId`] handles. Parent/child links are
//! index relations kept in per-space [`RangeMap`]s, never ownership.
//!
//! Every read or write notifies the hooks of the accessed space, then walks
//! the child views containing the address and the parent chain, translating
//! the address at each hop. A trace of visited spaces keeps each space from
//! being notified twice for the same access.

/// Bounds, width and byte-order helpers.
pub mod access;
/// Hook payload and identity types.
pub mod hooks;
/// Interval index used for views and restrictions.
pub mod map;

use std::fmt;
use std::fmt::Write as _;
use std::rc::Rc;

pub use access::{validate_range, validate_width, Endianness, MAX_ACCESS_BYTES};
pub use hooks::{Access, AccessKind, HookEvent, HookId};
pub use map::{RangeEntry, RangeMap};

use crate::Fault;
use hooks::Hook;

/// Bytes rendered per row by [`Memory::dump`].
pub const DUMP_BYTES_PER_ROW: usize = 16;

/// Handle of a space inside a [`Memory`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpaceId(usize);

impl SpaceId {
    /// Arena slot of this space.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "space#{}", self.0)
    }
}

/// Link from a view to the space it was carved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParentLink {
    /// Space the view aliases.
    pub space: SpaceId,
    /// Offset of the view's first byte inside `space`.
    pub offset: usize,
}

#[derive(Debug)]
struct Space {
    buffer: usize,
    base: usize,
    size: usize,
    endianness: Endianness,
    hooks: Vec<Hook>,
    children: RangeMap<SpaceId>,
    parent: Option<ParentLink>,
    restrictions: RangeMap<usize>,
}

impl Space {
    fn new(buffer: usize, base: usize, size: usize, endianness: Endianness) -> Self {
        Self {
            buffer,
            base,
            size,
            endianness,
            hooks: Vec::new(),
            children: RangeMap::new(),
            parent: None,
            restrictions: RangeMap::new(),
        }
    }

    fn clamp(&self, address: usize, size: usize) -> usize {
        self.restrictions
            .overlapping(address..address.saturating_add(size))
            .map(|entry| entry.value)
            .min()
            .map_or(size, |limit| size.min(limit))
    }
}

/// Arena of byte-addressable spaces and the views carved from them.
#[derive(Default)]
pub struct Memory {
    buffers: Vec<Vec<u8>>,
    spaces: Vec<Space>,
    next_hook: u64,
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("buffers", &self.buffers.len())
            .field("spaces", &self.spaces)
            .finish_non_exhaustive()
    }
}

impl Memory {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a zeroed root space with its own backing buffer.
    pub fn allocate(&mut self, size: usize, endianness: Endianness) -> SpaceId {
        let buffer = self.buffers.len();
        self.buffers.push(vec![0; size]);
        let id = SpaceId(self.spaces.len());
        self.spaces.push(Space::new(buffer, 0, size, endianness));
        tracing::trace!(space = id.0, size, "allocated root space");
        id
    }

    /// Number of spaces (roots and views) in the arena.
    #[must_use]
    pub fn space_count(&self) -> usize {
        self.spaces.len()
    }

    fn space(&self, id: SpaceId) -> Result<&Space, Fault> {
        self.spaces.get(id.0).ok_or(Fault::UnknownSpace(id.0))
    }

    fn space_mut(&mut self, id: SpaceId) -> Result<&mut Space, Fault> {
        self.spaces.get_mut(id.0).ok_or(Fault::UnknownSpace(id.0))
    }

    /// Size of a space in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownSpace`] for a handle from another arena.
    pub fn size(&self, id: SpaceId) -> Result<usize, Fault> {
        Ok(self.space(id)?.size)
    }

    /// Byte order of a space.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownSpace`] for a handle from another arena.
    pub fn endianness(&self, id: SpaceId) -> Result<Endianness, Fault> {
        Ok(self.space(id)?.endianness)
    }

    /// Parent link of a view, `None` for a root space.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownSpace`] for a handle from another arena.
    pub fn parent(&self, id: SpaceId) -> Result<Option<ParentLink>, Fault> {
        Ok(self.space(id)?.parent)
    }

    /// Child views carved directly from a space, keyed by their parent range.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownSpace`] for a handle from another arena.
    pub fn children(&self, id: SpaceId) -> Result<&RangeMap<SpaceId>, Fault> {
        Ok(&self.space(id)?.children)
    }

    /// Borrows the bytes of a space without notifying hooks.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownSpace`] for a handle from another arena.
    pub fn bytes(&self, id: SpaceId) -> Result<&[u8], Fault> {
        let space = self.space(id)?;
        Ok(&self.buffers[space.buffer][space.base..space.base + space.size])
    }

    /// Effective width of an access after restrictions on `space` apply.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownSpace`] for a handle from another arena.
    pub fn effective_width(&self, id: SpaceId, address: usize, size: usize) -> Result<usize, Fault> {
        Ok(self.space(id)?.clamp(address, size))
    }

    /// Reads `size` bytes at `address`, notifying read hooks first.
    ///
    /// The width is clamped by any overlapping access restriction. Single
    /// bytes are returned raw; wider values are decoded in the space's byte
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::AddressOutOfRange`] when the requested range escapes
    /// the space, [`Fault::UnsupportedWidth`] for widths outside `1..=8`.
    pub fn read(&mut self, id: SpaceId, address: usize, size: usize) -> Result<u64, Fault> {
        validate_width(size)?;
        let space = self.space(id)?;
        validate_range(address, size, space.size)?;
        let size = space.clamp(address, size);

        self.notify(id, address, &Access::Read { size });

        let space = &self.spaces[id.0];
        let start = space.base + address;
        let bytes = &self.buffers[space.buffer][start..start + size];
        Ok(match bytes {
            [byte] => u64::from(*byte),
            _ => space.endianness.decode(bytes),
        })
    }

    /// Reads without hooks or restrictions, for debuggers and renderers.
    ///
    /// # Errors
    ///
    /// Same range and width failures as [`Memory::read`].
    pub fn peek(&self, id: SpaceId, address: usize, size: usize) -> Result<u64, Fault> {
        validate_width(size)?;
        let space = self.space(id)?;
        validate_range(address, size, space.size)?;
        let start = space.base + address;
        Ok(space
            .endianness
            .decode(&self.buffers[space.buffer][start..start + size]))
    }

    /// Writes the low bytes of `value` at `address`, then notifies write hooks.
    ///
    /// The width is clamped by any overlapping access restriction and the
    /// value is truncated to the clamped width. Bounds are checked on the
    /// clamped width, so a wide write into a narrow port at the end of a
    /// space succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::AddressOutOfRange`] when the clamped range escapes
    /// the space, [`Fault::UnsupportedWidth`] for widths outside `1..=8`.
    pub fn write(&mut self, id: SpaceId, address: usize, value: u64, size: usize) -> Result<(), Fault> {
        validate_width(size)?;
        let space = self.space(id)?;
        let size = space.clamp(address, size);
        validate_range(address, size, space.size)?;
        let bytes = space.endianness.encode(value, size);

        let start = space.base + address;
        let buffer = space.buffer;
        self.buffers[buffer][start..start + bytes.len()].copy_from_slice(&bytes);

        self.notify(id, address, &Access::Write { bytes });
        Ok(())
    }

    /// Carves a view aliasing `[address, address + size)` of `parent`.
    ///
    /// With `restrict_access_at_time`, every access through the new view (and
    /// through its ancestors over the same bytes) is capped at that many bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::AddressOutOfRange`] when the range escapes `parent`,
    /// [`Fault::UnsupportedWidth`] for a restriction outside `1..=8`.
    pub fn view(
        &mut self,
        parent: SpaceId,
        address: usize,
        size: usize,
        restrict_access_at_time: Option<usize>,
    ) -> Result<SpaceId, Fault> {
        let space = self.space(parent)?;
        validate_range(address, size, space.size)?;
        if let Some(limit) = restrict_access_at_time {
            validate_width(limit)?;
        }

        let mut view = Space::new(space.buffer, space.base + address, size, space.endianness);
        view.parent = Some(ParentLink {
            space: parent,
            offset: address,
        });
        let id = SpaceId(self.spaces.len());
        self.spaces.push(view);
        self.spaces[parent.0]
            .children
            .insert(address..address + size, id);
        tracing::trace!(
            view = id.0,
            parent = parent.0,
            offset = address,
            size,
            "created view"
        );

        if let Some(limit) = restrict_access_at_time {
            self.limit_access_at_time(id, 0, Some(size), limit)?;
        }
        Ok(id)
    }

    /// Caps accesses overlapping `[address, address + size)` at `limit` bytes.
    ///
    /// `size` defaults to the whole space. The restriction is recorded on this
    /// space and forwarded up the parent chain in translated coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::AddressOutOfRange`] when the range escapes the space,
    /// [`Fault::UnsupportedWidth`] when `limit` is outside `1..=8`.
    pub fn limit_access_at_time(
        &mut self,
        id: SpaceId,
        address: usize,
        size: Option<usize>,
        limit: usize,
    ) -> Result<(), Fault> {
        validate_width(limit)?;
        let mut current = id;
        let mut address = address;
        let size = size.unwrap_or(self.space(id)?.size);
        loop {
            let space = self.space_mut(current)?;
            validate_range(address, size, space.size)?;
            space.restrictions.replace(address..address + size, limit);
            tracing::trace!(space = current.0, address, size, limit, "installed access restriction");
            match space.parent {
                Some(link) => {
                    current = link.space;
                    address += link.offset;
                }
                None => return Ok(()),
            }
        }
    }

    /// Registers a hook fired after every read reaching `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownSpace`] for a handle from another arena.
    pub fn on_read<F>(&mut self, id: SpaceId, hook: F) -> Result<HookId, Fault>
    where
        F: Fn(&mut Self, &HookEvent<'_>) + 'static,
    {
        self.add_hook(id, AccessKind::Read, Rc::new(hook))
    }

    /// Registers a hook fired after every write reaching `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownSpace`] for a handle from another arena.
    pub fn on_write<F>(&mut self, id: SpaceId, hook: F) -> Result<HookId, Fault>
    where
        F: Fn(&mut Self, &HookEvent<'_>) + 'static,
    {
        self.add_hook(id, AccessKind::Write, Rc::new(hook))
    }

    fn add_hook(&mut self, id: SpaceId, kind: AccessKind, callback: hooks::HookFn) -> Result<HookId, Fault> {
        let hook_id = HookId(self.next_hook);
        self.space_mut(id)?.hooks.push(Hook {
            id: hook_id,
            kind,
            callback,
        });
        self.next_hook += 1;
        Ok(hook_id)
    }

    /// Unregisters a hook. Returns `false` when it was not registered on `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnknownSpace`] for a handle from another arena.
    pub fn remove_hook(&mut self, id: SpaceId, hook: HookId) -> Result<bool, Fault> {
        let hooks = &mut self.space_mut(id)?.hooks;
        let before = hooks.len();
        hooks.retain(|registered| registered.id != hook);
        Ok(hooks.len() != before)
    }

    /// Renders `size` bytes from `address` as hex rows (`size == 0` dumps to the end).
    ///
    /// # Errors
    ///
    /// Returns [`Fault::AddressOutOfRange`] when the range escapes the space.
    pub fn dump(&self, id: SpaceId, address: usize, size: usize) -> Result<String, Fault> {
        let space = self.space(id)?;
        validate_range(address, size, space.size)?;
        let bytes = &self.bytes(id)?[address..];
        let bytes = if size > 0 { &bytes[..size] } else { bytes };

        let mut out = String::with_capacity(bytes.len() * 3);
        for (row_index, row) in bytes.chunks(DUMP_BYTES_PER_ROW).enumerate() {
            if row_index > 0 {
                out.push('\n');
            }
            for (column, byte) in row.iter().enumerate() {
                if column > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{byte:02x}");
            }
        }
        Ok(out)
    }

    fn notify(&mut self, origin: SpaceId, address: usize, access: &Access) {
        let mut trace = vec![origin];
        self.propagate(origin, address, access, &mut trace);
    }

    fn propagate(&mut self, id: SpaceId, address: usize, access: &Access, trace: &mut Vec<SpaceId>) {
        self.invoke_hooks(id, address, access);

        let space = &self.spaces[id.0];
        let targets: Vec<(SpaceId, usize)> = space
            .children
            .containing(address)
            .map(|entry| (entry.value, address - entry.range.start))
            .chain(space.parent.map(|link| (link.space, address + link.offset)))
            .collect();

        for (target, translated) in targets {
            if trace.contains(&target) {
                continue;
            }
            trace.push(target);
            self.propagate(target, translated, access, trace);
        }
    }

    fn invoke_hooks(&mut self, id: SpaceId, address: usize, access: &Access) {
        let kind = access.kind();
        let callbacks: Vec<hooks::HookFn> = self.spaces[id.0]
            .hooks
            .iter()
            .filter(|hook| hook.kind == kind)
            .map(|hook| Rc::clone(&hook.callback))
            .collect();
        if callbacks.is_empty() {
            return;
        }

        let event = HookEvent {
            space: id,
            address,
            access,
        };
        for callback in callbacks {
            callback(self, &event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rstest::rstest;
    use tracing_test::traced_test;

    use super::{Access, Endianness, Memory, SpaceId};
    use crate::Fault;

    fn recorder(memory: &mut Memory, id: SpaceId, log: &Rc<RefCell<Vec<(SpaceId, usize)>>>) {
        let log = Rc::clone(log);
        memory
            .on_write(id, move |_, event| log.borrow_mut().push((event.space, event.address)))
            .expect("known space");
    }

    #[rstest]
    #[case(Endianness::Big, 0x1234, 2, 0x1234)]
    #[case(Endianness::Little, 0x1234, 2, 0x1234)]
    #[case(Endianness::Big, 0x1_2345, 2, 0x2345)]
    #[case(Endianness::Little, 0xDEAD_BEEF, 4, 0xDEAD_BEEF)]
    #[case(Endianness::Big, 0x1FF, 1, 0xFF)]
    fn write_then_read_round_trips_modulo_width(
        #[case] order: Endianness,
        #[case] value: u64,
        #[case] size: usize,
        #[case] expected: u64,
    ) {
        let mut memory = Memory::new();
        let root = memory.allocate(16, order);
        memory.write(root, 3, value, size).expect("in range");
        assert_eq!(memory.read(root, 3, size), Ok(expected));
    }

    #[test]
    fn byte_order_controls_the_stored_layout() {
        let mut memory = Memory::new();
        let big = memory.allocate(2, Endianness::Big);
        let little = memory.allocate(2, Endianness::Little);
        memory.write(big, 0, 0x1234, 2).expect("in range");
        memory.write(little, 0, 0x1234, 2).expect("in range");

        assert_eq!(memory.bytes(big), Ok(&[0x12, 0x34][..]));
        assert_eq!(memory.bytes(little), Ok(&[0x34, 0x12][..]));
    }

    #[test]
    fn out_of_range_accesses_fail_without_side_effects() {
        let mut memory = Memory::new();
        let root = memory.allocate(4, Endianness::Big);
        let fault = Fault::AddressOutOfRange {
            address: 3,
            size: 2,
            space_size: 4,
        };
        assert_eq!(memory.read(root, 3, 2), Err(fault.clone()));
        assert_eq!(memory.write(root, 3, 0xFFFF, 2), Err(fault));
        assert_eq!(memory.bytes(root), Ok(&[0, 0, 0, 0][..]));
        assert_eq!(
            memory.read(root, 0, 9),
            Err(Fault::UnsupportedWidth { size: 9 })
        );
    }

    #[test]
    fn view_shares_bytes_with_its_parent() {
        let mut memory = Memory::new();
        let root = memory.allocate(32, Endianness::Big);
        let view = memory.view(root, 16, 8, None).expect("inside parent");

        memory.write(view, 0, 0x41, 1).expect("in range");
        assert_eq!(memory.read(root, 16, 1), Ok(0x41));

        memory.write(root, 17, 0x42, 1).expect("in range");
        assert_eq!(memory.read(view, 1, 1), Ok(0x42));
        assert_eq!(memory.size(view), Ok(8));
        assert_eq!(
            memory.parent(view).expect("known").map(|link| (link.space, link.offset)),
            Some((root, 16))
        );
        assert_eq!(memory.children(root).expect("known").len(), 1);
    }

    #[test]
    fn view_must_fit_inside_its_parent() {
        let mut memory = Memory::new();
        let root = memory.allocate(8, Endianness::Big);
        assert!(memory.view(root, 4, 5, None).is_err());
        assert!(memory.view(root, 0, 8, Some(0)).is_err());
    }

    #[test]
    fn restricted_view_clamps_every_access_to_one_byte() {
        let mut memory = Memory::new();
        let root = memory.allocate(16, Endianness::Big);
        let port = memory.view(root, 4, 2, Some(1)).expect("inside parent");

        memory.write(port, 0, 0xABCD, 2).expect("in range");
        assert_eq!(memory.bytes(port), Ok(&[0xCD, 0x00][..]));
        assert_eq!(memory.read(port, 0, 2), Ok(0xCD));
        // The restriction was forwarded to the root in its coordinates.
        assert_eq!(memory.read(root, 4, 2), Ok(0xCD));
        assert_eq!(memory.read(root, 2, 2), Ok(0x0000));
        assert_eq!(memory.effective_width(root, 3, 2), Ok(1));
    }

    #[test]
    fn smallest_overlapping_restriction_wins() {
        let mut memory = Memory::new();
        let root = memory.allocate(16, Endianness::Big);
        memory.limit_access_at_time(root, 0, Some(8), 4).expect("valid");
        memory.limit_access_at_time(root, 6, Some(4), 2).expect("valid");
        memory.limit_access_at_time(root, 0, Some(8), 3).expect("valid");

        assert_eq!(memory.effective_width(root, 0, 4), Ok(3));
        assert_eq!(memory.effective_width(root, 0, 8), Ok(2));
        assert_eq!(memory.effective_width(root, 5, 8), Ok(2));
        assert_eq!(memory.effective_width(root, 12, 4), Ok(4));
        assert_eq!(
            memory.limit_access_at_time(root, 0, None, 0),
            Err(Fault::UnsupportedWidth { size: 0 })
        );
    }

    #[test]
    fn nested_hooks_fire_once_per_space() {
        let mut memory = Memory::new();
        let root = memory.allocate(64, Endianness::Big);
        let mid = memory.view(root, 16, 32, None).expect("inside root");
        let leaf = memory.view(mid, 8, 8, None).expect("inside mid");
        let log = Rc::new(RefCell::new(Vec::new()));
        for id in [root, mid, leaf] {
            recorder(&mut memory, id, &log);
        }

        memory.write(leaf, 2, 0x7, 1).expect("in range");
        let mut seen = log.borrow().clone();
        seen.sort();
        assert_eq!(seen, vec![(root, 26), (mid, 10), (leaf, 2)]);

        log.borrow_mut().clear();
        memory.write(root, 26, 0x8, 1).expect("in range");
        assert_eq!(log.borrow().len(), 3);

        log.borrow_mut().clear();
        memory.write(root, 0, 0x8, 1).expect("in range");
        assert_eq!(*log.borrow(), vec![(root, 0)]);
    }

    #[test]
    fn sibling_views_over_the_same_bytes_are_both_notified() {
        let mut memory = Memory::new();
        let root = memory.allocate(16, Endianness::Big);
        let first = memory.view(root, 0, 8, None).expect("inside root");
        let second = memory.view(root, 4, 8, None).expect("inside root");
        let log = Rc::new(RefCell::new(Vec::new()));
        recorder(&mut memory, first, &log);
        recorder(&mut memory, second, &log);

        memory.write(first, 5, 1, 1).expect("in range");
        let mut seen = log.borrow().clone();
        seen.sort();
        assert_eq!(seen, vec![(first, 5), (second, 1)]);
    }

    #[test]
    fn read_hooks_see_the_clamped_width_and_run_before_decoding() {
        let mut memory = Memory::new();
        let root = memory.allocate(8, Endianness::Big);
        let port = memory.view(root, 0, 1, Some(1)).expect("inside root");
        let widths = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&widths);
        memory
            .on_read(port, move |memory, event| {
                sink.borrow_mut().push(event.access.clone());
                memory.write(event.space, 0, 0x5A, 1).expect("in range");
            })
            .expect("known space");

        assert_eq!(memory.read(root, 0, 2), Ok(0x5A));
        assert_eq!(*widths.borrow(), vec![Access::Read { size: 1 }]);
    }

    #[test]
    fn hooks_observe_writes_issued_by_their_own_callback() {
        let mut memory = Memory::new();
        let root = memory.allocate(8, Endianness::Big);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        memory
            .on_write(root, move |memory, event| {
                sink.borrow_mut().push(event.address);
                if event.address == 0 {
                    memory.write(event.space, 5, 0xEE, 1).expect("in range");
                }
            })
            .expect("known space");

        memory.write(root, 0, 1, 1).expect("in range");
        assert_eq!(*log.borrow(), vec![0, 5]);
        assert_eq!(memory.peek(root, 5, 1), Ok(0xEE));
    }

    #[test]
    fn wide_write_into_a_narrow_port_at_the_end_of_memory_is_clamped_first() {
        let mut memory = Memory::new();
        let root = memory.allocate(8, Endianness::Big);
        let port = memory.view(root, 7, 1, Some(1)).expect("inside root");

        memory.write(root, 7, 0x1234, 2).expect("clamped into range");
        assert_eq!(memory.peek(port, 0, 1), Ok(0x34));
        assert_eq!(
            memory.write(root, 8, 0x12, 1),
            Err(Fault::AddressOutOfRange {
                address: 8,
                size: 1,
                space_size: 8
            })
        );
    }

    #[test]
    fn removed_hooks_stop_firing() {
        let mut memory = Memory::new();
        let root = memory.allocate(4, Endianness::Big);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let hook = memory
            .on_write(root, move |_, event| sink.borrow_mut().push(event.address))
            .expect("known space");

        memory.write(root, 0, 1, 1).expect("in range");
        assert_eq!(memory.remove_hook(root, hook), Ok(true));
        assert_eq!(memory.remove_hook(root, hook), Ok(false));
        memory.write(root, 1, 1, 1).expect("in range");
        assert_eq!(*log.borrow(), vec![0]);
    }

    #[test]
    fn dump_renders_hex_rows() {
        let mut memory = Memory::new();
        let root = memory.allocate(20, Endianness::Big);
        for (address, value) in (0..20u64).enumerate() {
            memory.write(root, address, value, 1).expect("in range");
        }

        let expected = "00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f\n10 11 12 13";
        assert_eq!(memory.dump(root, 0, 0).as_deref(), Ok(expected));
        assert_eq!(memory.dump(root, 14, 3).as_deref(), Ok("0e 0f 10"));
        assert!(memory.dump(root, 20, 0).is_err());
    }

    #[test]
    fn foreign_handles_are_rejected() {
        let mut memory = Memory::new();
        let _ = memory.allocate(4, Endianness::Big);
        let mut other = Memory::new();
        let first = other.allocate(1, Endianness::Big);
        let foreign = other.allocate(1, Endianness::Big);
        assert_eq!(memory.read(foreign, 0, 1), Err(Fault::UnknownSpace(1)));
        assert_eq!(memory.space_count(), 1);
        assert_eq!(first.index(), 0);
    }

    #[traced_test]
    #[test]
    fn view_creation_is_traced() {
        let mut memory = Memory::new();
        let root = memory.allocate(8, Endianness::Big);
        memory.view(root, 2, 2, Some(1)).expect("inside root");
        assert!(logs_contain("created view"));
        assert!(logs_contain("installed access restriction"));
    }
}
