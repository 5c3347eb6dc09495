//! Read/write observer types.

use std::fmt;
use std::rc::Rc;

use super::{Memory, SpaceId};

/// Kind of access a hook subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Fired by [`Memory::read`].
    Read,
    /// Fired by [`Memory::write`].
    Write,
}

/// Payload delivered with a hook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// A read of `size` bytes, after access restrictions were applied.
    Read {
        /// Effective number of bytes read.
        size: usize,
    },
    /// A write of the encoded bytes.
    Write {
        /// Bytes stored, in the space's byte order.
        bytes: Vec<u8>,
    },
}

impl Access {
    /// Returns the hook kind this payload is delivered to.
    #[must_use]
    pub const fn kind(&self) -> AccessKind {
        match self {
            Self::Read { .. } => AccessKind::Read,
            Self::Write { .. } => AccessKind::Write,
        }
    }

    /// Number of bytes touched by the access.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Read { size } => *size,
            Self::Write { bytes } => bytes.len(),
        }
    }

    /// Returns `true` for a zero-length access.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Notification passed to a hook, already translated into the hooked
/// space's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookEvent<'a> {
    /// Space the hook was registered on.
    pub space: SpaceId,
    /// Address local to `space`.
    pub address: usize,
    /// What happened at `address`.
    pub access: &'a Access,
}

/// Identity of a registered hook, used to remove it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(pub(crate) u64);

/// Shared callback. Hooks may be re-entered by the accesses they perform,
/// so any state they keep lives in `Cell`/`RefCell`.
pub(crate) type HookFn = Rc<dyn Fn(&mut Memory, &HookEvent<'_>)>;

pub(crate) struct Hook {
    pub(crate) id: HookId,
    pub(crate) kind: AccessKind,
    pub(crate) callback: HookFn,
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
