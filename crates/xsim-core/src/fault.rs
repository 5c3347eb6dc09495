use thiserror::Error;

use crate::program::{OperandKind, Role};

/// Fault classes used to group failures for hosts and debuggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Memory access outside a space, with an unusable width, or on a foreign handle.
    Address,
    /// Mnemonic absent from the instruction set.
    Instruction,
    /// Operand kind not usable in its position, or a required operand is missing.
    Operand,
    /// Register lookup or register-file construction failure.
    Register,
    /// Arithmetic the simulated processor cannot perform.
    Arithmetic,
}

/// Failure raised by memory, register and execution operations.
///
/// None of these are retried. A failing step keeps whatever side effects had
/// already been applied before the failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum Fault {
    /// Access range does not fit inside the target space.
    #[error("address {address:#06x} (+{size}) is outside a {space_size}-byte space")]
    AddressOutOfRange {
        /// First byte of the attempted access.
        address: usize,
        /// Requested byte width.
        size: usize,
        /// Size of the space that rejected the access.
        space_size: usize,
    },
    /// Access width (or restriction limit) outside `1..=8` bytes.
    #[error("unsupported access width of {size} bytes")]
    UnsupportedWidth {
        /// Rejected width.
        size: usize,
    },
    /// Space handle that does not belong to this memory arena.
    #[error("unknown memory space #{0}")]
    UnknownSpace(usize),
    /// Mnemonic with no registered handler.
    #[error("unknown instruction `{0}`")]
    UnknownInstruction(String),
    /// Operand kind that cannot be used in the given position.
    #[error("{kind} operand cannot be used as {role}")]
    InvalidOperand {
        /// Operand role being resolved.
        role: Role,
        /// Offending operand kind.
        kind: OperandKind,
    },
    /// Instruction record lacks an operand its handler requires.
    #[error("missing {0} operand")]
    MissingOperand(Role),
    /// Register name that is not configured.
    #[error("unknown register `{0}`")]
    UnknownRegister(String),
    /// Offset inside the mapped window that no register occupies.
    #[error("no register is mapped at offset {0:#06x}")]
    UnmappedRegisterOffset(usize),
    /// Register specification lists the same name twice.
    #[error("register `{0}` is specified more than once")]
    DuplicateRegister(String),
    /// `DIV` with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
}

impl Fault {
    /// Returns the class this fault belongs to.
    #[must_use]
    pub const fn class(&self) -> FaultClass {
        match self {
            Self::AddressOutOfRange { .. } | Self::UnsupportedWidth { .. } | Self::UnknownSpace(_) => {
                FaultClass::Address
            }
            Self::UnknownInstruction(_) => FaultClass::Instruction,
            Self::InvalidOperand { .. } | Self::MissingOperand(_) => FaultClass::Operand,
            Self::UnknownRegister(_)
            | Self::UnmappedRegisterOffset(_)
            | Self::DuplicateRegister(_) => FaultClass::Register,
            Self::DivisionByZero => FaultClass::Arithmetic,
        }
    }
}
