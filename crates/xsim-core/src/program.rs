//! Decoded program records consumed by the processor.
//!
//! An external assembler produces an ordered list of [`Instruction`]s. Each
//! record carries a mnemonic and up to three operands keyed by [`Role`].

use std::fmt;

use crate::Fault;

/// Operand descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Operand {
    /// Immediate value.
    Const(u64),
    /// Register name.
    Register(String),
    /// Memory-indirect operand: the inner operand yields the address.
    Address(Box<Operand>),
    /// Text, only meaningful for data definitions.
    String(String),
}

impl Operand {
    /// Immediate value operand.
    #[must_use]
    pub const fn constant(value: u64) -> Self {
        Self::Const(value)
    }

    /// Register operand.
    #[must_use]
    pub fn register(name: impl Into<String>) -> Self {
        Self::Register(name.into())
    }

    /// Memory-indirect operand over `inner`.
    #[must_use]
    pub fn address(inner: Self) -> Self {
        Self::Address(Box::new(inner))
    }

    /// Text operand.
    #[must_use]
    pub fn string(text: impl Into<String>) -> Self {
        Self::String(text.into())
    }

    /// Tag of this operand.
    #[must_use]
    pub const fn kind(&self) -> OperandKind {
        match self {
            Self::Const(_) => OperandKind::Const,
            Self::Register(_) => OperandKind::Register,
            Self::Address(_) => OperandKind::Address,
            Self::String(_) => OperandKind::String,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(value) => write!(f, "{value:#06x}"),
            Self::Register(name) => f.write_str(name),
            Self::Address(inner) => write!(f, "[{inner}]"),
            Self::String(text) => write!(f, "{text:?}"),
        }
    }
}

/// Operand tag, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum OperandKind {
    /// [`Operand::Const`].
    Const,
    /// [`Operand::Register`].
    Register,
    /// [`Operand::Address`].
    Address,
    /// [`Operand::String`].
    String,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Const => "constant",
            Self::Register => "register",
            Self::Address => "address",
            Self::String => "string",
        })
    }
}

/// Position an operand occupies in an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Role {
    /// Written (or read-modify-written) operand.
    Destination,
    /// Read operand.
    Source,
    /// Jump or call target.
    Address,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Destination => "destination",
            Self::Source => "source",
            Self::Address => "address",
        })
    }
}

/// Operands of one instruction, keyed by role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Operands {
    /// Destination operand.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub destination: Option<Operand>,
    /// Source operand.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub source: Option<Operand>,
    /// Target address operand.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub address: Option<Operand>,
}

impl Operands {
    /// No operands.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            destination: None,
            source: None,
            address: None,
        }
    }

    /// Sets the destination operand.
    #[must_use]
    pub fn with_destination(mut self, operand: Operand) -> Self {
        self.destination = Some(operand);
        self
    }

    /// Sets the source operand.
    #[must_use]
    pub fn with_source(mut self, operand: Operand) -> Self {
        self.source = Some(operand);
        self
    }

    /// Sets the target address operand.
    #[must_use]
    pub fn with_address(mut self, operand: Operand) -> Self {
        self.address = Some(operand);
        self
    }

    /// Operand in `role`, if present.
    #[must_use]
    pub const fn get(&self, role: Role) -> Option<&Operand> {
        match role {
            Role::Destination => self.destination.as_ref(),
            Role::Source => self.source.as_ref(),
            Role::Address => self.address.as_ref(),
        }
    }

    /// Operand in `role`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::MissingOperand`] when the role is empty.
    pub fn require(&self, role: Role) -> Result<&Operand, Fault> {
        self.get(role).ok_or(Fault::MissingOperand(role))
    }

    /// Jump or call target: the address operand, else the destination.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::MissingOperand`] when neither role is filled.
    pub fn target(&self) -> Result<&Operand, Fault> {
        self.address
            .as_ref()
            .or(self.destination.as_ref())
            .ok_or(Fault::MissingOperand(Role::Address))
    }

    /// Present operands in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &Operand)> + '_ {
        [Role::Destination, Role::Source, Role::Address]
            .into_iter()
            .filter_map(|role| self.get(role).map(|operand| (role, operand)))
    }
}

/// One decoded program record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Instruction {
    /// Mnemonic, matched case-insensitively.
    pub name: String,
    /// Operands by role.
    #[cfg_attr(feature = "serde", serde(default, rename = "params"))]
    pub operands: Operands,
}

impl Instruction {
    /// Builds a record.
    #[must_use]
    pub fn new(name: impl Into<String>, operands: Operands) -> Self {
        Self {
            name: name.into(),
            operands,
        }
    }

    /// Builds a record without operands.
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, Operands::none())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name.to_uppercase())?;
        for (index, (_, operand)) in self.operands.iter().enumerate() {
            f.write_str(if index == 0 { " " } else { ", " })?;
            write!(f, "{operand}")?;
        }
        Ok(())
    }
}
