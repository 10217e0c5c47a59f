//! Wire (logical qubit) types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Global index of a qubit wire.
///
/// Indices follow the declaration order of every wire in the circuit, so two
/// registers `a[0]` and `b[0]` get distinct ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WireId(pub u32);

impl WireId {
    /// The index as `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

impl From<u32> for WireId {
    fn from(id: u32) -> Self {
        WireId(id)
    }
}

/// A declared wire with optional register membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wire {
    /// The global identifier.
    pub id: WireId,
    /// The register this wire belongs to, if any.
    pub register: Option<String>,
    /// The index within the register, if any.
    pub index: Option<u32>,
}

impl Wire {
    /// Create a wire with just an id.
    pub fn new(id: WireId) -> Self {
        Self {
            id,
            register: None,
            index: None,
        }
    }

    /// Create a wire that belongs to a register.
    pub fn with_register(id: WireId, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            register: Some(register.into()),
            index: Some(index),
        }
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.register, self.index) {
            (Some(reg), Some(idx)) => write!(f, "{reg}[{idx}]"),
            _ => write!(f, "{}", self.id),
        }
    }
}
