//! The structure type tag.

use std::fmt;

/// Enumerated value identifying a structure's concrete layout.
///
/// Every driver structure stores one of these at a fixed offset; the driver
/// dispatches on it while walking a chain. The catalogue of valid values is
/// owned by the target API's structure set, so this type carries no
/// constants of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct StructureType(pub i32);

impl StructureType {
    /// Creates a tag from its raw value.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw tag value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sType({})", self.0)
    }
}
