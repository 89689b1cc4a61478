//! Error types for chain operations.

use thiserror::Error;
use vkchain_layout::StructureType;

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Errors that can occur when looking up structures in a chain.
///
/// All chain mutations are infallible; only lookups and reinterpretations can
/// fail, and a failed lookup never changes chain state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    /// No structure with the requested tag has been appended.
    #[error("no structure with tag {stype} in the chain")]
    TagNotFound {
        /// The tag that was looked up.
        stype: StructureType,
    },

    /// The stored structure's byte size does not match the requested type.
    #[error("structure size mismatch: expected {expected} bytes, found {actual}")]
    SizeMismatch {
        /// Size of the requested type.
        expected: usize,
        /// Size recorded for the stored structure.
        actual: usize,
    },
}
