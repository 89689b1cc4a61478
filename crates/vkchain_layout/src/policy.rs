//! The substitutable tag-stamping primitive.

use crate::fields::write_stype;
use crate::types::StructureType;

/// Controls whether chain operations write canonical tags into structure
/// images.
///
/// Catalogues differ on who owns the tag field: plain C-style definitions
/// leave it zeroed and expect the chain builder to stamp it, while wrapper
/// catalogues pre-populate the tag in every constructor and treat the field
/// as read-only. Chains and blobs are generic over this policy, defaulting
/// to [`WriteTag`].
pub trait TagPolicy {
    /// Stamps (or deliberately skips stamping) the canonical tag at `offset`
    /// inside `data`.
    ///
    /// # Panics
    ///
    /// Implementations that write may panic if `offset + 4` exceeds
    /// `data.len()`.
    fn stamp(data: &mut [u8], offset: usize, stype: StructureType);
}

/// Stamps the canonical tag on every chain operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteTag;

impl TagPolicy for WriteTag {
    fn stamp(data: &mut [u8], offset: usize, stype: StructureType) {
        write_stype(data, offset, stype);
    }
}

/// Leaves the tag field untouched; the catalogue pre-populates it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustTag;

impl TagPolicy for TrustTag {
    fn stamp(_data: &mut [u8], _offset: usize, _stype: StructureType) {}
}
