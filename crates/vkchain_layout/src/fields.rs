//! Accessors for the two distinguished fields inside a raw structure image.
//!
//! All driver structures are plain byte blocks; the tag and next-link fields
//! are read and written with explicit copies so the accessors never depend on
//! the image being aligned for the field type.

use crate::types::StructureType;
use std::ffi::c_void;

/// Byte size of the structure type tag field.
pub const STYPE_FIELD_SIZE: usize = std::mem::size_of::<StructureType>();

/// Byte size of the next-link field.
pub const PNEXT_FIELD_SIZE: usize = std::mem::size_of::<*mut c_void>();

/// Reads the tag stored at `offset` inside `data`.
///
/// # Panics
///
/// Panics if `offset + 4` exceeds `data.len()`. An out-of-bounds offset is a
/// layout contract violation, not a recoverable condition.
#[must_use]
pub fn read_stype(data: &[u8], offset: usize) -> StructureType {
    let mut raw = [0u8; STYPE_FIELD_SIZE];
    raw.copy_from_slice(&data[offset..offset + STYPE_FIELD_SIZE]);
    StructureType::new(i32::from_ne_bytes(raw))
}

/// Writes `stype` into the tag field at `offset` inside `data`.
///
/// # Panics
///
/// Panics if `offset + 4` exceeds `data.len()`.
pub fn write_stype(data: &mut [u8], offset: usize, stype: StructureType) {
    data[offset..offset + STYPE_FIELD_SIZE].copy_from_slice(&stype.as_i32().to_ne_bytes());
}

/// Reads the next-link pointer stored at `offset` inside `data`.
///
/// # Panics
///
/// Panics if `offset + size_of::<*mut c_void>()` exceeds `data.len()`.
#[must_use]
pub fn read_pnext(data: &[u8], offset: usize) -> *mut c_void {
    let mut raw = [0u8; PNEXT_FIELD_SIZE];
    raw.copy_from_slice(&data[offset..offset + PNEXT_FIELD_SIZE]);
    usize::from_ne_bytes(raw) as *mut c_void
}

/// Writes `pnext` into the next-link field at `offset` inside `data`.
///
/// # Panics
///
/// Panics if `offset + size_of::<*mut c_void>()` exceeds `data.len()`.
pub fn write_pnext(data: &mut [u8], offset: usize, pnext: *mut c_void) {
    data[offset..offset + PNEXT_FIELD_SIZE].copy_from_slice(&(pnext as usize).to_ne_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stype_roundtrip_at_offset() {
        let mut image = [0u8; 24];
        write_stype(&mut image, 0, StructureType::new(1000244004));
        assert_eq!(read_stype(&image, 0), StructureType::new(1000244004));
    }

    #[test]
    fn stype_write_leaves_other_bytes_untouched() {
        let mut image = [0xAAu8; 16];
        write_stype(&mut image, 4, StructureType::new(7));
        assert_eq!(image[0..4], [0xAA; 4]);
        assert_eq!(image[8..], [0xAA; 8]);
    }

    #[test]
    fn pnext_roundtrip_at_offset() {
        let mut image = [0u8; 24];
        let target = 0xDEAD_BEE0usize as *mut c_void;
        write_pnext(&mut image, 8, target);
        assert_eq!(read_pnext(&image, 8), target);
    }

    #[test]
    fn null_pnext_reads_back_null() {
        let mut image = [0xFFu8; 16];
        write_pnext(&mut image, 8, std::ptr::null_mut());
        assert!(read_pnext(&image, 8).is_null());
    }

    #[test]
    #[should_panic]
    fn stype_offset_out_of_bounds_panics() {
        let image = [0u8; 8];
        let _ = read_stype(&image, 6);
    }

    #[test]
    #[should_panic]
    fn pnext_offset_out_of_bounds_panics() {
        let mut image = [0u8; 8];
        write_pnext(&mut image, 4, std::ptr::null_mut());
    }
}
