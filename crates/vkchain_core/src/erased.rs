//! The type-erased structure seam shared by views, blobs and chains.

use std::ffi::c_void;
use std::slice;
use vkchain_layout::{read_pnext, read_stype, StructureType, TaggedStructure};

/// A type-erased driver structure: a byte image plus the offsets of its tag
/// and next-link fields.
///
/// Both the non-owning [`StructureRef`](crate::StructureRef) and the owning
/// [`StructureBlob`](crate::StructureBlob) implement this, which lets the
/// chains accept either through one erased append path.
///
/// # Safety
///
/// Implementors must guarantee that `data_ptr()` (and `data_ptr_mut()`) point
/// to at least `size()` valid bytes for as long as the implementor is
/// borrowed, and that both field offsets are in bounds for that image.
pub unsafe trait ErasedStructure {
    /// Pointer to the first byte of the structure image.
    fn data_ptr(&self) -> *const u8;

    /// Mutable pointer to the first byte of the structure image.
    fn data_ptr_mut(&mut self) -> *mut u8;

    /// Byte size of the structure image.
    fn size(&self) -> usize;

    /// Byte offset of the tag field.
    fn stype_offset(&self) -> usize;

    /// Byte offset of the next-link field.
    fn pnext_offset(&self) -> usize;

    /// Reads the tag currently stored in the image.
    fn stype(&self) -> StructureType {
        let bytes = unsafe { slice::from_raw_parts(self.data_ptr(), self.size()) };
        read_stype(bytes, self.stype_offset())
    }

    /// Reads the next-link pointer currently stored in the image.
    fn pnext(&self) -> *mut c_void {
        let bytes = unsafe { slice::from_raw_parts(self.data_ptr(), self.size()) };
        read_pnext(bytes, self.pnext_offset())
    }
}

/// Borrows the raw byte image of a catalogue structure.
pub(crate) fn bytes_of<S: TaggedStructure>(value: &S) -> &[u8] {
    unsafe { slice::from_raw_parts((value as *const S).cast::<u8>(), std::mem::size_of::<S>()) }
}
