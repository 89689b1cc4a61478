//! Owning type-erased copy of one structure.

use crate::buffer::AlignedBytes;
use crate::erased::{bytes_of, ErasedStructure};
use crate::error::{ChainError, ChainResult};
use std::ffi::c_void;
use std::mem;
use std::ptr;
use std::slice;
use vkchain_layout::{read_pnext, read_stype, write_pnext, StructureType, TagPolicy, TaggedStructure, WriteTag};

/// An owning, type-erased copy of one structure.
///
/// Construction copies the full byte image into internally managed aligned
/// storage, forcibly stamps the canonical tag and zeroes the next-link: a
/// copy is never implicitly chained, and never carries a stale link target.
/// The source outliving the blob is therefore not required.
///
/// The plain-data precondition (no owned resources in the source) is enforced
/// at compile time through the [`TaggedStructure`]`: Copy` bound.
#[derive(Debug)]
pub struct StructureBlob {
    data: AlignedBytes,
    stype_offset: usize,
    pnext_offset: usize,
}

impl StructureBlob {
    /// Copies `source` into owned storage, stamping the canonical tag and
    /// zeroing the next-link.
    pub fn new<S: TaggedStructure>(source: &S) -> Self {
        Self::new_with::<S, WriteTag>(source)
    }

    /// Like [`StructureBlob::new`] with an explicit tag policy.
    pub fn new_with<S: TaggedStructure, P: TagPolicy>(source: &S) -> Self {
        let mut data = AlignedBytes::new();
        data.extend_from_slice(bytes_of(source));
        let image = data.as_mut_slice();
        P::stamp(image, S::STYPE_OFFSET, S::STYPE);
        write_pnext(image, S::PNEXT_OFFSET, ptr::null_mut());
        Self {
            data,
            stype_offset: S::STYPE_OFFSET,
            pnext_offset: S::PNEXT_OFFSET,
        }
    }

    /// Copies any erased structure into owned storage, preserving its stored
    /// tag and zeroing the next-link.
    pub fn from_erased(source: &dyn ErasedStructure) -> Self {
        let bytes = unsafe { slice::from_raw_parts(source.data_ptr(), source.size()) };
        let mut data = AlignedBytes::new();
        data.extend_from_slice(bytes);
        let pnext_offset = source.pnext_offset();
        write_pnext(data.as_mut_slice(), pnext_offset, ptr::null_mut());
        Self {
            data,
            stype_offset: source.stype_offset(),
            pnext_offset,
        }
    }

    /// Pointer to the first byte of the owned image.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        debug_assert!(!self.data.is_empty());
        self.data.as_ptr()
    }

    /// Byte size of the owned image.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Byte offset of the tag field.
    #[must_use]
    pub fn stype_offset(&self) -> usize {
        self.stype_offset
    }

    /// Byte offset of the next-link field.
    #[must_use]
    pub fn pnext_offset(&self) -> usize {
        self.pnext_offset
    }

    /// Reads the stored tag.
    #[must_use]
    pub fn stype(&self) -> StructureType {
        read_stype(self.data.as_slice(), self.stype_offset)
    }

    /// Reads the stored next-link pointer.
    #[must_use]
    pub fn pnext(&self) -> *mut c_void {
        read_pnext(self.data.as_slice(), self.pnext_offset)
    }

    /// Reinterprets the owned bytes as `S`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::SizeMismatch`] if `size_of::<S>()` differs from
    /// the stored image's size.
    pub fn data_as<S: TaggedStructure>(&self) -> ChainResult<&S> {
        self.check_size::<S>()?;
        Ok(unsafe { &*self.data.as_ptr().cast::<S>() })
    }

    /// Reinterprets the owned bytes as a mutable `S`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::SizeMismatch`] if `size_of::<S>()` differs from
    /// the stored image's size.
    pub fn data_as_mut<S: TaggedStructure>(&mut self) -> ChainResult<&mut S> {
        self.check_size::<S>()?;
        Ok(unsafe { &mut *self.data.as_mut_ptr().cast::<S>() })
    }

    fn check_size<S>(&self) -> ChainResult<()> {
        if mem::size_of::<S>() == self.data.len() {
            Ok(())
        } else {
            Err(ChainError::SizeMismatch {
                expected: mem::size_of::<S>(),
                actual: self.data.len(),
            })
        }
    }
}

// Duplicating a blob duplicates the buffer and re-zeroes the next-link; an
// inherited link target is never preserved across a copy.
impl Clone for StructureBlob {
    fn clone(&self) -> Self {
        let mut data = self.data.clone();
        write_pnext(data.as_mut_slice(), self.pnext_offset, ptr::null_mut());
        Self {
            data,
            stype_offset: self.stype_offset,
            pnext_offset: self.pnext_offset,
        }
    }
}

unsafe impl ErasedStructure for StructureBlob {
    fn data_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    fn data_ptr_mut(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn stype_offset(&self) -> usize {
        self.stype_offset
    }

    fn pnext_offset(&self) -> usize {
        self.pnext_offset
    }
}
