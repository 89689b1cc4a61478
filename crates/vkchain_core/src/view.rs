//! Non-owning type-erased view over one caller-owned structure.

use crate::erased::ErasedStructure;
use crate::error::{ChainError, ChainResult};
use std::ffi::c_void;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;
use std::slice;
use vkchain_layout::{read_pnext, read_stype, write_stype, StructureType, TaggedStructure};

/// A non-owning, type-erased view over one externally-owned structure.
///
/// The view records only a descriptor - address, size and the two field
/// offsets. It never copies structure bytes; cloning a view produces another
/// alias of the same storage.
///
/// The `'a` borrow ties the view to the referenced structure, which must stay
/// alive and unmoved for as long as the view (or any chain it was appended
/// to) exists.
#[derive(Debug)]
pub struct StructureRef<'a> {
    data: NonNull<u8>,
    size: usize,
    stype_offset: usize,
    pnext_offset: usize,
    _marker: PhantomData<&'a mut [u8]>,
}

impl<'a> StructureRef<'a> {
    /// Creates a view over `structure` without touching its bytes.
    pub fn new<S: TaggedStructure>(structure: &'a mut S) -> Self {
        Self {
            data: NonNull::from(structure).cast::<u8>(),
            size: mem::size_of::<S>(),
            stype_offset: S::STYPE_OFFSET,
            pnext_offset: S::PNEXT_OFFSET,
            _marker: PhantomData,
        }
    }

    /// Creates a view over `structure` and writes the canonical tag into its
    /// tag field.
    ///
    /// Mutating caller-owned memory is an explicit, opt-in operation here;
    /// [`StructureRef::new`] never does it silently.
    pub fn stamped<S: TaggedStructure>(structure: &'a mut S) -> Self {
        let mut view = Self::new(structure);
        write_stype(view.bytes_mut(), S::STYPE_OFFSET, S::STYPE);
        view
    }

    /// Pointer to the first byte of the viewed structure.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// Byte size of the viewed structure.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
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

    /// Reads the tag currently stored in the viewed structure.
    #[must_use]
    pub fn stype(&self) -> StructureType {
        read_stype(self.bytes(), self.stype_offset)
    }

    /// Reads the next-link pointer currently stored in the viewed structure.
    #[must_use]
    pub fn pnext(&self) -> *mut c_void {
        read_pnext(self.bytes(), self.pnext_offset)
    }

    /// Reinterprets the viewed bytes as `S`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::SizeMismatch`] if `size_of::<S>()` differs from
    /// the viewed structure's size.
    pub fn data_as<S: TaggedStructure>(&self) -> ChainResult<&S> {
        self.check_size::<S>()?;
        debug_assert_eq!(self.data.as_ptr() as usize % mem::align_of::<S>(), 0);
        Ok(unsafe { self.data.cast::<S>().as_ref() })
    }

    /// Reinterprets the viewed bytes as a mutable `S`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::SizeMismatch`] if `size_of::<S>()` differs from
    /// the viewed structure's size.
    pub fn data_as_mut<S: TaggedStructure>(&mut self) -> ChainResult<&mut S> {
        self.check_size::<S>()?;
        debug_assert_eq!(self.data.as_ptr() as usize % mem::align_of::<S>(), 0);
        Ok(unsafe { self.data.cast::<S>().as_mut() })
    }

    fn check_size<S>(&self) -> ChainResult<()> {
        if mem::size_of::<S>() == self.size {
            Ok(())
        } else {
            Err(ChainError::SizeMismatch {
                expected: mem::size_of::<S>(),
                actual: self.size,
            })
        }
    }

    fn bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.size) }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), self.size) }
    }
}

// A clone is a structural alias of the same caller-owned storage, never a
// copy of the bytes.
impl Clone for StructureRef<'_> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            size: self.size,
            stype_offset: self.stype_offset,
            pnext_offset: self.pnext_offset,
            _marker: PhantomData,
        }
    }
}

unsafe impl ErasedStructure for StructureRef<'_> {
    fn data_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    fn data_ptr_mut(&mut self) -> *mut u8 {
        self.data.as_ptr()
    }

    fn size(&self) -> usize {
        self.size
    }

    fn stype_offset(&self) -> usize {
        self.stype_offset
    }

    fn pnext_offset(&self) -> usize {
        self.pnext_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;
    use vkchain_testkit::fixtures::*;

    #[test]
    fn view_describes_caller_storage() {
        let mut imageless = ImagelessFramebufferFeatures::default();
        let mut features = MultiviewFeatures::default();
        let imageless_addr = ptr::addr_of_mut!(imageless) as usize;
        features.p_next = imageless_addr as *mut _;
        let features_addr = ptr::addr_of!(features) as usize;

        let view = StructureRef::new(&mut features);
        assert_eq!(view.as_ptr() as usize, features_addr);
        assert_eq!(view.size(), mem::size_of::<MultiviewFeatures>());
        assert_eq!(view.stype(), stypes::MULTIVIEW_FEATURES);
        assert_eq!(view.pnext() as usize, imageless_addr);
    }

    #[test]
    fn new_does_not_touch_the_tag() {
        let mut features = MultiviewFeatures {
            s_type: StructureType::new(-1),
            ..Default::default()
        };
        let view = StructureRef::new(&mut features);
        assert_eq!(view.stype(), StructureType::new(-1));
    }

    #[test]
    fn stamped_overwrites_the_tag() {
        let mut features = MultiviewFeatures {
            s_type: StructureType::new(-1),
            ..Default::default()
        };
        let view = StructureRef::stamped(&mut features);
        assert_eq!(view.stype(), stypes::MULTIVIEW_FEATURES);
    }

    #[test]
    fn clone_aliases_the_same_storage() {
        let mut features = MultiviewFeatures::default();
        let view = StructureRef::new(&mut features);
        let alias = view.clone();
        assert_eq!(view.as_ptr(), alias.as_ptr());
        assert_eq!(view.size(), alias.size());
    }

    #[test]
    fn data_as_returns_the_original_structure() {
        let mut features = MultiviewFeatures {
            multiview: 1,
            ..Default::default()
        };
        let features_addr = ptr::addr_of!(features) as usize;
        let view = StructureRef::new(&mut features);
        let read = view.data_as::<MultiviewFeatures>().unwrap();
        assert_eq!(read.multiview, 1);
        assert_eq!(read as *const _ as usize, features_addr);
    }

    #[test]
    fn data_as_mut_writes_through_to_caller_storage() {
        let mut features = MultiviewFeatures::default();
        let mut view = StructureRef::new(&mut features);
        view.data_as_mut::<MultiviewFeatures>().unwrap().multiview = 1;
        drop(view);
        assert_eq!(features.multiview, 1);
    }

    #[test]
    fn data_as_rejects_wrong_size() {
        let mut features = MultiviewFeatures::default();
        let view = StructureRef::new(&mut features);
        let err = view.data_as::<MeshShaderFeatures>().unwrap_err();
        assert_eq!(
            err,
            crate::ChainError::SizeMismatch {
                expected: mem::size_of::<MeshShaderFeatures>(),
                actual: mem::size_of::<MultiviewFeatures>(),
            }
        );
    }
}
