//! The compile-time layout description trait.

use crate::types::StructureType;

/// Describes one concrete driver structure layout.
///
/// Implementations map a concrete type to its canonical tag value and the
/// byte offsets of its tag and next-link fields. The chain machinery never
/// performs field arithmetic of its own; everything flows through these
/// constants.
///
/// The `Copy` bound doubles as the plain-data precondition: a type with owned
/// resources (drop glue) cannot implement `Copy`, so structures copied into
/// owning blobs are guaranteed trivially destructible at compile time.
///
/// # Safety
///
/// Implementors must guarantee:
///
/// - the type is `#[repr(C)]` with the exact byte layout the external
///   consumer expects;
/// - `STYPE_OFFSET + 4 <= size_of::<Self>()` and the field at that offset is
///   the 32-bit structure type tag;
/// - `PNEXT_OFFSET + size_of::<*mut c_void>() <= size_of::<Self>()` and the
///   field at that offset is the pointer-sized next link;
/// - `STYPE` is the canonical tag for this layout in the target catalogue.
pub unsafe trait TaggedStructure: Copy + Sized + 'static {
    /// Canonical tag for this layout.
    const STYPE: StructureType;
    /// Byte offset of the tag field.
    const STYPE_OFFSET: usize;
    /// Byte offset of the next-link field.
    const PNEXT_OFFSET: usize;
}

/// Implements [`TaggedStructure`] for a structure whose tag and next-link
/// fields are named `s_type` and `p_next`.
///
/// This is the per-type registration step a generated catalogue would emit
/// once for every structure it defines:
///
/// ```
/// use std::ffi::c_void;
/// use vkchain_layout::{impl_tagged_structure, StructureType};
///
/// #[repr(C)]
/// #[derive(Clone, Copy)]
/// struct FenceCreateInfo {
///     s_type: StructureType,
///     p_next: *mut c_void,
///     flags: u32,
/// }
///
/// impl_tagged_structure!(FenceCreateInfo, StructureType::new(8));
/// ```
#[macro_export]
macro_rules! impl_tagged_structure {
    ($ty:ty, $stype:expr) => {
        unsafe impl $crate::TaggedStructure for $ty {
            const STYPE: $crate::StructureType = $stype;
            const STYPE_OFFSET: usize = ::std::mem::offset_of!($ty, s_type);
            const PNEXT_OFFSET: usize = ::std::mem::offset_of!($ty, p_next);
        }
    };
}
