//! Driver-walk simulation.
//!
//! A driver consumes a finished chain by starting at the head's address and
//! following next-links, dispatching on each structure's tag. These helpers
//! replay that walk over raw memory so tests can verify what the driver
//! would see.

use std::ffi::c_void;
use vkchain_layout::StructureType;

/// The common prefix every catalogue structure starts with: tag then
/// next-link. Mirrors the driver's base structure view of a chain member.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BaseStructure {
    /// Structure tag.
    pub s_type: StructureType,
    /// Next structure in the chain.
    pub p_next: *mut c_void,
}

/// Walks the chain starting at `head`, collecting every tag in link order.
///
/// # Safety
///
/// `head` must be null or point to a live structure whose layout starts with
/// the [`BaseStructure`] prefix, and every reachable next-link must do the
/// same. This mirrors exactly what the driver assumes of a handed-off chain.
#[must_use]
pub unsafe fn collect_tags(head: *const c_void) -> Vec<StructureType> {
    let mut tags = Vec::new();
    let mut cursor = head.cast::<BaseStructure>();
    while !cursor.is_null() {
        let base = &*cursor;
        tags.push(base.s_type);
        cursor = base.p_next.cast_const().cast();
    }
    tags
}

/// Number of structures reachable from `head`, the head included.
///
/// # Safety
///
/// Same contract as [`collect_tags`].
#[must_use]
pub unsafe fn chain_len(head: *const c_void) -> usize {
    collect_tags(head).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use std::ptr;

    #[test]
    fn walk_of_null_is_empty() {
        let tags = unsafe { collect_tags(ptr::null()) };
        assert!(tags.is_empty());
    }

    #[test]
    fn walk_follows_hand_built_links() {
        let mut tail = MultiviewFeatures::default();
        let mut head = Features2 {
            p_next: ptr::addr_of_mut!(tail).cast(),
            ..Default::default()
        };
        let tags = unsafe { collect_tags(ptr::addr_of_mut!(head).cast()) };
        assert_eq!(tags, vec![stypes::FEATURES2, stypes::MULTIVIEW_FEATURES]);
        assert_eq!(unsafe { chain_len(ptr::addr_of_mut!(head).cast()) }, 2);
    }
}
