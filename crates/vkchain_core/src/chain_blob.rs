//! Owning structure chain stored in one contiguous relocatable buffer.

use crate::buffer::AlignedBytes;
use crate::erased::{bytes_of, ErasedStructure};
use crate::error::{ChainError, ChainResult};
use std::collections::HashMap;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::mem;
use std::ptr;
use std::slice;
use tracing::trace;
use vkchain_layout::{read_pnext, write_pnext, StructureType, TagPolicy, TaggedStructure, WriteTag};

/// One chain entry, addressed by buffer offset. Offsets are the bookkeeping
/// truth; absolute addresses exist only inside the buffer's next-link fields
/// and are rewritten after every mutation.
#[derive(Debug, Clone, Copy)]
struct BlobLink {
    offset: usize,
    size: usize,
    stype_offset: usize,
    pnext_offset: usize,
}

/// An owning chain whose structures live as byte copies in one contiguous
/// buffer.
///
/// Every append copies the new structure to the end of the buffer and then
/// re-derives and rewrites every next-link from the buffer's current base
/// address, since growth may relocate the whole image. The resulting memory
/// block is fully self-contained: it can be moved, persisted or handed to the
/// driver independently of the structures it was built from.
///
/// The one exception to self-containment is the tail: the next-link value
/// carried by the appended structure is preserved as an external continuation
/// address, so an owning chain's tail may point outside its own buffer at the
/// boundary with caller-managed chains.
///
/// Appending is O(total chain size) because of the relink pass; that is the
/// price of a relocatable single-allocation image.
#[derive(Debug)]
pub struct StructureChainBlob<H: TaggedStructure, P: TagPolicy = WriteTag> {
    buffer: AlignedBytes,
    links: Vec<BlobLink>,
    index: HashMap<StructureType, usize>,
    _head: PhantomData<H>,
    _policy: PhantomData<P>,
}

impl<H: TaggedStructure + Default, P: TagPolicy> StructureChainBlob<H, P> {
    /// Creates a chain blob holding a defaulted head.
    #[must_use]
    pub fn new() -> Self {
        Self::with_head(H::default())
    }
}

impl<H: TaggedStructure + Default, P: TagPolicy> Default for StructureChainBlob<H, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: TaggedStructure, P: TagPolicy> StructureChainBlob<H, P> {
    /// Creates a chain blob holding a copy of `head`, with its tag stamped
    /// and its next-link nulled.
    #[must_use]
    pub fn with_head(head: H) -> Self {
        let mut buffer = AlignedBytes::new();
        buffer.extend_from_slice(bytes_of(&head));
        let image = buffer.as_mut_slice();
        P::stamp(image, H::STYPE_OFFSET, H::STYPE);
        write_pnext(image, H::PNEXT_OFFSET, ptr::null_mut());

        let links = vec![BlobLink {
            offset: 0,
            size: mem::size_of::<H>(),
            stype_offset: H::STYPE_OFFSET,
            pnext_offset: H::PNEXT_OFFSET,
        }];
        let mut index = HashMap::new();
        index.insert(H::STYPE, 0);
        Self {
            buffer,
            links,
            index,
            _head: PhantomData,
            _policy: PhantomData,
        }
    }

    /// Copies `next` into the buffer and relinks the whole chain.
    ///
    /// The canonical tag is stamped into the copy (subject to the tag policy)
    /// and the copy's next-link becomes the chain's tail continuation: the
    /// next-link value `next` carried at append time, preserved verbatim.
    pub fn append<S: TaggedStructure>(&mut self, next: &S) {
        let image = bytes_of(next);
        let continuation = read_pnext(image, S::PNEXT_OFFSET);
        self.append_bytes(image, S::STYPE_OFFSET, S::PNEXT_OFFSET, S::STYPE, continuation);
    }

    /// Appends a type-erased structure. Behaves exactly like
    /// [`StructureChainBlob::append`].
    pub fn append_erased(&mut self, next: &dyn ErasedStructure) {
        let image = unsafe { slice::from_raw_parts(next.data_ptr(), next.size()) };
        self.append_bytes(
            image,
            next.stype_offset(),
            next.pnext_offset(),
            next.stype(),
            next.pnext(),
        );
    }

    fn append_bytes(
        &mut self,
        data: &[u8],
        stype_offset: usize,
        pnext_offset: usize,
        stype: StructureType,
        continuation: *mut c_void,
    ) {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(data);
        self.links.push(BlobLink {
            offset,
            size: data.len(),
            stype_offset,
            pnext_offset,
        });
        P::stamp(
            &mut self.buffer.as_mut_slice()[offset..offset + data.len()],
            stype_offset,
            stype,
        );

        self.relink(continuation);

        self.index.insert(stype, self.links.len() - 1);
        trace!(
            %stype,
            index = self.links.len() - 1,
            bytes = self.buffer.len(),
            "appended structure to chain blob"
        );
    }

    /// Rewrites every next-link from the buffer's current base address. The
    /// tail receives `continuation`; all other links must land inside the
    /// buffer, which checked builds verify.
    fn relink(&mut self, continuation: *mut c_void) {
        let base = self.buffer.as_ptr() as usize;
        let image = self.buffer.as_mut_slice();

        let tail = self.links.len() - 1;
        for i in 0..tail {
            let link = self.links[i];
            let successor = base + self.links[i + 1].offset;
            write_pnext(
                &mut image[link.offset..link.offset + link.size],
                link.pnext_offset,
                successor as *mut c_void,
            );
        }
        let tail_link = self.links[tail];
        write_pnext(
            &mut image[tail_link.offset..tail_link.offset + tail_link.size],
            tail_link.pnext_offset,
            continuation,
        );

        #[cfg(debug_assertions)]
        for link in &self.links[..tail] {
            let target =
                read_pnext(&image[link.offset..link.offset + link.size], link.pnext_offset) as usize;
            debug_assert!(
                target >= base && target < base + image.len(),
                "next-link escaped the chain buffer"
            );
        }
    }

    /// Discards everything except the head's bytes, nulls the head's
    /// next-link and rebuilds the tag index to contain only the head.
    pub fn reset(&mut self) {
        let head = self.links[0];
        self.buffer.truncate(head.size);
        self.links.truncate(1);
        write_pnext(self.buffer.as_mut_slice(), head.pnext_offset, ptr::null_mut());
        self.index.clear();
        self.index.insert(H::STYPE, 0);
        trace!("reset chain blob to head-only state");
    }

    /// The in-buffer head structure. Its address is the chain's entry point
    /// for the driver.
    #[must_use]
    pub fn head(&self) -> &H {
        debug_assert_eq!(self.links[0].size, mem::size_of::<H>());
        unsafe { &*self.buffer.as_ptr().cast::<H>() }
    }

    /// Mutable access to the in-buffer head. Overwriting the head's next-link
    /// here breaks the chain; it is rewritten on the next append.
    pub fn head_mut(&mut self) -> &mut H {
        debug_assert_eq!(self.links[0].size, mem::size_of::<H>());
        unsafe { &mut *self.buffer.as_mut_ptr().cast::<H>() }
    }

    /// Looks up the in-buffer entry with `S`'s canonical tag and
    /// reinterprets it as `S`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::TagNotFound`] if no entry carries the tag, or
    /// [`ChainError::SizeMismatch`] if the stored entry's size differs from
    /// `size_of::<S>()`.
    pub fn get<S: TaggedStructure>(&self) -> ChainResult<&S> {
        let idx = self.lookup::<S>()?;
        let ptr = unsafe { self.buffer.as_ptr().add(self.links[idx].offset) }.cast::<S>();
        debug_assert_eq!(ptr as usize % mem::align_of::<S>(), 0);
        Ok(unsafe { &*ptr })
    }

    /// Mutable variant of [`StructureChainBlob::get`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`StructureChainBlob::get`].
    pub fn get_mut<S: TaggedStructure>(&mut self) -> ChainResult<&mut S> {
        let idx = self.lookup::<S>()?;
        let ptr = unsafe { self.buffer.as_mut_ptr().add(self.links[idx].offset) }.cast::<S>();
        debug_assert_eq!(ptr as usize % mem::align_of::<S>(), 0);
        Ok(unsafe { &mut *ptr })
    }

    /// Number of structures in the chain, including the head.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// The raw chain image: all member structures back to back, links
    /// materialized. Self-contained except for the tail's continuation.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    fn lookup<S: TaggedStructure>(&self) -> ChainResult<usize> {
        let &idx = self
            .index
            .get(&S::STYPE)
            .ok_or(ChainError::TagNotFound { stype: S::STYPE })?;
        if self.links[idx].size != mem::size_of::<S>() {
            return Err(ChainError::SizeMismatch {
                expected: mem::size_of::<S>(),
                actual: self.links[idx].size,
            });
        }
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::StructureBlob;
    use crate::view::StructureRef;
    use proptest::prelude::*;
    use vkchain_testkit::fixtures::*;
    use vkchain_testkit::generators::*;
    use vkchain_testkit::walker;

    type FeatureChainBlob = StructureChainBlob<Features2>;

    #[test]
    fn append_copies_into_the_buffer() {
        let multiview = MultiviewFeatures {
            multiview: 1,
            ..Default::default()
        };
        let imageless = ImagelessFramebufferFeatures::default();

        let mut chain = FeatureChainBlob::new();
        chain.append(&multiview);
        chain.append(&imageless);

        assert_eq!(
            chain.as_bytes().len(),
            mem::size_of::<Features2>()
                + mem::size_of::<MultiviewFeatures>()
                + mem::size_of::<ImagelessFramebufferFeatures>()
        );

        // The stored copy lives in the buffer, not at the source address.
        let stored = chain.get::<MultiviewFeatures>().unwrap();
        assert_ne!(
            stored as *const _ as usize,
            ptr::addr_of!(multiview) as usize
        );
        assert_eq!(stored.multiview, 1);
    }

    #[test]
    fn in_buffer_links_point_at_in_buffer_copies() {
        let multiview = MultiviewFeatures::default();
        let imageless = ImagelessFramebufferFeatures::default();

        let mut chain = FeatureChainBlob::new();
        chain.append(&multiview);
        chain.append(&imageless);

        let stored_multiview = chain.get::<MultiviewFeatures>().unwrap() as *const _ as usize;
        let stored_imageless =
            chain.get::<ImagelessFramebufferFeatures>().unwrap() as *const _ as usize;

        assert_eq!(chain.head().p_next as usize, stored_multiview);
        assert_eq!(
            chain.get::<MultiviewFeatures>().unwrap().p_next as usize,
            stored_imageless
        );
        assert!(chain
            .get::<ImagelessFramebufferFeatures>()
            .unwrap()
            .p_next
            .is_null());
    }

    #[test]
    fn relinking_survives_buffer_growth() {
        let mut chain = FeatureChainBlob::new();
        chain.append(&MultiviewFeatures::default());
        chain.append(&ImagelessFramebufferFeatures::default());
        chain.append(&MemoryModelFeatures::default());
        chain.append(&MeshShaderFeatures::default());

        let tags = unsafe { walker::collect_tags(ptr::addr_of!(*chain.head()).cast()) };
        assert_eq!(
            tags,
            vec![
                stypes::FEATURES2,
                stypes::MULTIVIEW_FEATURES,
                stypes::IMAGELESS_FRAMEBUFFER_FEATURES,
                stypes::MEMORY_MODEL_FEATURES,
                stypes::MESH_SHADER_FEATURES,
            ]
        );
    }

    #[test]
    fn tail_continuation_is_preserved() {
        let mut external = MemoryModelFeatures::default();
        let external_addr = ptr::addr_of_mut!(external) as usize;

        let multiview = MultiviewFeatures {
            p_next: external_addr as *mut _,
            ..Default::default()
        };
        let mut chain = FeatureChainBlob::new();
        chain.append(&multiview);
        assert_eq!(
            chain.get::<MultiviewFeatures>().unwrap().p_next as usize,
            external_addr
        );

        // A further append overwrites the old tail's link and the new tail
        // carries its own continuation (null here).
        chain.append(&ImagelessFramebufferFeatures::default());
        let stored_imageless =
            chain.get::<ImagelessFramebufferFeatures>().unwrap() as *const _ as usize;
        assert_eq!(
            chain.get::<MultiviewFeatures>().unwrap().p_next as usize,
            stored_imageless
        );
        assert!(chain
            .get::<ImagelessFramebufferFeatures>()
            .unwrap()
            .p_next
            .is_null());
    }

    #[test]
    fn reset_preserves_head_bytes() {
        let mut chain = FeatureChainBlob::with_head(Features2 {
            geometry_shader: 1,
            ..Default::default()
        });
        chain.append(&MultiviewFeatures::default());
        chain.head_mut().tessellation_shader = 1;
        chain.reset();

        assert_eq!(chain.link_count(), 1);
        assert_eq!(chain.as_bytes().len(), mem::size_of::<Features2>());
        assert_eq!(chain.head().geometry_shader, 1);
        assert_eq!(chain.head().tessellation_shader, 1);
        assert!(chain.head().p_next.is_null());
        assert_eq!(
            chain.get::<MultiviewFeatures>().unwrap_err(),
            ChainError::TagNotFound {
                stype: stypes::MULTIVIEW_FEATURES
            }
        );
    }

    #[test]
    fn append_stamps_canonical_tag_in_copy() {
        let multiview = MultiviewFeatures {
            s_type: StructureType::new(-1),
            ..Default::default()
        };
        let mut chain = FeatureChainBlob::new();
        chain.append(&multiview);
        assert_eq!(
            chain.get::<MultiviewFeatures>().unwrap().s_type,
            stypes::MULTIVIEW_FEATURES
        );
        // The source keeps its bogus tag; only the copy is stamped.
        assert_eq!(multiview.s_type, StructureType::new(-1));
    }

    #[test]
    fn duplicate_tag_is_last_write_wins_but_both_stay_linked() {
        let first = MultiviewFeatures {
            multiview: 0,
            ..Default::default()
        };
        let second = MultiviewFeatures {
            multiview: 1,
            ..Default::default()
        };

        let mut chain = FeatureChainBlob::new();
        chain.append(&first);
        chain.append(&second);

        assert_eq!(chain.get::<MultiviewFeatures>().unwrap().multiview, 1);
        let visited = unsafe { walker::chain_len(ptr::addr_of!(*chain.head()).cast()) };
        assert_eq!(visited, 3);
    }

    #[test]
    fn erased_appends_match_typed_appends() {
        let blob = StructureBlob::new(&MeshShaderFeatures {
            mesh_shader: 1,
            ..Default::default()
        });
        let mut memory_model = MemoryModelFeatures {
            memory_model: 1,
            ..Default::default()
        };
        let view = StructureRef::new(&mut memory_model);

        let mut chain = FeatureChainBlob::new();
        chain.append_erased(&blob);
        chain.append_erased(&view);

        assert_eq!(chain.get::<MeshShaderFeatures>().unwrap().mesh_shader, 1);
        assert_eq!(chain.get::<MemoryModelFeatures>().unwrap().memory_model, 1);
        let visited = unsafe { walker::chain_len(ptr::addr_of!(*chain.head()).cast()) };
        assert_eq!(visited, 3);
    }

    #[test]
    fn get_after_reappend_tracks_relocation() {
        let mut chain = FeatureChainBlob::new();
        chain.append(&MultiviewFeatures::default());

        // Whatever the allocator did underneath, lookups and links agree.
        chain.append(&MemoryModelFeatures::default());
        let stored = chain.get::<MultiviewFeatures>().unwrap() as *const _ as usize;
        assert_eq!(chain.head().p_next as usize, stored);
    }

    proptest! {
        #[test]
        fn walk_visits_appended_count_plus_head(features in prop::collection::vec(multiview_features_strategy(), 0..8)) {
            let mut chain = FeatureChainBlob::new();
            for f in &features {
                chain.append(f);
            }
            let visited = unsafe { walker::chain_len(ptr::addr_of!(*chain.head()).cast()) };
            prop_assert_eq!(visited, features.len() + 1);
            prop_assert_eq!(chain.link_count(), features.len() + 1);
        }

        #[test]
        fn appended_payload_survives_relocation(multiview in multiview_features_strategy(), memory in memory_model_features_strategy()) {
            let mut chain = FeatureChainBlob::new();
            chain.append(&multiview);
            chain.append(&memory);

            let stored = chain.get::<MultiviewFeatures>().unwrap();
            prop_assert_eq!(stored.multiview, multiview.multiview);
            prop_assert_eq!(stored.multiview_geometry_shader, multiview.multiview_geometry_shader);
            let stored = chain.get::<MemoryModelFeatures>().unwrap();
            prop_assert_eq!(stored.memory_model, memory.memory_model);
            prop_assert_eq!(stored.memory_model_device_scope, memory.memory_model_device_scope);
        }
    }
}
