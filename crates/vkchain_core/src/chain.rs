//! Non-owning structure chain over caller-owned storage.

use crate::erased::ErasedStructure;
use crate::error::{ChainError, ChainResult};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::mem;
use std::ptr;
use std::slice;
use tracing::trace;
use vkchain_layout::{write_pnext, StructureType, TagPolicy, TaggedStructure, WriteTag};

/// One chain entry: where the structure lives and where its fields are.
#[derive(Debug, Clone, Copy)]
struct Link {
    addr: *mut u8,
    size: usize,
    stype_offset: usize,
    pnext_offset: usize,
}

/// A non-owning chain of structures linked through their next-link fields.
///
/// The chain owns only the head's value storage (boxed, so its address
/// survives moves of the chain itself). Every appended structure remains
/// owned by the caller; the `'chain` borrow requires each of them to stay
/// alive and unmoved for the chain's whole lifetime. The chain never copies
/// payload bytes.
///
/// Appending writes the canonical tag into the appended structure (subject to
/// the tag policy `P`) and links the previous tail to it. The appended
/// structure's own next-link is left untouched, so a terminating chain needs
/// its final structure to carry a null link - catalogue constructors
/// conventionally guarantee that.
///
/// Hand the built chain to the driver via [`StructureChain::head`].
#[derive(Debug)]
pub struct StructureChain<'chain, H: TaggedStructure, P: TagPolicy = WriteTag> {
    head: Box<H>,
    links: Vec<Link>,
    index: HashMap<StructureType, usize>,
    _policy: PhantomData<P>,
    _records: PhantomData<&'chain mut ()>,
}

impl<H: TaggedStructure + Default, P: TagPolicy> StructureChain<'_, H, P> {
    /// Creates a chain around a defaulted head.
    #[must_use]
    pub fn new() -> Self {
        Self::with_head(H::default())
    }
}

impl<H: TaggedStructure + Default, P: TagPolicy> Default for StructureChain<'_, H, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'chain, H: TaggedStructure, P: TagPolicy> StructureChain<'chain, H, P> {
    /// Creates a chain around a copy of `head`, stamping its tag and nulling
    /// its next-link.
    #[must_use]
    pub fn with_head(head: H) -> Self {
        let mut head = Box::new(head);
        let head_ptr = ptr::addr_of_mut!(*head).cast::<u8>();
        {
            let bytes = unsafe { slice::from_raw_parts_mut(head_ptr, mem::size_of::<H>()) };
            P::stamp(bytes, H::STYPE_OFFSET, H::STYPE);
            write_pnext(bytes, H::PNEXT_OFFSET, ptr::null_mut());
        }
        let links = vec![Link {
            addr: head_ptr,
            size: mem::size_of::<H>(),
            stype_offset: H::STYPE_OFFSET,
            pnext_offset: H::PNEXT_OFFSET,
        }];
        let mut index = HashMap::new();
        index.insert(H::STYPE, 0);
        Self {
            head,
            links,
            index,
            _policy: PhantomData,
            _records: PhantomData,
        }
    }

    /// Appends a caller-owned structure to the chain.
    ///
    /// Stamps the canonical tag into `next`, points the current tail's
    /// next-link at it and registers it in the tag index (last-write-wins on
    /// duplicate tags).
    pub fn append<S: TaggedStructure>(&mut self, next: &'chain mut S) {
        let addr = ptr::addr_of_mut!(*next).cast::<u8>();
        self.append_raw(addr, mem::size_of::<S>(), S::STYPE_OFFSET, S::PNEXT_OFFSET, S::STYPE);
    }

    /// Appends a type-erased structure. Behaves exactly like
    /// [`StructureChain::append`].
    pub fn append_erased(&mut self, next: &'chain mut dyn ErasedStructure) {
        let stype = next.stype();
        let size = next.size();
        let stype_offset = next.stype_offset();
        let pnext_offset = next.pnext_offset();
        self.append_raw(next.data_ptr_mut(), size, stype_offset, pnext_offset, stype);
    }

    fn append_raw(
        &mut self,
        addr: *mut u8,
        size: usize,
        stype_offset: usize,
        pnext_offset: usize,
        stype: StructureType,
    ) {
        {
            let bytes = unsafe { slice::from_raw_parts_mut(addr, size) };
            P::stamp(bytes, stype_offset, stype);
        }

        let tail = self.links.len() - 1;
        let tail_ptr = self.link_ptr_mut(tail);
        let tail_link = self.links[tail];
        {
            let bytes = unsafe { slice::from_raw_parts_mut(tail_ptr, tail_link.size) };
            write_pnext(bytes, tail_link.pnext_offset, addr.cast());
        }

        self.links.push(Link {
            addr,
            size,
            stype_offset,
            pnext_offset,
        });
        self.index.insert(stype, self.links.len() - 1);
        trace!(%stype, index = self.links.len() - 1, "appended structure to chain");
    }

    /// Discards every entry except the head, nulls the head's next-link and
    /// rebuilds the tag index to contain only the head.
    pub fn reset(&mut self) {
        self.links.truncate(1);
        let head_ptr = self.link_ptr_mut(0);
        let bytes = unsafe { slice::from_raw_parts_mut(head_ptr, mem::size_of::<H>()) };
        write_pnext(bytes, H::PNEXT_OFFSET, ptr::null_mut());
        self.index.clear();
        self.index.insert(H::STYPE, 0);
        trace!("reset chain to head-only state");
    }

    /// The head structure. Its address is the chain's entry point for the
    /// driver.
    #[must_use]
    pub fn head(&self) -> &H {
        &self.head
    }

    /// Mutable access to the head. Overwriting the head's next-link here
    /// breaks the chain; use [`StructureChain::reset`] to unlink instead.
    pub fn head_mut(&mut self) -> &mut H {
        &mut self.head
    }

    /// Looks up the chain entry with `S`'s canonical tag and reinterprets it
    /// as `S`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::TagNotFound`] if no entry carries the tag, or
    /// [`ChainError::SizeMismatch`] if the stored entry's size differs from
    /// `size_of::<S>()`.
    pub fn get<S: TaggedStructure>(&self) -> ChainResult<&S> {
        let idx = self.lookup::<S>()?;
        let ptr = self.link_ptr(idx).cast::<S>();
        debug_assert_eq!(ptr as usize % mem::align_of::<S>(), 0);
        Ok(unsafe { &*ptr })
    }

    /// Mutable variant of [`StructureChain::get`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`StructureChain::get`].
    pub fn get_mut<S: TaggedStructure>(&mut self) -> ChainResult<&mut S> {
        let idx = self.lookup::<S>()?;
        let ptr = self.link_ptr_mut(idx).cast::<S>();
        debug_assert_eq!(ptr as usize % mem::align_of::<S>(), 0);
        Ok(unsafe { &mut *ptr })
    }

    /// Number of structures in the chain, including the head.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
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

    // The head lives in a Box the chain owns; its pointer is re-derived on
    // every access so handed-out `&mut H` borrows stay the freshest ones.
    fn link_ptr(&self, idx: usize) -> *const u8 {
        if idx == 0 {
            ptr::addr_of!(*self.head).cast()
        } else {
            self.links[idx].addr
        }
    }

    fn link_ptr_mut(&mut self, idx: usize) -> *mut u8 {
        if idx == 0 {
            ptr::addr_of_mut!(*self.head).cast()
        } else {
            self.links[idx].addr
        }
    }
}
