//! # vkchain Core
//!
//! Type-erased structure views, blobs and pNext chains.
//!
//! Vulkan-style APIs extend their entry points through chains of structures
//! linked by `pNext` fields and dispatched on `sType` tags. This crate builds
//! those chains without naming concrete layouts, in two ownership flavours:
//!
//! - [`StructureRef`] / [`StructureChain`] - non-owning; structures stay in
//!   caller storage and must outlive the chain, encoded as a borrow.
//! - [`StructureBlob`] / [`StructureChainBlob`] - owning; structures are
//!   copied into internally managed aligned buffers, producing a
//!   self-contained, relocatable chain image.
//!
//! Concrete layouts are described through the
//! [`TaggedStructure`] protocol from `vkchain_layout`; this crate never
//! defines driver structures itself.
//!
//! ## Example
//!
//! ```
//! use vkchain_core::StructureChainBlob;
//! use vkchain_testkit::fixtures::{Features2, MultiviewFeatures};
//!
//! let mut chain: StructureChainBlob<Features2> = StructureChainBlob::new();
//! chain.append(&MultiviewFeatures { multiview: 1, ..Default::default() });
//!
//! // `chain.head()` is the address the driver walks.
//! assert_eq!(chain.get::<MultiviewFeatures>().unwrap().multiview, 1);
//! ```

mod blob;
mod buffer;
mod chain;
mod chain_blob;
mod erased;
mod error;
mod view;

pub use blob::StructureBlob;
pub use chain::StructureChain;
pub use chain_blob::StructureChainBlob;
pub use erased::ErasedStructure;
pub use error::{ChainError, ChainResult};
pub use view::StructureRef;

// The layout protocol is part of this crate's public surface.
pub use vkchain_layout::{
    StructureType, TagPolicy, TaggedStructure, TrustTag, WriteTag,
};
