//! # vkchain Layout
//!
//! Structure layout protocol for vkchain.
//!
//! Extension structures consumed by a Vulkan-style driver share a common
//! shape: a 32-bit *structure type* tag and a pointer-sized *next link*
//! (`pNext`) at fixed byte offsets, followed by opaque payload. This crate
//! defines how those layouts are described to the chain-building machinery:
//!
//! - [`StructureType`] - the tag value identifying a concrete layout
//! - [`TaggedStructure`] - maps a concrete type to its canonical tag and
//!   field offsets, resolved at compile time
//! - [`fields`] - bounds-checked accessors for the two distinguished fields
//!   inside a raw byte image
//! - [`TagPolicy`] - the substitutable tag-stamping primitive, for catalogues
//!   whose constructors already populate the tag field
//!
//! The catalogue of concrete structure definitions is external; this crate
//! never defines driver layouts itself.

mod fields;
mod policy;
mod tagged;
mod types;

pub use fields::{read_pnext, read_stype, write_pnext, write_stype, PNEXT_FIELD_SIZE, STYPE_FIELD_SIZE};
pub use policy::{TagPolicy, TrustTag, WriteTag};
pub use tagged::TaggedStructure;
pub use types::StructureType;
