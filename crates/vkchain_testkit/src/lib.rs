//! # vkchain Testkit
//!
//! Test utilities for vkchain.
//!
//! This crate provides:
//! - A fixture catalogue of fake driver structures with the Vulkan field
//!   shape (`s_type`, `p_next`, payload)
//! - Property-based test generators using proptest
//! - A driver-walk simulator that follows next-links by tag
//!
//! Real projects bring their own structure catalogue; these fixtures exist so
//! the chain machinery can be exercised without a graphics API dependency.

pub mod fixtures;
pub mod generators;
pub mod walker;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::walker::*;
}
