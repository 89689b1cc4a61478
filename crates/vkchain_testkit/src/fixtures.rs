//! Fixture structure catalogue.
//!
//! Fake driver structures shaped like the real thing: a tag, a next-link and
//! some payload, `#[repr(C)]` throughout. Defaults pre-populate the canonical
//! tag (as wrapper catalogues do) and a null next-link, so fixtures are valid
//! chain members out of the box under either tag policy.

use std::ffi::c_void;
use std::ptr;
use vkchain_layout::{impl_tagged_structure, StructureType};

/// 32-bit boolean, as driver ABIs spell it.
pub type Bool32 = u32;

/// Canonical tag values for the fixture catalogue.
pub mod stypes {
    use vkchain_layout::StructureType;

    /// Tag for [`DeviceCreateInfo`](super::DeviceCreateInfo).
    pub const DEVICE_CREATE_INFO: StructureType = StructureType::new(3);
    /// Tag for [`Features2`](super::Features2).
    pub const FEATURES2: StructureType = StructureType::new(1000059000);
    /// Tag for [`MultiviewFeatures`](super::MultiviewFeatures).
    pub const MULTIVIEW_FEATURES: StructureType = StructureType::new(1000053001);
    /// Tag for [`ImagelessFramebufferFeatures`](super::ImagelessFramebufferFeatures).
    pub const IMAGELESS_FRAMEBUFFER_FEATURES: StructureType = StructureType::new(1000108000);
    /// Tag for [`MemoryModelFeatures`](super::MemoryModelFeatures).
    pub const MEMORY_MODEL_FEATURES: StructureType = StructureType::new(1000211000);
    /// Tag for [`MeshShaderFeatures`](super::MeshShaderFeatures) and its
    /// legacy layout.
    pub const MESH_SHADER_FEATURES: StructureType = StructureType::new(1000202000);
}

/// Chain head fixture mirroring a device-features query structure.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Features2 {
    /// Structure tag.
    pub s_type: StructureType,
    /// Next structure in the chain.
    pub p_next: *mut c_void,
    /// Payload.
    pub robust_buffer_access: Bool32,
    /// Payload.
    pub geometry_shader: Bool32,
    /// Payload.
    pub tessellation_shader: Bool32,
}

impl Default for Features2 {
    fn default() -> Self {
        Self {
            s_type: stypes::FEATURES2,
            p_next: ptr::null_mut(),
            robust_buffer_access: 0,
            geometry_shader: 0,
            tessellation_shader: 0,
        }
    }
}

impl_tagged_structure!(Features2, stypes::FEATURES2);

/// Alternate chain head fixture mirroring a creation-info structure.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DeviceCreateInfo {
    /// Structure tag.
    pub s_type: StructureType,
    /// Next structure in the chain.
    pub p_next: *mut c_void,
    /// Payload.
    pub flags: u32,
    /// Payload.
    pub queue_count: u32,
}

impl Default for DeviceCreateInfo {
    fn default() -> Self {
        Self {
            s_type: stypes::DEVICE_CREATE_INFO,
            p_next: ptr::null_mut(),
            flags: 0,
            queue_count: 0,
        }
    }
}

impl_tagged_structure!(DeviceCreateInfo, stypes::DEVICE_CREATE_INFO);

/// Extension fixture with two feature flags.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MultiviewFeatures {
    /// Structure tag.
    pub s_type: StructureType,
    /// Next structure in the chain.
    pub p_next: *mut c_void,
    /// Payload.
    pub multiview: Bool32,
    /// Payload.
    pub multiview_geometry_shader: Bool32,
}

impl Default for MultiviewFeatures {
    fn default() -> Self {
        Self {
            s_type: stypes::MULTIVIEW_FEATURES,
            p_next: ptr::null_mut(),
            multiview: 0,
            multiview_geometry_shader: 0,
        }
    }
}

impl_tagged_structure!(MultiviewFeatures, stypes::MULTIVIEW_FEATURES);

/// Extension fixture with a single feature flag.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ImagelessFramebufferFeatures {
    /// Structure tag.
    pub s_type: StructureType,
    /// Next structure in the chain.
    pub p_next: *mut c_void,
    /// Payload.
    pub imageless_framebuffer: Bool32,
}

impl Default for ImagelessFramebufferFeatures {
    fn default() -> Self {
        Self {
            s_type: stypes::IMAGELESS_FRAMEBUFFER_FEATURES,
            p_next: ptr::null_mut(),
            imageless_framebuffer: 0,
        }
    }
}

impl_tagged_structure!(
    ImagelessFramebufferFeatures,
    stypes::IMAGELESS_FRAMEBUFFER_FEATURES
);

/// Extension fixture with two feature flags.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MemoryModelFeatures {
    /// Structure tag.
    pub s_type: StructureType,
    /// Next structure in the chain.
    pub p_next: *mut c_void,
    /// Payload.
    pub memory_model: Bool32,
    /// Payload.
    pub memory_model_device_scope: Bool32,
}

impl Default for MemoryModelFeatures {
    fn default() -> Self {
        Self {
            s_type: stypes::MEMORY_MODEL_FEATURES,
            p_next: ptr::null_mut(),
            memory_model: 0,
            memory_model_device_scope: 0,
        }
    }
}

impl_tagged_structure!(MemoryModelFeatures, stypes::MEMORY_MODEL_FEATURES);

/// Extension fixture wider than the 24-byte common case.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MeshShaderFeatures {
    /// Structure tag.
    pub s_type: StructureType,
    /// Next structure in the chain.
    pub p_next: *mut c_void,
    /// Payload.
    pub task_shader: Bool32,
    /// Payload.
    pub mesh_shader: Bool32,
    /// Payload.
    pub max_draw_count: u32,
}

impl Default for MeshShaderFeatures {
    fn default() -> Self {
        Self {
            s_type: stypes::MESH_SHADER_FEATURES,
            p_next: ptr::null_mut(),
            task_shader: 0,
            mesh_shader: 0,
            max_draw_count: 0,
        }
    }
}

impl_tagged_structure!(MeshShaderFeatures, stypes::MESH_SHADER_FEATURES);

/// Older revision of [`MeshShaderFeatures`]: same tag, smaller layout.
/// Exists to exercise size-mismatch detection on lookups.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MeshShaderFeaturesLegacy {
    /// Structure tag.
    pub s_type: StructureType,
    /// Next structure in the chain.
    pub p_next: *mut c_void,
    /// Payload.
    pub task_shader: Bool32,
    /// Payload.
    pub mesh_shader: Bool32,
}

impl Default for MeshShaderFeaturesLegacy {
    fn default() -> Self {
        Self {
            s_type: stypes::MESH_SHADER_FEATURES,
            p_next: ptr::null_mut(),
            task_shader: 0,
            mesh_shader: 0,
        }
    }
}

impl_tagged_structure!(MeshShaderFeaturesLegacy, stypes::MESH_SHADER_FEATURES);
