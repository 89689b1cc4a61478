//! Property-based test generators using proptest.
//!
//! Strategies produce fixture structures with canonical tags and null
//! next-links, varying only payload, so generated values are always valid
//! chain members.

use crate::fixtures::{Bool32, MemoryModelFeatures, MeshShaderFeatures, MultiviewFeatures};
use proptest::prelude::*;

/// Strategy for driver-style 32-bit booleans.
pub fn bool32_strategy() -> impl Strategy<Value = Bool32> {
    prop_oneof![Just(0u32), Just(1u32)]
}

/// Strategy for [`MultiviewFeatures`] payloads.
pub fn multiview_features_strategy() -> impl Strategy<Value = MultiviewFeatures> {
    (bool32_strategy(), bool32_strategy()).prop_map(|(multiview, geometry)| MultiviewFeatures {
        multiview,
        multiview_geometry_shader: geometry,
        ..Default::default()
    })
}

/// Strategy for [`MemoryModelFeatures`] payloads.
pub fn memory_model_features_strategy() -> impl Strategy<Value = MemoryModelFeatures> {
    (bool32_strategy(), bool32_strategy()).prop_map(|(model, scope)| MemoryModelFeatures {
        memory_model: model,
        memory_model_device_scope: scope,
        ..Default::default()
    })
}

/// Strategy for [`MeshShaderFeatures`] payloads.
pub fn mesh_shader_features_strategy() -> impl Strategy<Value = MeshShaderFeatures> {
    (bool32_strategy(), bool32_strategy(), 0u32..1024).prop_map(
        |(task, mesh, max_draw_count)| MeshShaderFeatures {
            task_shader: task,
            mesh_shader: mesh,
            max_draw_count,
            ..Default::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::stypes;

    proptest! {
        #[test]
        fn generated_fixtures_are_valid_chain_members(features in multiview_features_strategy()) {
            prop_assert_eq!(features.s_type, stypes::MULTIVIEW_FEATURES);
            prop_assert!(features.p_next.is_null());
            prop_assert!(features.multiview <= 1);
        }

        #[test]
        fn bool32_is_zero_or_one(b in bool32_strategy()) {
            prop_assert!(b <= 1);
        }
    }
}
