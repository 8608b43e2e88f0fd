//! Single-threaded scan backend

use crate::core::types::Mat4;
use crate::events::CullState;
use crate::math::Aabb;

use super::backend::CullingBackend;
use super::{cull_one, world_bounds_one, FrustumSnapshot};

/// Plain scan over all slots; the baseline the parallel backend must match.
#[derive(Debug, Default)]
pub struct SequentialBackend;

impl CullingBackend for SequentialBackend {
    fn refresh_world_bounds(&self, local: &[Aabb], local_to_world: &[Mat4], world: &mut [Aabb]) {
        debug_assert_eq!(local.len(), world.len());
        for ((world, local), matrix) in world.iter_mut().zip(local).zip(local_to_world) {
            *world = world_bounds_one(local, matrix);
        }
    }

    fn cull(&self, snapshot: &FrustumSnapshot, world: &[Aabb], out: &mut [CullState]) {
        debug_assert_eq!(world.len(), out.len());
        for (out, world) in out.iter_mut().zip(world) {
            *out = cull_one(snapshot, world);
        }
    }
}
