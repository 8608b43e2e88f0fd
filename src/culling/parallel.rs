//! Rayon batch backend

use rayon::prelude::*;

use crate::core::types::Mat4;
use crate::events::CullState;
use crate::math::Aabb;

use super::backend::CullingBackend;
use super::{cull_one, world_bounds_one, FrustumSnapshot};

/// Batch size below which rayon stops splitting. Slots are cheap; splitting
/// finer than this costs more than it saves.
const MIN_BATCH: usize = 64;

/// Data-parallel scan over independent slots on the rayon pool.
///
/// The caller blocks until the batch completes; there is no cross-tick
/// pipelining and no mid-batch cancellation.
#[derive(Debug, Default)]
pub struct ParallelBackend;

impl CullingBackend for ParallelBackend {
    fn refresh_world_bounds(&self, local: &[Aabb], local_to_world: &[Mat4], world: &mut [Aabb]) {
        debug_assert_eq!(local.len(), world.len());
        world
            .par_iter_mut()
            .zip(local.par_iter())
            .zip(local_to_world.par_iter())
            .with_min_len(MIN_BATCH)
            .for_each(|((world, local), matrix)| {
                *world = world_bounds_one(local, matrix);
            });
    }

    fn cull(&self, snapshot: &FrustumSnapshot, world: &[Aabb], out: &mut [CullState]) {
        debug_assert_eq!(world.len(), out.len());
        out.par_iter_mut()
            .zip(world.par_iter())
            .with_min_len(MIN_BATCH)
            .for_each(|(out, world)| {
                *out = cull_one(snapshot, world);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::CameraView;
    use crate::core::types::Vec3;
    use crate::culling::SequentialBackend;
    use crate::events::LodTable;
    use crate::math::Aabb;

    /// Deterministic scatter of boxes around the origin, mixing sizes and
    /// a fraction placed far outside the frustum.
    fn scattered_bounds(count: usize) -> Vec<Aabb> {
        let mut state = 0x2545_f491_4f6c_dd1du64;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) as f32 / (1u64 << 31) as f32) * 2.0 - 1.0
        };
        (0..count)
            .map(|i| {
                let spread = if i % 7 == 0 { 5000.0 } else { 40.0 };
                let center = Vec3::new(next() * spread, next() * spread, next() * spread);
                let half = Vec3::new(
                    next().abs() * 3.0 + 0.1,
                    next().abs() * 3.0 + 0.1,
                    next().abs() * 3.0 + 0.1,
                );
                Aabb::from_center_half_extent(center, half)
            })
            .collect()
    }

    #[test]
    fn test_backends_agree_on_visibility_and_band() {
        let camera = CameraView::perspective(
            Vec3::new(0.0, 5.0, 60.0), Vec3::ZERO, 60.0, 16.0 / 9.0, 0.1, 500.0,
        );
        let snapshot = FrustumSnapshot::from_camera(&camera);
        let bounds = scattered_bounds(513); // odd count, not a batch multiple
        let table = LodTable::new(vec![0.75, 0.5, 0.33, 0.15]).unwrap();

        let mut sequential = vec![CullState::INVISIBLE; bounds.len()];
        let mut parallel = vec![CullState::INVISIBLE; bounds.len()];
        SequentialBackend.cull(&snapshot, &bounds, &mut sequential);
        ParallelBackend.cull(&snapshot, &bounds, &mut parallel);

        for (i, (s, p)) in sequential.iter().zip(&parallel).enumerate() {
            assert_eq!(s.visible, p.visible, "visibility diverged at slot {i}");
            assert_eq!(
                table.band_for_height(s.height),
                table.band_for_height(p.height),
                "band diverged at slot {i}"
            );
        }
    }

    #[test]
    fn test_backends_agree_on_world_bounds() {
        let bounds = scattered_bounds(100);
        let transforms: Vec<Mat4> = (0..100)
            .map(|i| Mat4::from_translation(Vec3::new(i as f32, 0.0, -(i as f32))))
            .collect();

        let mut sequential = vec![Aabb::default(); bounds.len()];
        let mut parallel = vec![Aabb::default(); bounds.len()];
        SequentialBackend.refresh_world_bounds(&bounds, &transforms, &mut sequential);
        ParallelBackend.refresh_world_bounds(&bounds, &transforms, &mut parallel);
        assert_eq!(sequential, parallel);
    }
}
