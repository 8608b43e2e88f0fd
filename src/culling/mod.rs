//! Per-slot culling math and the execution backends that batch it
//!
//! Every slot is independent: visibility is a frustum plane test on the
//! world AABB, "height" is the largest viewport-space dimension of the
//! projected box. That independence is what makes the scan batchable; the
//! backends only differ in execution model and must agree on results.

pub mod backend;
pub mod sequential;
pub mod parallel;

pub use backend::CullingBackend;
pub use sequential::SequentialBackend;
pub use parallel::ParallelBackend;

use crate::core::camera::CameraView;
use crate::core::types::{Mat4, Vec2, Vec3};
use crate::events::CullState;
use crate::math::{Aabb, Frustum};

/// Camera-derived inputs for one tick of culling.
///
/// Recomputed once per tick from the host camera's matrices; read-only for
/// the duration of the batch.
#[derive(Clone, Copy, Debug)]
pub struct FrustumSnapshot {
    /// World to clip space
    pub vp: Mat4,
    pub frustum: Frustum,
    /// Camera forward axis in world space
    pub forward: Vec3,
    /// Camera position in world space
    pub position: Vec3,
    pub orthographic: bool,
}

impl FrustumSnapshot {
    pub fn from_camera(camera: &CameraView) -> Self {
        let vp = camera.view_projection();
        let camera_to_world = camera.view.inverse();
        Self {
            vp,
            frustum: Frustum::from_view_projection(&vp),
            forward: camera_to_world.transform_vector3(-Vec3::Z),
            position: camera_to_world.transform_point3(Vec3::ZERO),
            orthographic: camera.orthographic,
        }
    }
}

/// World bounds for one slot: conservative rebound of the local box.
pub(crate) fn world_bounds_one(local: &Aabb, local_to_world: &Mat4) -> Aabb {
    local.transformed(local_to_world)
}

/// Visibility and apparent viewport size for one slot.
pub(crate) fn cull_one(snapshot: &FrustumSnapshot, world: &Aabb) -> CullState {
    CullState {
        height: viewport_height(snapshot, world),
        visible: snapshot.frustum.intersects_aabb(world),
    }
}

/// Largest viewport-space dimension of the projected box.
///
/// Projects all 8 corners through the view-projection matrix and takes the
/// min/max of the viewport-mapped xy. When the corners straddle the camera
/// plane (some in front, some behind) the projection is unreliable, so the
/// box is treated as nearest: height 1.
fn viewport_height(snapshot: &FrustumSnapshot, world: &Aabb) -> f32 {
    let mut min_xy = Vec2::splat(f32::INFINITY);
    let mut max_xy = Vec2::splat(f32::NEG_INFINITY);
    let mut min_depth = f32::INFINITY;
    let mut max_depth = f32::NEG_INFINITY;

    for corner in world.corners() {
        let clip = snapshot.vp * corner.extend(1.0);
        let mut xy = Vec2::new(clip.x, clip.y);
        if !snapshot.orthographic {
            xy /= clip.w;
        }
        let viewport = xy * 0.5 + Vec2::splat(0.5);
        min_xy = min_xy.min(viewport);
        max_xy = max_xy.max(viewport);

        let depth = snapshot.forward.dot(corner - snapshot.position);
        min_depth = min_depth.min(depth);
        max_depth = max_depth.max(depth);
    }

    if min_depth * max_depth < 0.0 {
        1.0
    } else {
        let delta = max_xy - min_xy;
        delta.x.max(delta.y)
    }
}
