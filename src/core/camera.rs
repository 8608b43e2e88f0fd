//! Camera matrices sampled once per tick

use crate::core::types::{Mat4, Vec3};

/// View and projection matrices supplied by the host's camera.
///
/// The engine never owns a camera: the host hands it one of these each tick,
/// read-only, and the engine derives its frustum and viewport mapping from
/// it. How the matrices are produced (scene camera, editor fly camera, ...)
/// is the host's business.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    /// World to camera space
    pub view: Mat4,
    /// Camera to clip space
    pub projection: Mat4,
    /// Skip the perspective divide when mapping to viewport space
    pub orthographic: bool,
}

impl CameraView {
    pub fn new(view: Mat4, projection: Mat4, orthographic: bool) -> Self {
        Self { view, projection, orthographic }
    }

    /// Perspective camera at `position` looking at `target`.
    pub fn perspective(
        position: Vec3,
        target: Vec3,
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            view: Mat4::look_at_rh(position, target, Vec3::Y),
            projection: Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far),
            orthographic: false,
        }
    }

    /// Orthographic camera at `position` looking at `target`.
    pub fn orthographic(
        position: Vec3,
        target: Vec3,
        half_height: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let half_width = half_height * aspect;
        Self {
            view: Mat4::look_at_rh(position, target, Vec3::Y),
            projection: Mat4::orthographic_rh(
                -half_width, half_width,
                -half_height, half_height,
                near, far,
            ),
            orthographic: true,
        }
    }

    /// Combined world-to-clip matrix (projection * view).
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}
