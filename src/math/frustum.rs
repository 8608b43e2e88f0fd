//! View frustum for culling

use crate::core::types::{Vec3, Vec4, Mat4};
use super::aabb::Aabb;

/// Slack applied to the plane test so boxes sitting exactly on a frustum
/// plane do not flicker between visible and culled across ticks.
pub const PLANE_EPSILON: f32 = 1e-10;

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// View frustum with 6 planes (Near, Far, Left, Right, Top, Bottom)
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix
    /// (Gribb/Hartmann row combinations).
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        // Left: row3 + row0
        let left = Self::normalize_plane(Vec4::new(
            m[0][3] + m[0][0],
            m[1][3] + m[1][0],
            m[2][3] + m[2][0],
            m[3][3] + m[3][0],
        ));

        // Right: row3 - row0
        let right = Self::normalize_plane(Vec4::new(
            m[0][3] - m[0][0],
            m[1][3] - m[1][0],
            m[2][3] - m[2][0],
            m[3][3] - m[3][0],
        ));

        // Bottom: row3 + row1
        let bottom = Self::normalize_plane(Vec4::new(
            m[0][3] + m[0][1],
            m[1][3] + m[1][1],
            m[2][3] + m[2][1],
            m[3][3] + m[3][1],
        ));

        // Top: row3 - row1
        let top = Self::normalize_plane(Vec4::new(
            m[0][3] - m[0][1],
            m[1][3] - m[1][1],
            m[2][3] - m[2][1],
            m[3][3] - m[3][1],
        ));

        // Near: row2 alone (glam projections write clip depth to [0, w])
        let near = Self::normalize_plane(Vec4::new(
            m[0][2],
            m[1][2],
            m[2][2],
            m[3][2],
        ));

        // Far: row3 - row2
        let far = Self::normalize_plane(Vec4::new(
            m[0][3] - m[0][2],
            m[1][3] - m[1][2],
            m[2][3] - m[2][2],
            m[3][3] - m[3][2],
        ));

        Self {
            planes: [near, far, left, right, top, bottom],
        }
    }

    fn normalize_plane(plane: Vec4) -> Plane {
        let normal = Vec3::new(plane.x, plane.y, plane.z);
        let len = normal.length();
        Plane {
            normal: normal / len,
            distance: plane.w / len,
        }
    }

    /// Check if point is inside frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        for plane in &self.planes {
            if plane.distance_to_point(point) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Check if AABB intersects frustum (conservative test)
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            // Find the corner most aligned with plane normal (p-vertex)
            let p = Vec3::new(
                if plane.normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );

            // If p-vertex is outside, AABB is completely outside
            if plane.distance_to_point(p) < -PLANE_EPSILON {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::CameraView;

    fn test_frustum() -> Frustum {
        // Camera at +Z looking at the origin, far plane 1000
        let camera = CameraView::perspective(
            Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 60.0, 1.0, 0.1, 1000.0,
        );
        Frustum::from_view_projection(&camera.view_projection())
    }

    #[test]
    fn test_contains_point() {
        let frustum = test_frustum();
        assert!(frustum.contains_point(Vec3::ZERO));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 50.0))); // behind camera
        assert!(!frustum.contains_point(Vec3::new(1000.0, 0.0, 0.0))); // far off axis
    }

    #[test]
    fn test_intersects_aabb_inside() {
        let frustum = test_frustum();
        let aabb = Aabb::from_center_half_extent(Vec3::ZERO, Vec3::ONE);
        assert!(frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn test_rejects_aabb_far_outside() {
        let frustum = test_frustum();
        let aabb = Aabb::from_center_half_extent(Vec3::new(0.0, 0.0, 1e6), Vec3::ONE);
        assert!(!frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn test_straddling_aabb_is_visible() {
        let frustum = test_frustum();
        // Partially inside the left edge of the view
        let aabb = Aabb::from_center_half_extent(Vec3::new(-8.0, 0.0, 0.0), Vec3::splat(4.0));
        assert!(frustum.intersects_aabb(&aabb));
    }
}
