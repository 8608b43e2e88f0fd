//! Axis-aligned bounding box

use crate::core::types::{Mat4, Vec3};

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Covers all representable space. Used as the optimistic seed for a
    /// freshly registered slot until its real world bounds are computed.
    pub const UNBOUNDED: Aabb = Aabb {
        min: Vec3::new(-f32::MAX, -f32::MAX, -f32::MAX),
        max: Vec3::new(f32::MAX, f32::MAX, f32::MAX),
    };

    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create AABB from center and half-extents
    pub fn from_center_half_extent(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get half-extents
    pub fn half_extent(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// The 8 corner points
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Conservative rebound under an arbitrary affine transform: transform
    /// all 8 corners and take the componentwise min/max. Possibly loose
    /// (never tight like an OBB), always containing the transformed box.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for corner in self.corners() {
            let p = matrix.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Aabb { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.center(), Vec3::splat(0.5));
        assert_eq!(aabb.size(), Vec3::ONE);
        assert_eq!(aabb.half_extent(), Vec3::splat(0.5));
    }

    #[test]
    fn test_corners_cover_extremes() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        let corners = aabb.corners();
        assert!(corners.contains(&Vec3::ZERO));
        assert!(corners.contains(&Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(corners.len(), 8);
    }

    #[test]
    fn test_transformed_translation() {
        let aabb = Aabb::from_center_half_extent(Vec3::ZERO, Vec3::ONE);
        let moved = aabb.transformed(&Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(moved.center(), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(moved.half_extent(), Vec3::ONE);
    }

    #[test]
    fn test_transformed_rotation_is_conservative() {
        // A unit cube rotated 45 degrees around Y must still be contained,
        // so the rebound grows to sqrt(2) in x/z.
        let aabb = Aabb::from_center_half_extent(Vec3::ZERO, Vec3::ONE);
        let rotated = aabb.transformed(&Mat4::from_rotation_y(45f32.to_radians()));
        let expected = 2f32.sqrt();
        assert!((rotated.half_extent().x - expected).abs() < 1e-5);
        assert!((rotated.half_extent().z - expected).abs() < 1e-5);
        assert!((rotated.half_extent().y - 1.0).abs() < 1e-5);
    }
}
