//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box defined by min and max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// Create AABB from min and max corners.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from the six floats `[min_x, min_y, min_z, max_x, max_y, max_z]`.
    pub fn from_array(bounds: [f32; 6]) -> Self {
        Self {
            min: Point3::new(bounds[0], bounds[1], bounds[2]),
            max: Point3::new(bounds[3], bounds[4], bounds[5]),
        }
    }

    /// Get center point.
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Get half-extents.
    pub fn half_extents(&self) -> Vector3<f32> {
        (self.max - self.min) * 0.5
    }

    /// Check if point is inside AABB (boundary inclusive).
    pub fn contains_point(&self, p: Point3<f32>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Check if two AABBs intersect. Touching faces count as intersecting.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Closest point of the box to `p`.
    pub fn closest_point(&self, p: Point3<f32>) -> Point3<f32> {
        Point3::new(
            p.x.max(self.min.x).min(self.max.x),
            p.y.max(self.min.y).min(self.max.y),
            p.z.max(self.min.z).min(self.max.z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn center_and_half_extents() {
        let b = Aabb::from_array([0.0, 2.0, 4.0, 2.0, 6.0, 10.0]);
        assert_eq!(b.center(), Point3::new(1.0, 4.0, 7.0));
        assert_eq!(b.half_extents(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn contains_point_is_boundary_inclusive() {
        let b = unit_box();
        assert!(b.contains_point(Point3::origin()));
        assert!(b.contains_point(Point3::new(1.0, 1.0, 1.0)));
        assert!(!b.contains_point(Point3::new(1.01, 0.0, 0.0)));
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = unit_box();
        let b = Aabb::new(Point3::new(1.0, -1.0, -1.0), Point3::new(3.0, 1.0, 1.0));
        let c = Aabb::new(Point3::new(1.5, -1.0, -1.0), Point3::new(3.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn closest_point_clamps() {
        let b = unit_box();
        assert_eq!(
            b.closest_point(Point3::new(5.0, 0.5, -3.0)),
            Point3::new(1.0, 0.5, -1.0)
        );
    }
}
