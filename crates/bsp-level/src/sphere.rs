//! Bounding sphere used by region queries.

use nalgebra::Point3;

use crate::Aabb;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere/box overlap by distance to the closest point on the box.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let closest = aabb.closest_point(self.center);
        (closest - self.center).norm_squared() <= self.radius * self.radius
    }
}
