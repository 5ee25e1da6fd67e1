//! Ray type and ray/primitive intersection.

use nalgebra::{Point3, Vector3};

use crate::{Aabb, Plane3D};

/// A half-line starting at `origin`.
///
/// Distances returned by the intersection methods are in units of
/// `direction`, so callers that want world units should pass a unit vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// Get point along ray at parameter t.
    #[inline]
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the plane, if the ray is not parallel to it
    /// and the crossing is not behind the origin.
    pub fn intersect_plane(&self, plane: &Plane3D) -> Option<f32> {
        let denom = plane.normal().dot(&self.direction);
        if denom.abs() < f32::EPSILON {
            return None;
        }
        let t = -(plane.signed_distance(self.origin) / denom);
        (t >= 0.0).then_some(t)
    }

    /// Entry distance into the box using the slab method; `Some(0.0)` when
    /// the origin is already inside.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        let mut t_near = 0.0_f32;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            let (min, max) = (aabb.min[axis], aabb.max[axis]);

            if dir.abs() < f32::EPSILON {
                // Parallel to this slab: must already be between its faces
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t1 = (min - origin) * inv;
            let mut t2 = (max - origin) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_near = t_near.max(t1);
            t_far = t_far.min(t2);
            if t_near > t_far {
                return None;
            }
        }

        Some(t_near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn plane_hit_in_front() {
        let plane = Plane3D::new(Vector3::new(1.0, 0.0, 0.0), 2.0);
        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0));
        assert_approx_eq!(ray.intersect_plane(&plane).unwrap(), 2.0);
    }

    #[test]
    fn plane_behind_or_parallel_misses() {
        let plane = Plane3D::new(Vector3::new(1.0, 0.0, 0.0), -2.0);
        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0));
        assert!(ray.intersect_plane(&plane).is_none());

        let parallel = Ray::new(Point3::origin(), Vector3::new(0.0, 1.0, 0.0));
        assert!(parallel.intersect_plane(&plane).is_none());
    }

    #[test]
    fn aabb_entry_distance() {
        let ray = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert_approx_eq!(ray.intersect_aabb(&unit_box()).unwrap(), 4.0);
    }

    #[test]
    fn aabb_origin_inside_hits_at_zero() {
        let ray = Ray::new(Point3::new(0.5, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(ray.intersect_aabb(&unit_box()), Some(0.0));
    }

    #[test]
    fn aabb_miss_and_behind() {
        let offset = Ray::new(Point3::new(-5.0, 3.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(offset.intersect_aabb(&unit_box()).is_none());

        let away = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0));
        assert!(away.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn at_walks_along_direction() {
        let ray = Ray::new(Point3::new(1.0, 1.0, 1.0), Vector3::new(0.0, 2.0, 0.0));
        assert_eq!(ray.at(1.5), Point3::new(1.0, 4.0, 1.0));
    }
}
