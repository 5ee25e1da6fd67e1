//! Convex solid regions used for collision-style queries.

use bitflags::bitflags;

use crate::{Aabb, Plane3D, Ray, Sphere};

bitflags! {
    /// Brush content flags as authored in the level.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContentFlags: u32 {
        const SOLID = 0x1;
        const LAVA = 0x8;
        const SLIME = 0x10;
        const WATER = 0x20;
        const FOG = 0x40;
        const PLAYER_CLIP = 0x1_0000;
        const MONSTER_CLIP = 0x2_0000;
    }
}

/// Index of a brush in the level's brush array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BrushId(pub u32);

impl BrushId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A convex volume bounded by planes whose normals point out of the solid.
///
/// A point is inside when it is on or behind every plane. A brush with no
/// planes is treated as empty: it never intersects anything.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    planes: Vec<Plane3D>,
    contents: ContentFlags,
}

impl Brush {
    pub fn new(planes: Vec<Plane3D>, contents: ContentFlags) -> Self {
        Self { planes, contents }
    }

    #[inline]
    pub fn planes(&self) -> &[Plane3D] {
        &self.planes
    }

    #[inline]
    pub fn contents(&self) -> ContentFlags {
        self.contents
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.contents.contains(ContentFlags::SOLID)
    }

    /// True when the brush has no bounding planes.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.planes.is_empty()
    }

    /// Distance along `ray` at which it enters the brush; `Some(0.0)` if the
    /// origin is already inside.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if self.is_degenerate() {
            return None;
        }

        let mut all_inside = true;
        // Latest entry over the planes the origin is outside of
        let mut entry = 0.0_f32;
        // Earliest exit over the planes the origin is inside of
        let mut exit: Option<f32> = None;

        for plane in &self.planes {
            if plane.signed_distance(ray.origin) > 0.0 {
                all_inside = false;
                let t = ray.intersect_plane(plane)?;
                entry = entry.max(t);
            } else if let Some(t) = ray.intersect_plane(plane) {
                exit = Some(exit.map_or(t, |e| e.min(t)));
            }
        }

        if all_inside {
            return Some(0.0);
        }
        match exit {
            Some(exit) if exit < entry => None,
            _ => Some(entry),
        }
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        !self.is_degenerate()
            && self
                .planes
                .iter()
                .all(|plane| plane.signed_distance(sphere.center) <= sphere.radius)
    }

    /// False when the box lies entirely outside any one plane.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let center = aabb.center();
        let half = aabb.half_extents();
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(center) <= plane.projected_extent(half))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use nalgebra::{Point3, Vector3};

    /// Solid box spanning [min, max] on every axis.
    fn cube(min: f32, max: f32) -> Brush {
        let mut planes = Vec::new();
        for axis in 0..3 {
            let mut n = Vector3::zeros();
            n[axis] = 1.0;
            planes.push(Plane3D::new(n, max));
            planes.push(Plane3D::new(-n, -min));
        }
        Brush::new(planes, ContentFlags::SOLID)
    }

    #[test]
    fn ray_enters_at_nearest_face() {
        let brush = cube(5.0, 10.0);
        let ray = Ray::new(Point3::new(0.0, 7.0, 7.0), Vector3::new(1.0, 0.0, 0.0));
        assert_approx_eq!(brush.intersect_ray(&ray).unwrap(), 5.0);
    }

    #[test]
    fn ray_from_inside_hits_at_zero() {
        let brush = cube(5.0, 10.0);
        let ray = Ray::new(Point3::new(7.0, 7.0, 7.0), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(brush.intersect_ray(&ray), Some(0.0));
    }

    #[test]
    fn ray_passing_beside_misses() {
        let brush = cube(5.0, 10.0);
        let parallel = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(brush.intersect_ray(&parallel).is_none());

        let diagonal = Ray::new(Point3::new(0.0, 0.0, 7.0), Vector3::new(1.0, 3.0, 0.0));
        assert!(brush.intersect_ray(&diagonal).is_none());
    }

    #[test]
    fn ray_pointing_away_misses() {
        let brush = cube(5.0, 10.0);
        let ray = Ray::new(Point3::new(0.0, 7.0, 7.0), Vector3::new(-1.0, 0.0, 0.0));
        assert!(brush.intersect_ray(&ray).is_none());
    }

    #[test]
    fn sphere_and_box_overlap() {
        let brush = cube(5.0, 10.0);
        assert!(brush.intersects_sphere(&Sphere::new(Point3::new(4.0, 7.0, 7.0), 1.5)));
        assert!(!brush.intersects_sphere(&Sphere::new(Point3::new(2.0, 7.0, 7.0), 1.5)));

        assert!(brush.intersects_aabb(&Aabb::from_array([4.0, 4.0, 4.0, 5.5, 5.5, 5.5])));
        assert!(!brush.intersects_aabb(&Aabb::from_array([0.0, 0.0, 0.0, 4.0, 4.0, 4.0])));
    }

    #[test]
    fn degenerate_brush_never_intersects() {
        let brush = Brush::new(Vec::new(), ContentFlags::SOLID);
        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0));
        assert!(brush.is_degenerate());
        assert!(brush.intersect_ray(&ray).is_none());
        assert!(!brush.intersects_sphere(&Sphere::new(Point3::origin(), 100.0)));
        assert!(!brush.intersects_aabb(&Aabb::from_array([-1.0, -1.0, -1.0, 1.0, 1.0, 1.0])));
    }

    #[test]
    fn solidity_comes_from_contents() {
        assert!(cube(0.0, 1.0).is_solid());
        assert!(!Brush::new(Vec::new(), ContentFlags::WATER).is_solid());
    }
}
