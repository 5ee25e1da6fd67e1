//! Plane representation shared by splitters, brushes and frustums.

use nalgebra::{Point3, Vector3};

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies exactly on the plane
    OnPlane,
}

/// A plane in 3D space, represented as `normal · point = offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f32>,
    offset: f32,
}

impl Plane3D {
    /// Creates a new plane from a normal vector and offset.
    /// The normal will be normalized automatically.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn new(normal: Vector3<f32>, offset: f32) -> Self {
        let norm = normal.norm();
        assert!(norm > f32::EPSILON, "Plane normal cannot be zero");
        Self {
            normal: normal / norm,
            offset: offset / norm,
        }
    }

    /// Creates a plane from stored components without normalizing.
    ///
    /// Level data carries unit normals already; a degenerate normal is kept
    /// as-is and simply yields a constant signed distance.
    pub fn from_parts(normal: Vector3<f32>, offset: f32) -> Self {
        Self { normal, offset }
    }

    /// Returns the normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind (opposite side from normal)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Classifies which side of the plane a point lies on, with no tolerance.
    #[inline]
    pub fn side(&self, point: Point3<f32>) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > 0.0 {
            PlaneSide::Front
        } else if dist < 0.0 {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Half-width of a box with the given half extents, measured along the normal.
    #[inline]
    pub fn projected_extent(&self, half_extents: Vector3<f32>) -> f32 {
        self.normal.x.abs() * half_extents.x
            + self.normal.y.abs() * half_extents.y
            + self.normal.z.abs() * half_extents.z
    }
}
