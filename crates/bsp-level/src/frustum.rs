//! View frustum for culling objects and (optionally) leaves.

use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::walker::Camera;
use crate::{Aabb, Plane3D};

/// View frustum with 6 inward-facing planes (near, far, left, right, top, bottom).
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    planes: [Plane3D; 6],
}

impl Frustum {
    /// Builds a frustum from planes whose normals point into the volume.
    pub fn from_planes(planes: [Plane3D; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix (OpenGL clip space).
    pub fn from_view_projection(vp: &Matrix4<f32>) -> Self {
        let row = |i: usize| -> Vector4<f32> { vp.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Self::normalize_plane(r3 + r2),
                Self::normalize_plane(r3 - r2),
                Self::normalize_plane(r3 + r0),
                Self::normalize_plane(r3 - r0),
                Self::normalize_plane(r3 - r1),
                Self::normalize_plane(r3 + r1),
            ],
        }
    }

    // (a, b, c, d) with a*x + b*y + c*z + d >= 0 inside
    fn normalize_plane(coeffs: Vector4<f32>) -> Plane3D {
        let normal = Vector3::new(coeffs.x, coeffs.y, coeffs.z);
        let len = normal.norm();
        if len > f32::EPSILON {
            Plane3D::from_parts(normal / len, -coeffs.w / len)
        } else {
            Plane3D::from_parts(normal, -coeffs.w)
        }
    }

    pub fn planes(&self) -> &[Plane3D; 6] {
        &self.planes
    }

    /// Check if point is inside frustum.
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(point) >= 0.0)
    }

    /// Conservative AABB test: false only when the box is fully outside one plane.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let n = plane.normal();
            // Corner most aligned with the plane normal (p-vertex)
            let p = Point3::new(
                if n.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if n.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if n.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            plane.signed_distance(p) >= 0.0
        })
    }
}

/// A camera described by its eye position and view frustum.
#[derive(Debug, Clone, PartialEq)]
pub struct FrustumCamera {
    pub position: Point3<f32>,
    pub frustum: Frustum,
}

impl FrustumCamera {
    pub fn new(position: Point3<f32>, frustum: Frustum) -> Self {
        Self { position, frustum }
    }

    /// Builds the camera from view and projection matrices.
    pub fn look_at(
        eye: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        projection: &Matrix4<f32>,
    ) -> Self {
        let view = Matrix4::look_at_rh(&eye, &target, &up);
        Self::new(eye, Frustum::from_view_projection(&(projection * view)))
    }
}

impl Camera for FrustumCamera {
    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn is_visible(&self, bounds: &Aabb) -> bool {
        self.frustum.intersects_aabb(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Orthographic3;

    fn ortho_camera() -> FrustumCamera {
        let proj = Orthographic3::new(-1.0, 1.0, -1.0, 1.0, 0.1, 100.0).to_homogeneous();
        FrustumCamera::look_at(
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            Vector3::y(),
            &proj,
        )
    }

    #[test]
    fn contains_point_in_view() {
        let camera = ortho_camera();
        assert!(camera.frustum.contains_point(Point3::origin()));
        assert!(!camera.frustum.contains_point(Point3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn aabb_culling() {
        let camera = ortho_camera();
        let centered = Aabb::from_array([-0.5, -0.5, -0.5, 0.5, 0.5, 0.5]);
        let beside = Aabb::from_array([4.0, -0.5, -0.5, 5.0, 0.5, 0.5]);
        let behind = Aabb::from_array([-0.5, -0.5, 9.0, 0.5, 0.5, 11.0]);
        let straddling_edge = Aabb::from_array([0.5, -0.5, -0.5, 3.0, 0.5, 0.5]);

        assert!(camera.is_visible(&centered));
        assert!(!camera.is_visible(&beside));
        assert!(!camera.is_visible(&behind));
        assert!(camera.is_visible(&straddling_edge));
    }

    #[test]
    fn camera_reports_eye_position() {
        assert_eq!(ortho_camera().position(), Point3::new(0.0, 0.0, 5.0));
    }
}
