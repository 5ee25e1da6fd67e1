//! Nodes of the level tree.

use nalgebra::Point3;

use crate::{Aabb, BrushId, Plane3D, PlaneSide};

/// A node in the level tree: either a splitter or a leaf.
///
/// Nodes live in one array owned by [`SpatialTree`](super::SpatialTree) and
/// refer to their children by index, so the structure has no cycles to manage.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Internal(InternalNode),
    Leaf(Leaf),
}

impl Node {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    #[inline]
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Internal(_) => None,
        }
    }

    #[inline]
    pub fn as_internal(&self) -> Option<&InternalNode> {
        match self {
            Node::Internal(node) => Some(node),
            Node::Leaf(_) => None,
        }
    }

    /// Bounding box stored for the node in the level data.
    pub fn bounds(&self) -> &Aabb {
        match self {
            Node::Internal(node) => &node.bounds,
            Node::Leaf(leaf) => &leaf.bounds,
        }
    }
}

/// A splitting node partitioning space with a plane.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalNode {
    /// The splitting plane for this node.
    pub(crate) plane: Plane3D,

    pub(crate) bounds: Aabb,

    /// Index of the subtree on the positive side of the plane.
    pub(crate) front: usize,

    /// Index of the subtree on the negative side of the plane.
    pub(crate) back: usize,
}

impl InternalNode {
    /// Returns a reference to the splitting plane.
    #[inline]
    pub fn plane(&self) -> &Plane3D {
        &self.plane
    }

    #[inline]
    pub fn front(&self) -> usize {
        self.front
    }

    #[inline]
    pub fn back(&self) -> usize {
        self.back
    }

    /// Signed distance from `point` to the splitting plane.
    #[inline]
    pub fn distance(&self, point: Point3<f32>) -> f32 {
        self.plane.signed_distance(point)
    }

    #[inline]
    pub fn side(&self, point: Point3<f32>) -> PlaneSide {
        self.plane.side(point)
    }

    /// Child to descend into for `point`. Points exactly on the plane go front.
    #[inline]
    pub fn next_node(&self, point: Point3<f32>) -> usize {
        if self.distance(point) < 0.0 {
            self.back
        } else {
            self.front
        }
    }
}

/// A terminal region of the level.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub(crate) bounds: Aabb,

    /// Visibility cluster, or -1 when the leaf has no visibility data.
    pub(crate) cluster: i32,

    /// First entry of this leaf in the shared leaf-face array.
    pub(crate) face_group_start: usize,

    pub(crate) face_group_count: usize,

    /// Solid brushes overlapping the leaf. Non-solid brushes are not kept.
    pub(crate) solid_brushes: Vec<BrushId>,
}

impl Leaf {
    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    #[inline]
    pub fn cluster(&self) -> i32 {
        self.cluster
    }

    #[inline]
    pub fn face_group_start(&self) -> usize {
        self.face_group_start
    }

    #[inline]
    pub fn face_group_count(&self) -> usize {
        self.face_group_count
    }

    #[inline]
    pub fn solid_brushes(&self) -> &[BrushId] {
        &self.solid_brushes
    }
}
