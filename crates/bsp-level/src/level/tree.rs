//! Arena-backed level tree and point/volume descent.

use std::ops::Range;

use nalgebra::Point3;

use crate::{Aabb, PlaneSide};

use super::node::{Leaf, Node};

/// Index of the root node.
pub const ROOT: usize = 0;

/// The level's node array.
///
/// Internal nodes come first; leaves occupy the contiguous range
/// `leaf_start..leaf_start + num_leaves`. Children are stored as indices into
/// the same array. The tree is immutable once built.
#[derive(Debug, Clone)]
pub struct SpatialTree {
    nodes: Vec<Node>,
    leaf_start: usize,
}

impl SpatialTree {
    /// Wraps a node array whose child indices were already resolved and checked.
    pub(crate) fn from_nodes(nodes: Vec<Node>, leaf_start: usize) -> Self {
        Self { nodes, leaf_start }
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Index of the first leaf.
    #[inline]
    pub fn leaf_start(&self) -> usize {
        self.leaf_start
    }

    #[inline]
    pub fn num_leaves(&self) -> usize {
        self.nodes.len() - self.leaf_start
    }

    /// Node indices of all leaves.
    #[inline]
    pub fn leaf_range(&self) -> Range<usize> {
        self.leaf_start..self.nodes.len()
    }

    /// Returns the leaf stored at node `index`, if that node is a leaf.
    #[inline]
    pub fn leaf(&self, index: usize) -> Option<&Leaf> {
        self.nodes.get(index).and_then(Node::as_leaf)
    }

    /// Iterates `(node index, leaf)` over every leaf in index order.
    pub fn leaves(&self) -> impl Iterator<Item = (usize, &Leaf)> + '_ {
        self.leaf_range()
            .filter_map(move |index| self.leaf(index).map(|leaf| (index, leaf)))
    }

    /// Finds the leaf containing `point`.
    ///
    /// Points exactly on a splitting plane descend to the front. Points
    /// outside the authored volume still land in some leaf.
    pub fn find_leaf(&self, point: Point3<f32>) -> usize {
        let mut index = ROOT;
        while let Some(Node::Internal(node)) = self.nodes.get(index) {
            index = node.next_node(point);
        }
        index
    }

    /// Side of node `index`'s splitting plane that `point` is on; `None` for leaves.
    pub fn side(&self, index: usize, point: Point3<f32>) -> Option<PlaneSide> {
        self.nodes
            .get(index)
            .and_then(Node::as_internal)
            .map(|node| node.side(point))
    }

    /// Child of node `index` to descend into for `point`; `None` for leaves.
    pub fn next_node(&self, index: usize, point: Point3<f32>) -> Option<usize> {
        self.nodes
            .get(index)
            .and_then(Node::as_internal)
            .map(|node| node.next_node(point))
    }

    /// Calls `f` with every leaf a sphere may overlap.
    ///
    /// Descends both sides wherever `|distance| < radius`; otherwise the sign
    /// of the distance picks the side.
    pub fn for_each_leaf_in_sphere<F: FnMut(usize)>(
        &self,
        center: Point3<f32>,
        radius: f32,
        f: &mut F,
    ) {
        sphere_leaves_node(self, ROOT, center, radius, f);
    }

    /// Calls `f` with every leaf an axis-aligned box may overlap.
    pub fn for_each_leaf_in_box<F: FnMut(usize)>(&self, aabb: &Aabb, f: &mut F) {
        box_leaves_node(self, ROOT, aabb, f);
    }

    /// Returns the maximum depth of the tree (1 for a lone leaf).
    pub fn depth(&self) -> usize {
        depth_node(self, ROOT)
    }
}

fn sphere_leaves_node<F: FnMut(usize)>(
    tree: &SpatialTree,
    index: usize,
    center: Point3<f32>,
    radius: f32,
    f: &mut F,
) {
    match tree.nodes.get(index) {
        Some(Node::Leaf(_)) => f(index),
        Some(Node::Internal(node)) => {
            let dist = node.distance(center);
            if dist.abs() < radius {
                // Sphere crosses the plane
                sphere_leaves_node(tree, node.back, center, radius, f);
                sphere_leaves_node(tree, node.front, center, radius, f);
            } else if dist < 0.0 {
                sphere_leaves_node(tree, node.back, center, radius, f);
            } else {
                sphere_leaves_node(tree, node.front, center, radius, f);
            }
        }
        None => {}
    }
}

fn box_leaves_node<F: FnMut(usize)>(tree: &SpatialTree, index: usize, aabb: &Aabb, f: &mut F) {
    match tree.nodes.get(index) {
        Some(Node::Leaf(_)) => f(index),
        Some(Node::Internal(node)) => {
            let dist = node.distance(aabb.center());
            let extent = node.plane.projected_extent(aabb.half_extents());
            if dist.abs() < extent {
                box_leaves_node(tree, node.back, aabb, f);
                box_leaves_node(tree, node.front, aabb, f);
            } else if dist < 0.0 {
                box_leaves_node(tree, node.back, aabb, f);
            } else {
                box_leaves_node(tree, node.front, aabb, f);
            }
        }
        None => {}
    }
}

fn depth_node(tree: &SpatialTree, index: usize) -> usize {
    match tree.nodes.get(index) {
        Some(Node::Internal(node)) => {
            1 + depth_node(tree, node.front).max(depth_node(tree, node.back))
        }
        Some(Node::Leaf(_)) => 1,
        None => 0,
    }
}
