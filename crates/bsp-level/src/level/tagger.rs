//! Leaf membership of movable objects.

use std::collections::{BTreeSet, HashMap};

use log::trace;
use nalgebra::Point3;

use crate::ObjectId;

use super::tree::SpatialTree;

/// Two-way association between movable objects and the leaves their bounding
/// spheres reach.
///
/// Per-leaf sets are stored parallel to the tree's leaf range, so a leaf's set
/// lives at `leaf - leaf_start`.
#[derive(Debug, Clone, Default)]
pub struct ObjectTagger {
    leaf_start: usize,
    leaf_objects: Vec<BTreeSet<ObjectId>>,
    object_leaves: HashMap<ObjectId, Vec<usize>>,
}

impl ObjectTagger {
    pub fn new(tree: &SpatialTree) -> Self {
        Self {
            leaf_start: tree.leaf_start(),
            leaf_objects: vec![BTreeSet::new(); tree.num_leaves()],
            object_leaves: HashMap::new(),
        }
    }

    /// Re-tags `id` in every leaf its bounding sphere may overlap.
    ///
    /// Repeating the call with the same arguments leaves the association
    /// unchanged.
    pub fn notify_moved(
        &mut self,
        tree: &SpatialTree,
        id: ObjectId,
        position: Point3<f32>,
        radius: f32,
    ) {
        self.untag(id);

        let mut leaves = Vec::new();
        tree.for_each_leaf_in_sphere(position, radius, &mut |leaf| leaves.push(leaf));
        for &leaf in &leaves {
            if let Some(set) = self.slot_mut(leaf) {
                set.insert(id);
            }
        }
        trace!("object {id:?} tagged in {} leaves", leaves.len());
        self.object_leaves.insert(id, leaves);
    }

    /// Removes `id` from every leaf and forgets it.
    pub fn notify_detached(&mut self, id: ObjectId) {
        if self.untag(id) {
            trace!("object {id:?} detached");
        }
    }

    /// Leaves `id` is currently tagged in.
    pub fn leaves_of(&self, id: ObjectId) -> &[usize] {
        self.object_leaves.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Objects tagged in the leaf at node index `leaf`, in id order.
    pub fn objects_in(&self, leaf: usize) -> impl Iterator<Item = ObjectId> + '_ {
        leaf.checked_sub(self.leaf_start)
            .and_then(|slot| self.leaf_objects.get(slot))
            .into_iter()
            .flatten()
            .copied()
    }

    #[inline]
    pub fn is_tagged(&self, id: ObjectId) -> bool {
        self.object_leaves.contains_key(&id)
    }

    /// Number of objects the tagger currently tracks.
    #[inline]
    pub fn tagged_count(&self) -> usize {
        self.object_leaves.len()
    }

    fn slot_mut(&mut self, leaf: usize) -> Option<&mut BTreeSet<ObjectId>> {
        leaf.checked_sub(self.leaf_start)
            .and_then(|slot| self.leaf_objects.get_mut(slot))
    }

    // Returns whether the object was known.
    fn untag(&mut self, id: ObjectId) -> bool {
        let Some(leaves) = self.object_leaves.remove(&id) else {
            return false;
        };
        for leaf in leaves {
            if let Some(set) = self.slot_mut(leaf) {
                set.remove(&id);
            }
        }
        true
    }
}
