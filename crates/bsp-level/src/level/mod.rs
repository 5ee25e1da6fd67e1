//! The loaded level: spatial tree, visibility table, geometry and object tags.
//!
//! A [`BspLevel`] is built once from pre-parsed [`LevelData`] and is read-only
//! afterwards, except for object tagging which takes `&mut self`.
//!
//! # Example
//!
//! ```ignore
//! use bsp_level::{BspLevel, BspOptions, ObjectId};
//! use nalgebra::Point3;
//!
//! let mut level = BspLevel::load(data, BspOptions::default())?;
//!
//! // Keep movable objects tagged in the leaves they occupy
//! level.notify_moved(ObjectId(1), Point3::new(0.0, 1.0, 0.0), 0.5);
//!
//! // Which leaf is the camera in?
//! let leaf = level.find_leaf(camera_position);
//! ```
//!
//! # Architecture
//!
//! - [`SpatialTree`]: node arena with point and volume descent
//! - [`VisibilityTable`]: cluster-to-cluster PVS bitset
//! - [`FaceGroupStore`]: face groups, brushes and the shared index buffer
//! - [`ObjectTagger`]: which leaves each movable object occupies

mod brush;
mod faces;
mod ingest;
mod node;
mod tagger;
mod tree;
mod vis;

#[cfg(test)]
pub(crate) mod fixtures;

use log::info;
use nalgebra::Point3;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::Result;
use crate::{BspOptions, ObjectId};

pub use brush::{Brush, BrushId, ContentFlags};
pub use faces::{FaceGroup, FaceGroupStore, MaterialHandle, PatchSurface};
pub use ingest::{
    LevelData, RawBrush, RawFace, RawFaceKind, RawLeaf, RawNode, RawPlane, RawVisData, ViewPoint,
};
pub use node::{InternalNode, Leaf, Node};
pub use tagger::ObjectTagger;
pub use tree::{ROOT, SpatialTree};
pub use vis::VisibilityTable;

/// A loaded indoor level.
#[derive(Debug, Clone)]
pub struct BspLevel {
    tree: SpatialTree,
    vis: VisibilityTable,
    store: FaceGroupStore,
    tagger: ObjectTagger,
    options: BspOptions,
    player_starts: Vec<ViewPoint>,
}

impl BspLevel {
    /// Builds a level from parsed arrays, validating every cross reference.
    pub fn load(data: LevelData, options: BspOptions) -> Result<Self> {
        let parts = ingest::build(data)?;
        let tagger = ObjectTagger::new(&parts.tree);

        info!(
            "loaded level: {} nodes, {} leaves, {} face groups, {} brushes, {} clusters, depth {}",
            parts.tree.leaf_start(),
            parts.tree.num_leaves(),
            parts.store.face_groups().len(),
            parts.store.brushes().len(),
            parts.vis.num_clusters(),
            parts.tree.depth(),
        );

        Ok(Self {
            tree: parts.tree,
            vis: parts.vis,
            store: parts.store,
            tagger,
            options,
            player_starts: parts.player_starts,
        })
    }

    #[inline]
    pub fn tree(&self) -> &SpatialTree {
        &self.tree
    }

    #[inline]
    pub fn vis(&self) -> &VisibilityTable {
        &self.vis
    }

    #[inline]
    pub fn store(&self) -> &FaceGroupStore {
        &self.store
    }

    #[inline]
    pub fn tagger(&self) -> &ObjectTagger {
        &self.tagger
    }

    #[inline]
    pub fn options(&self) -> &BspOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: BspOptions) {
        self.options = options;
    }

    /// Node index of the leaf containing `point`.
    #[inline]
    pub fn find_leaf(&self, point: Point3<f32>) -> usize {
        self.tree.find_leaf(point)
    }

    #[inline]
    pub fn leaf(&self, index: usize) -> Option<&Leaf> {
        self.tree.leaf(index)
    }

    /// Whether leaf `to` is in the potentially visible set of leaf `from`.
    ///
    /// Indices that are not leaves are treated as having no cluster.
    pub fn is_leaf_visible(&self, from: usize, to: usize) -> bool {
        let cluster = |index| self.tree.leaf(index).map_or(-1, Leaf::cluster);
        self.vis.is_visible(cluster(from), cluster(to))
    }

    /// Re-tags an object after it moved or changed size.
    pub fn notify_moved(&mut self, id: ObjectId, position: Point3<f32>, radius: f32) {
        self.tagger.notify_moved(&self.tree, id, position, radius);
    }

    /// Forgets an object that left the scene.
    pub fn notify_detached(&mut self, id: ObjectId) {
        self.tagger.notify_detached(id);
    }

    /// Objects tagged in the leaf at node index `leaf`.
    pub fn objects_in_leaf(&self, leaf: usize) -> impl Iterator<Item = ObjectId> + '_ {
        self.tagger.objects_in(leaf)
    }

    #[inline]
    pub fn player_starts(&self) -> &[ViewPoint] {
        &self.player_starts
    }

    /// The first authored player start, if any.
    pub fn suggested_viewpoint(&self) -> Option<&ViewPoint> {
        self.player_starts.first()
    }

    /// A player start picked at random.
    pub fn random_viewpoint<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&ViewPoint> {
        self.player_starts.choose(rng)
    }
}
