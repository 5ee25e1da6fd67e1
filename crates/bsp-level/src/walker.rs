//! Per-frame potentially-visible-set walk.
//!
//! [`VisibilityWalker::walk`] locates the camera's leaf, scans every leaf the
//! PVS marks visible from it, and gathers face groups (batched by material)
//! and tagged objects into a [`FrameBatch`]. The batch is then handed to a
//! [`RenderSink`] with [`FrameBatch::submit`].

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use nalgebra::Point3;

use crate::{Aabb, BspLevel, Leaf, MaterialHandle, ObjectId, SceneObjects};

/// The viewer a frame is walked for.
pub trait Camera {
    fn position(&self) -> Point3<f32>;

    /// Whether `bounds` is at least partly inside the view volume.
    fn is_visible(&self, bounds: &Aabb) -> bool;
}

/// Material-requested culling of flat faces against the camera position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManualCulling {
    #[default]
    None,
    /// Drop faces the camera is behind.
    Back,
    /// Drop faces the camera is in front of.
    Front,
}

/// Lookup of a material's manual culling mode.
pub trait MaterialCulling {
    fn culling_mode(&self, material: MaterialHandle) -> ManualCulling;
}

impl MaterialCulling for HashMap<MaterialHandle, ManualCulling> {
    fn culling_mode(&self, material: MaterialHandle) -> ManualCulling {
        self.get(&material).copied().unwrap_or_default()
    }
}

/// Every material draws both sides.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCulling;

impl MaterialCulling for NoCulling {
    fn culling_mode(&self, _material: MaterialHandle) -> ManualCulling {
        ManualCulling::None
    }
}

/// Receiver of the geometry and objects found visible in a frame.
pub trait RenderSink {
    /// Draws level geometry. `indices` point into the level's vertex buffer.
    fn draw_indexed(&mut self, material: MaterialHandle, indices: &[u32]);

    fn queue_object(&mut self, id: ObjectId);
}

/// What one walk found visible.
#[derive(Debug, Clone, Default)]
pub struct FrameBatch {
    camera_leaf: usize,
    visible_leaves: usize,
    geometry: BTreeMap<MaterialHandle, Vec<usize>>,
    objects: Vec<ObjectId>,
    leaf_bounds: Vec<Aabb>,
}

impl FrameBatch {
    /// Node index of the leaf the camera is in.
    #[inline]
    pub fn camera_leaf(&self) -> usize {
        self.camera_leaf
    }

    /// Number of leaves processed this frame.
    #[inline]
    pub fn visible_leaves(&self) -> usize {
        self.visible_leaves
    }

    /// Visible face group indices keyed by material, in handle order.
    #[inline]
    pub fn geometry(&self) -> &BTreeMap<MaterialHandle, Vec<usize>> {
        &self.geometry
    }

    /// Visible objects in the order they were first reached.
    #[inline]
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Bounds of processed leaves, collected only when
    /// [`BspOptions::collect_leaf_bounds`](crate::BspOptions) is set.
    #[inline]
    pub fn leaf_bounds(&self) -> &[Aabb] {
        &self.leaf_bounds
    }

    /// Number of face groups across all materials.
    pub fn face_group_count(&self) -> usize {
        self.geometry.values().map(Vec::len).sum()
    }

    pub fn contains_face_group(&self, face_group: usize) -> bool {
        self.geometry.values().any(|groups| groups.contains(&face_group))
    }

    /// Hands the batch to a renderer.
    ///
    /// Each material gets one `draw_indexed` call with the indices of all its
    /// face groups, rebased onto their vertex ranges. Materials that end up
    /// with no indices are not drawn. Objects are queued afterwards.
    pub fn submit<S: RenderSink + ?Sized>(&self, level: &BspLevel, sink: &mut S) {
        let skip_sky = level.options().skip_sky;
        let mut indices = Vec::new();
        for (&material, groups) in &self.geometry {
            indices.clear();
            for &group in groups {
                level.store().cache_geometry(group, skip_sky, &mut indices);
            }
            if !indices.is_empty() {
                sink.draw_indexed(material, &indices);
            }
        }
        for &id in &self.objects {
            sink.queue_object(id);
        }
    }

    /// Keeps only the shadow casters that were visible this frame.
    pub fn retain_visible_casters(&self, casters: &mut Vec<ObjectId>) {
        let seen: HashSet<ObjectId> = self.objects.iter().copied().collect();
        casters.retain(|id| seen.contains(id));
    }

    fn clear(&mut self) {
        self.camera_leaf = 0;
        self.visible_leaves = 0;
        self.geometry.clear();
        self.objects.clear();
        self.leaf_bounds.clear();
    }
}

/// Walks the PVS for one camera.
///
/// Holds the per-frame scratch state, so use one walker per concurrently
/// rendered camera. The state is reused between frames.
#[derive(Debug, Default)]
pub struct VisibilityWalker {
    processed_faces: Vec<bool>,
    emitted: HashSet<ObjectId>,
    batch: FrameBatch,
}

impl VisibilityWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The result of the last walk.
    #[inline]
    pub fn batch(&self) -> &FrameBatch {
        &self.batch
    }

    /// Collects what `camera` can potentially see.
    ///
    /// With `only_shadow_casters` set, static geometry is skipped and only
    /// objects that cast shadows are gathered.
    pub fn walk<C, M, O>(
        &mut self,
        level: &BspLevel,
        camera: &C,
        materials: &M,
        objects: &O,
        only_shadow_casters: bool,
    ) -> &FrameBatch
    where
        C: Camera + ?Sized,
        M: MaterialCulling + ?Sized,
        O: SceneObjects + ?Sized,
    {
        let eye = camera.position();
        let camera_leaf = level.find_leaf(eye);
        let camera_cluster = level.leaf(camera_leaf).map_or(-1, Leaf::cluster);

        self.batch.clear();
        self.batch.camera_leaf = camera_leaf;
        self.emitted.clear();
        self.processed_faces.clear();
        self.processed_faces
            .resize(level.store().face_groups().len(), false);

        let options = level.options();
        for (index, leaf) in level.tree().leaves() {
            let potentially_visible = if leaf.cluster() < 0 {
                camera_cluster < 0
            } else {
                level.vis().is_visible(camera_cluster, leaf.cluster())
            };
            if !potentially_visible {
                continue;
            }
            if options.cull_leaves_by_frustum && !camera.is_visible(leaf.bounds()) {
                continue;
            }
            self.process_leaf(
                level,
                index,
                leaf,
                eye,
                camera,
                materials,
                objects,
                only_shadow_casters,
            );
        }

        debug!(
            "walk from leaf {} (cluster {}): {} leaves, {} face groups in {} materials, {} objects",
            camera_leaf,
            camera_cluster,
            self.batch.visible_leaves,
            self.batch.face_group_count(),
            self.batch.geometry.len(),
            self.batch.objects.len(),
        );
        &self.batch
    }

    #[allow(clippy::too_many_arguments)]
    fn process_leaf<C, M, O>(
        &mut self,
        level: &BspLevel,
        index: usize,
        leaf: &Leaf,
        eye: Point3<f32>,
        camera: &C,
        materials: &M,
        objects: &O,
        only_shadow_casters: bool,
    ) where
        C: Camera + ?Sized,
        M: MaterialCulling + ?Sized,
        O: SceneObjects + ?Sized,
    {
        self.batch.visible_leaves += 1;
        if level.options().collect_leaf_bounds {
            self.batch.leaf_bounds.push(*leaf.bounds());
        }

        if !only_shadow_casters {
            let store = level.store();
            let groups = store.leaf_face_groups(leaf.face_group_start(), leaf.face_group_count());
            for &group_index in groups {
                let Some(seen) = self.processed_faces.get_mut(group_index) else {
                    continue;
                };
                if std::mem::replace(seen, true) {
                    continue;
                }
                let Some(group) = store.face_group(group_index) else {
                    continue;
                };
                let Some(material) = group.material() else {
                    continue;
                };
                if let Some(plane) = group.plane() {
                    let dist = plane.signed_distance(eye);
                    let culled = match materials.culling_mode(material) {
                        ManualCulling::Back => dist < 0.0,
                        ManualCulling::Front => dist > 0.0,
                        ManualCulling::None => false,
                    };
                    if culled {
                        continue;
                    }
                }
                self.batch
                    .geometry
                    .entry(material)
                    .or_default()
                    .push(group_index);
            }
        }

        for id in level.objects_in_leaf(index) {
            if self.emitted.contains(&id) {
                continue;
            }
            if !objects.is_visible(id) || (only_shadow_casters && !objects.casts_shadows(id)) {
                continue;
            }
            let Some(bounds) = objects.world_bounds(id) else {
                continue;
            };
            if camera.is_visible(&bounds) {
                self.emitted.insert(id);
                self.batch.objects.push(id);
            }
        }
    }
}
