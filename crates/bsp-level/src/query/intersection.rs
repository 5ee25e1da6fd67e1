//! All-pairs overlap query over the leaves of a level.

use std::collections::HashSet;
use std::ops::ControlFlow;

use crate::{Aabb, BrushId, BspLevel, ObjectId, SceneObjects};

use super::{QueryFilter, QueryListener, QueryTarget, QueryTypes};

/// An object overlapping another object or a solid brush.
///
/// For object pairs, `object` is the smaller id of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Intersection {
    pub object: ObjectId,
    pub other: QueryTarget,
}

/// Finds overlapping pairs among the objects sharing a leaf, and objects
/// overlapping the solid brushes of their leaves.
///
/// Bounding boxes are used for every test. A pair whose members share
/// several leaves is reported once.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntersectionQuery {
    pub filter: QueryFilter,
}

impl IntersectionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query_mask(mut self, query_mask: u32) -> Self {
        self.filter.query_mask = query_mask;
        self
    }

    pub fn with_types(mut self, types: QueryTypes) -> Self {
        self.filter.types = types;
        self
    }

    pub fn execute<O, L>(&self, level: &BspLevel, objects: &O, listener: &mut L)
    where
        O: SceneObjects + ?Sized,
        L: QueryListener<Intersection> + ?Sized,
    {
        let _ = self.scan(level, objects, listener);
    }

    fn scan<O, L>(&self, level: &BspLevel, objects: &O, listener: &mut L) -> ControlFlow<()>
    where
        O: SceneObjects + ?Sized,
        L: QueryListener<Intersection> + ?Sized,
    {
        let mut object_pairs: HashSet<(ObjectId, ObjectId)> = HashSet::new();
        let mut brush_pairs: HashSet<(ObjectId, BrushId)> = HashSet::new();
        let mut done: Vec<(ObjectId, Aabb)> = Vec::new();

        for (index, leaf) in level.tree().leaves() {
            done.clear();
            for id in level.objects_in_leaf(index) {
                if !self.filter.accepts(objects, id) {
                    continue;
                }
                let Some(bounds) = objects.world_bounds(id) else {
                    continue;
                };

                if self.filter.wants_objects() {
                    for &(other, other_bounds) in &done {
                        if !bounds.intersects(&other_bounds) {
                            continue;
                        }
                        let pair = (id.min(other), id.max(other));
                        if object_pairs.insert(pair) {
                            listener.on_result(Intersection {
                                object: pair.0,
                                other: QueryTarget::Object(pair.1),
                            })?;
                        }
                    }
                }

                if self.filter.wants_world() {
                    for &brush_id in leaf.solid_brushes() {
                        let hit = level
                            .store()
                            .brush(brush_id)
                            .is_some_and(|brush| brush.intersects_aabb(&bounds));
                        if hit && brush_pairs.insert((id, brush_id)) {
                            listener.on_result(Intersection {
                                object: id,
                                other: QueryTarget::Brush(brush_id),
                            })?;
                        }
                    }
                }

                done.push((id, bounds));
            }
        }
        ControlFlow::Continue(())
    }
}
