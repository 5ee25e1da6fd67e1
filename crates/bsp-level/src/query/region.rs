//! Sphere and box region queries.

use std::collections::HashSet;
use std::ops::ControlFlow;

use crate::{Aabb, Brush, BrushId, BspLevel, ObjectId, SceneObjects, Sphere};

use super::{QueryFilter, QueryListener, QueryTarget, QueryTypes};

/// Reports objects and solid brushes overlapping a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereQuery {
    pub sphere: Sphere,
    pub filter: QueryFilter,
}

impl SphereQuery {
    pub fn new(sphere: Sphere) -> Self {
        Self {
            sphere,
            filter: QueryFilter::default(),
        }
    }

    pub fn with_query_mask(mut self, query_mask: u32) -> Self {
        self.filter.query_mask = query_mask;
        self
    }

    pub fn with_types(mut self, types: QueryTypes) -> Self {
        self.filter.types = types;
        self
    }

    /// Each object and brush is reported at most once, even when it spans
    /// several of the leaves the sphere reaches.
    pub fn execute<O, L>(&self, level: &BspLevel, objects: &O, listener: &mut L)
    where
        O: SceneObjects + ?Sized,
        L: QueryListener<QueryTarget> + ?Sized,
    {
        if self.sphere.radius < 0.0 {
            return;
        }
        let mut leaves = Vec::new();
        level
            .tree()
            .for_each_leaf_in_sphere(self.sphere.center, self.sphere.radius, &mut |leaf| {
                leaves.push(leaf)
            });
        let _ = report_region(
            level,
            &leaves,
            self.filter,
            objects,
            listener,
            |bounds| self.sphere.intersects_aabb(bounds),
            |brush| brush.intersects_sphere(&self.sphere),
        );
    }
}

/// Reports objects and solid brushes overlapping an axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxQuery {
    pub aabb: Aabb,
    pub filter: QueryFilter,
}

impl BoxQuery {
    pub fn new(aabb: Aabb) -> Self {
        Self {
            aabb,
            filter: QueryFilter::default(),
        }
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
        L: QueryListener<QueryTarget> + ?Sized,
    {
        let mut leaves = Vec::new();
        level
            .tree()
            .for_each_leaf_in_box(&self.aabb, &mut |leaf| leaves.push(leaf));
        let _ = report_region(
            level,
            &leaves,
            self.filter,
            objects,
            listener,
            |bounds| self.aabb.intersects(bounds),
            |brush| brush.intersects_aabb(&self.aabb),
        );
    }
}

fn report_region<O, L>(
    level: &BspLevel,
    leaves: &[usize],
    filter: QueryFilter,
    objects: &O,
    listener: &mut L,
    object_test: impl Fn(&Aabb) -> bool,
    brush_test: impl Fn(&Brush) -> bool,
) -> ControlFlow<()>
where
    O: SceneObjects + ?Sized,
    L: QueryListener<QueryTarget> + ?Sized,
{
    let mut seen_objects: HashSet<ObjectId> = HashSet::new();
    let mut seen_brushes: HashSet<BrushId> = HashSet::new();

    for &index in leaves {
        if filter.wants_objects() {
            for id in level.objects_in_leaf(index) {
                if seen_objects.contains(&id) || !filter.accepts(objects, id) {
                    continue;
                }
                let Some(bounds) = objects.world_bounds(id) else {
                    continue;
                };
                if object_test(&bounds) {
                    seen_objects.insert(id);
                    listener.on_result(QueryTarget::Object(id))?;
                }
            }
        }

        if filter.wants_world() {
            let Some(leaf) = level.leaf(index) else {
                continue;
            };
            for &brush_id in leaf.solid_brushes() {
                if seen_brushes.contains(&brush_id) {
                    continue;
                }
                if level.store().brush(brush_id).is_some_and(|brush| brush_test(brush)) {
                    seen_brushes.insert(brush_id);
                    listener.on_result(QueryTarget::Brush(brush_id))?;
                }
            }
        }
    }
    ControlFlow::Continue(())
}
