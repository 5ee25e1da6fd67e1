//! Ray query: near-to-far descent that stops at the first solid brush.

use std::collections::HashSet;
use std::ops::ControlFlow;

use crate::{BrushId, BspLevel, Leaf, Node, ObjectId, Ray, SceneObjects};

use super::{QueryFilter, QueryListener, QueryTarget, QueryTypes};

/// One thing a ray passed through, with the distance along the query ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub target: QueryTarget,
    pub distance: f32,
}

/// Reports objects and world geometry along a ray, nearest leaves first.
///
/// Objects are reported once each, at the nearest leaf they were hit in. The
/// first solid brush hit is reported and ends the query, so nothing behind a
/// wall is returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayQuery {
    pub ray: Ray,
    pub max_distance: f32,
    pub filter: QueryFilter,
}

impl RayQuery {
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            max_distance: f32::INFINITY,
            filter: QueryFilter::default(),
        }
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
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
        L: QueryListener<RayHit> + ?Sized,
    {
        if self.max_distance < 0.0 {
            return;
        }
        let mut walk = RayWalk {
            level,
            objects,
            listener,
            filter: self.filter,
            seen: HashSet::new(),
        };
        let _ = ray_node(&mut walk, crate::level::ROOT, self.ray, self.max_distance, 0.0);
    }
}

struct RayWalk<'a, O: ?Sized, L: ?Sized> {
    level: &'a BspLevel,
    objects: &'a O,
    listener: &'a mut L,
    filter: QueryFilter,
    seen: HashSet<ObjectId>,
}

/// `traveled` is the distance from the query's origin to `ray.origin`.
fn ray_node<O, L>(
    walk: &mut RayWalk<'_, O, L>,
    index: usize,
    ray: Ray,
    max_distance: f32,
    traveled: f32,
) -> ControlFlow<()>
where
    O: SceneObjects + ?Sized,
    L: QueryListener<RayHit> + ?Sized,
{
    let level = walk.level;
    match level.tree().node(index) {
        Some(Node::Leaf(leaf)) => ray_leaf(walk, index, leaf, &ray, max_distance, traveled),
        Some(Node::Internal(node)) => match ray.intersect_plane(node.plane()) {
            Some(t) if t < max_distance => {
                let (near, far) = if node.distance(ray.origin) < 0.0 {
                    (node.back(), node.front())
                } else {
                    (node.front(), node.back())
                };
                ray_node(walk, near, ray, t, traveled)?;
                let rest = Ray::new(ray.at(t), ray.direction);
                ray_node(walk, far, rest, max_distance - t, traveled + t)
            }
            // The ray stays on one side within range
            _ => ray_node(walk, node.next_node(ray.origin), ray, max_distance, traveled),
        },
        None => ControlFlow::Continue(()),
    }
}

fn ray_leaf<O, L>(
    walk: &mut RayWalk<'_, O, L>,
    index: usize,
    leaf: &Leaf,
    ray: &Ray,
    max_distance: f32,
    traveled: f32,
) -> ControlFlow<()>
where
    O: SceneObjects + ?Sized,
    L: QueryListener<RayHit> + ?Sized,
{
    let level = walk.level;

    if walk.filter.wants_objects() {
        for id in level.objects_in_leaf(index) {
            if walk.seen.contains(&id) || !walk.filter.accepts(walk.objects, id) {
                continue;
            }
            let hit = walk
                .objects
                .world_bounds(id)
                .and_then(|bounds| ray.intersect_aabb(&bounds))
                .filter(|&t| t <= max_distance);
            if let Some(t) = hit {
                walk.seen.insert(id);
                walk.listener.on_result(RayHit {
                    target: QueryTarget::Object(id),
                    distance: t + traveled,
                })?;
            }
        }
    }

    if walk.filter.wants_world() {
        let mut closest: Option<(BrushId, f32)> = None;
        for &brush_id in leaf.solid_brushes() {
            let hit = level
                .store()
                .brush(brush_id)
                .and_then(|brush| brush.intersect_ray(ray))
                .filter(|&t| t <= max_distance);
            if let Some(t) = hit {
                if closest.is_none_or(|(_, best)| t < best) {
                    closest = Some((brush_id, t));
                }
            }
        }
        if let Some((brush_id, t)) = closest {
            walk.listener.on_result(RayHit {
                target: QueryTarget::Brush(brush_id),
                distance: t + traveled,
            })?;
            // Solid world geometry blocks the rest of the ray
            return ControlFlow::Break(());
        }
    }

    ControlFlow::Continue(())
}
