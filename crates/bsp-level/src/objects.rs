//! Movable objects as seen by the level.
//!
//! The level only ever stores [`ObjectId`]s. Everything else about an object
//! (bounds, flags) is owned by the scene and read through [`SceneObjects`].

use std::collections::HashMap;

use crate::Aabb;

/// Identifier of a movable scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

/// Read access to movable object state owned by the scene graph.
pub trait SceneObjects {
    /// World-space bounds, or `None` if the scene no longer knows the object.
    fn world_bounds(&self, id: ObjectId) -> Option<Aabb>;

    /// Flags tested against a query's mask.
    fn query_flags(&self, _id: ObjectId) -> u32 {
        u32::MAX
    }

    fn is_visible(&self, _id: ObjectId) -> bool {
        true
    }

    fn casts_shadows(&self, _id: ObjectId) -> bool {
        true
    }
}

/// Plain object record for scenes that keep their objects in a map.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub bounds: Aabb,
    pub query_flags: u32,
    pub visible: bool,
    pub cast_shadows: bool,
}

impl SceneObject {
    /// A visible, shadow-casting object matching every query mask.
    pub fn new(bounds: Aabb) -> Self {
        Self {
            bounds,
            query_flags: u32::MAX,
            visible: true,
            cast_shadows: true,
        }
    }
}

impl SceneObjects for HashMap<ObjectId, SceneObject> {
    fn world_bounds(&self, id: ObjectId) -> Option<Aabb> {
        self.get(&id).map(|o| o.bounds)
    }

    fn query_flags(&self, id: ObjectId) -> u32 {
        self.get(&id).map_or(0, |o| o.query_flags)
    }

    fn is_visible(&self, id: ObjectId) -> bool {
        self.get(&id).is_some_and(|o| o.visible)
    }

    fn casts_shadows(&self, id: ObjectId) -> bool {
        self.get(&id).is_some_and(|o| o.cast_shadows)
    }
}
