//! Spatial queries over a loaded level.
//!
//! Every query descends the level tree (or scans its leaves), tests the
//! objects tagged in the leaves it reaches and, when asked to, the solid
//! brushes stored there. Results go to a [`QueryListener`].
//!
//! # Example
//!
//! ```ignore
//! use bsp_level::query::{CollectingListener, RayQuery};
//! use bsp_level::Ray;
//!
//! let query = RayQuery::new(Ray::new(eye, forward)).with_max_distance(100.0);
//! let mut listener = CollectingListener::new();
//! query.execute(&level, &scene, &mut listener);
//! ```

mod intersection;
mod listener;
mod ray;
mod region;

use bitflags::bitflags;

use crate::{BrushId, ObjectId, SceneObjects};

pub use intersection::{Intersection, IntersectionQuery};
pub use listener::{CollectingListener, FnListener, QueryListener};
pub use ray::{RayHit, RayQuery};
pub use region::{BoxQuery, SphereQuery};

bitflags! {
    /// Kinds of things a query reports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct QueryTypes: u32 {
        const OBJECTS = 1 << 0;
        const WORLD_GEOMETRY = 1 << 1;
    }
}

/// Something a query found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryTarget {
    Object(ObjectId),
    Brush(BrushId),
}

/// Which objects and geometry a query may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFilter {
    /// Objects whose query flags share no bit with this mask are skipped.
    pub query_mask: u32,
    pub types: QueryTypes,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            query_mask: u32::MAX,
            types: QueryTypes::all(),
        }
    }
}

impl QueryFilter {
    #[inline]
    pub(crate) fn wants_objects(&self) -> bool {
        self.types.contains(QueryTypes::OBJECTS)
    }

    #[inline]
    pub(crate) fn wants_world(&self) -> bool {
        self.types.contains(QueryTypes::WORLD_GEOMETRY)
    }

    #[inline]
    pub(crate) fn accepts<O: SceneObjects + ?Sized>(&self, objects: &O, id: ObjectId) -> bool {
        objects.query_flags(id) & self.query_mask != 0
    }
}
