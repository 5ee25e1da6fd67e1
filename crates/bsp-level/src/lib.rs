//! BSP level representation with PVS visibility and spatial queries.
//!
//! A level is loaded once from pre-parsed arrays ([`LevelData`]) into a
//! [`BspLevel`]. Each frame a [`VisibilityWalker`] collects the geometry and
//! objects visible from a camera; the [`query`] module answers ray, sphere,
//! box and intersection queries against the same tree.

mod aabb;
mod config;
mod error;
mod frustum;
pub mod level;
mod objects;
mod plane;
pub mod query;
mod ray;
mod sphere;
pub mod walker;

pub use aabb::Aabb;
pub use config::BspOptions;
pub use error::{LoadError, Result};
pub use frustum::{Frustum, FrustumCamera};
pub use level::{
    Brush, BrushId, BspLevel, ContentFlags, FaceGroup, Leaf, LevelData, MaterialHandle, Node,
    ViewPoint,
};
pub use objects::{ObjectId, SceneObject, SceneObjects};
pub use plane::{Plane3D, PlaneSide};
pub use ray::Ray;
pub use sphere::Sphere;
pub use walker::{Camera, FrameBatch, ManualCulling, RenderSink, VisibilityWalker};
