//! Conversion of parsed level arrays into the runtime level.
//!
//! The file parser hands over flat arrays that refer to each other by index.
//! Everything is resolved and range-checked here in a single pass, so the
//! runtime structures can index without further checks.

use log::{debug, warn};
use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::error::{LoadError, Result};
use crate::{Aabb, Brush, BrushId, ContentFlags, Plane3D};

use super::faces::{FaceGroup, FaceGroupStore, MaterialHandle, PatchSurface};
use super::node::{InternalNode, Leaf, Node};
use super::tree::{ROOT, SpatialTree};
use super::vis::VisibilityTable;

/// Plane as stored in the level: `normal · p = distance`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawPlane {
    pub normal: [f32; 3],
    pub distance: f32,
}

/// Splitting node. Negative children encode leaf `!child`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawNode {
    pub plane: usize,
    pub bounds: [f32; 6],
    pub front: i32,
    pub back: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawLeaf {
    pub bounds: [f32; 6],
    pub cluster: i32,
    /// Range into [`LevelData::leaf_faces`].
    pub face_start: usize,
    pub face_count: usize,
    /// Range into [`LevelData::leaf_brushes`].
    pub brush_start: usize,
    pub brush_count: usize,
}

/// Brush as a list of plane indices with outward normals.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBrush {
    pub planes: Vec<usize>,
    pub contents: ContentFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFaceKind {
    Polygon,
    Patch,
    Mesh,
    Billboard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawFace {
    pub kind: RawFaceKind,
    pub material: MaterialHandle,
    pub vertex_start: u32,
    pub vertex_count: u32,
    pub element_start: usize,
    pub element_count: usize,
    /// Plane of flat faces, given as a normal and a point on the face.
    pub normal: [f32; 3],
    pub origin: [f32; 3],
    /// Patch control grid size; a zero width marks a broken patch.
    pub patch_size: [u32; 2],
    /// Placement of the tessellated patch in the shared buffers.
    pub patch: Option<PatchSurface>,
    pub is_sky: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawVisData {
    pub num_clusters: usize,
    pub row_length: usize,
    pub data: Vec<u8>,
}

/// A spawn point authored in the level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPoint {
    pub position: Point3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

/// Everything the parser extracts from a level file.
#[derive(Debug, Clone, Default)]
pub struct LevelData {
    pub planes: Vec<RawPlane>,
    pub nodes: Vec<RawNode>,
    pub leaves: Vec<RawLeaf>,
    pub leaf_faces: Vec<i32>,
    pub leaf_brushes: Vec<i32>,
    pub brushes: Vec<RawBrush>,
    pub faces: Vec<RawFace>,
    pub indexes: Vec<u32>,
    pub vis: RawVisData,
    pub player_starts: Vec<ViewPoint>,
}

/// Runtime structures built from [`LevelData`].
pub(crate) struct LevelParts {
    pub(crate) tree: SpatialTree,
    pub(crate) vis: VisibilityTable,
    pub(crate) store: FaceGroupStore,
    pub(crate) player_starts: Vec<ViewPoint>,
}

pub(crate) fn build(mut data: LevelData) -> Result<LevelParts> {
    if data.leaves.is_empty() {
        return Err(LoadError::NoLeaves);
    }

    let face_groups = convert_faces(&data.faces, &data.indexes)?;
    let brushes = convert_brushes(&data.brushes, &data.planes)?;
    let leaf_faces = convert_leaf_faces(&data.leaf_faces, face_groups.len())?;
    let vis = convert_vis(std::mem::take(&mut data.vis))?;

    let leaf_start = data.nodes.len();
    let mut nodes = Vec::with_capacity(data.nodes.len() + data.leaves.len());
    for (index, raw) in data.nodes.iter().enumerate() {
        nodes.push(Node::Internal(convert_node(index, raw, &data)?));
    }
    for (index, raw) in data.leaves.iter().enumerate() {
        nodes.push(Node::Leaf(convert_leaf(index, raw, &data, &brushes, &vis)?));
    }
    check_tree(&nodes)?;

    let tree = SpatialTree::from_nodes(nodes, leaf_start);
    let store = FaceGroupStore {
        face_groups,
        leaf_faces,
        brushes,
        indexes: data.indexes,
    };

    Ok(LevelParts {
        tree,
        vis,
        store,
        player_starts: data.player_starts,
    })
}

fn plane_from_raw(raw: &RawPlane) -> Plane3D {
    Plane3D::from_parts(Vector3::from(raw.normal), raw.distance)
}

/// Whether every index stays within `u32` once shifted by `vertex_offset`.
fn rebase_fits(elements: &[u32], vertex_offset: u32) -> bool {
    elements
        .iter()
        .max()
        .is_none_or(|&max| max.checked_add(vertex_offset).is_some())
}

fn convert_faces(faces: &[RawFace], indexes: &[u32]) -> Result<Vec<FaceGroup>> {
    let index_count = indexes.len();
    let check_range = |face: usize, start: usize, count: usize| {
        if start.checked_add(count).is_none_or(|end| end > index_count) {
            Err(LoadError::ElementRange {
                face,
                start,
                count,
                len: index_count,
            })
        } else {
            Ok(())
        }
    };

    let mut groups = Vec::with_capacity(faces.len());
    for (index, raw) in faces.iter().enumerate() {
        let group = match raw.kind {
            RawFaceKind::Polygon | RawFaceKind::Mesh => {
                check_range(index, raw.element_start, raw.element_count)?;
                let elements = &indexes[raw.element_start..raw.element_start + raw.element_count];
                if !rebase_fits(elements, raw.vertex_start) {
                    warn!(
                        "face {index}: vertex start {} overflows its indices, ignoring",
                        raw.vertex_start
                    );
                    groups.push(FaceGroup::Unknown);
                    continue;
                }
                let normal = Vector3::from(raw.normal);
                let offset = normal.dot(&Vector3::from(raw.origin));
                FaceGroup::FaceList {
                    plane: Plane3D::from_parts(normal, offset),
                    material: raw.material,
                    vertex_start: raw.vertex_start,
                    vertex_count: raw.vertex_count,
                    element_start: raw.element_start,
                    element_count: raw.element_count,
                    is_sky: raw.is_sky,
                }
            }
            RawFaceKind::Patch if raw.vertex_count == 0 || raw.patch_size[0] == 0 => {
                warn!("face {index}: patch without control points, ignoring");
                FaceGroup::Unknown
            }
            RawFaceKind::Patch => match raw.patch {
                Some(surface) if surface.vertex_count > 0 && surface.index_count > 0 => {
                    check_range(index, surface.index_offset, surface.index_count)?;
                    let elements = &indexes
                        [surface.index_offset..surface.index_offset + surface.index_count];
                    if !rebase_fits(elements, surface.vertex_offset) {
                        warn!(
                            "face {index}: patch vertex offset {} overflows its indices, ignoring",
                            surface.vertex_offset
                        );
                        groups.push(FaceGroup::Unknown);
                        continue;
                    }
                    FaceGroup::Patch {
                        surface,
                        material: raw.material,
                        is_sky: raw.is_sky,
                    }
                }
                _ => {
                    warn!("face {index}: patch was not tessellated, ignoring");
                    FaceGroup::Unknown
                }
            },
            RawFaceKind::Billboard => {
                debug!("face {index}: billboard faces are not drawn");
                FaceGroup::Unknown
            }
        };
        groups.push(group);
    }
    Ok(groups)
}

fn convert_brushes(brushes: &[RawBrush], planes: &[RawPlane]) -> Result<Vec<Brush>> {
    brushes
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let sides = raw
                .planes
                .iter()
                .map(|&plane| {
                    planes
                        .get(plane)
                        .map(plane_from_raw)
                        .ok_or(LoadError::BrushPlaneOutOfRange {
                            brush: index,
                            plane,
                            count: planes.len(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            if sides.is_empty() {
                warn!("brush {index} has no planes and will never be hit");
            }
            Ok(Brush::new(sides, raw.contents))
        })
        .collect()
}

fn convert_leaf_faces(leaf_faces: &[i32], face_count: usize) -> Result<Vec<usize>> {
    leaf_faces
        .iter()
        .enumerate()
        .map(|(entry, &face)| match usize::try_from(face) {
            Ok(index) if index < face_count => Ok(index),
            _ => Err(LoadError::FaceOutOfRange {
                entry,
                face,
                count: face_count,
            }),
        })
        .collect()
}

fn convert_vis(raw: RawVisData) -> Result<VisibilityTable> {
    let RawVisData {
        num_clusters,
        row_length,
        mut data,
    } = raw;
    if num_clusters > row_length.saturating_mul(8) {
        return Err(LoadError::VisRowTooShort {
            row_length,
            clusters: num_clusters,
        });
    }
    let expected = num_clusters
        .checked_mul(row_length)
        .ok_or(LoadError::VisTableOverflow {
            row_length,
            clusters: num_clusters,
        })?;
    if data.len() < expected {
        return Err(LoadError::VisTableTooSmall {
            len: data.len(),
            expected,
        });
    }
    data.truncate(expected);
    Ok(VisibilityTable::new(num_clusters, row_length, data))
}

fn resolve_child(node: usize, child: i32, data: &LevelData) -> Result<usize> {
    let num_nodes = data.nodes.len();
    let resolved = if child < 0 {
        // Leaves are encoded as the bitwise complement of their index
        let leaf = (!child) as usize;
        (leaf < data.leaves.len()).then_some(num_nodes + leaf)
    } else {
        let index = child as usize;
        (index < num_nodes).then_some(index)
    };
    resolved.ok_or(LoadError::ChildOutOfRange { node, child })
}

fn convert_node(index: usize, raw: &RawNode, data: &LevelData) -> Result<InternalNode> {
    let plane = data
        .planes
        .get(raw.plane)
        .ok_or(LoadError::NodePlaneOutOfRange {
            node: index,
            plane: raw.plane,
            count: data.planes.len(),
        })?;
    Ok(InternalNode {
        plane: plane_from_raw(plane),
        bounds: Aabb::from_array(raw.bounds),
        front: resolve_child(index, raw.front, data)?,
        back: resolve_child(index, raw.back, data)?,
    })
}

fn convert_leaf(
    index: usize,
    raw: &RawLeaf,
    data: &LevelData,
    brushes: &[Brush],
    vis: &VisibilityTable,
) -> Result<Leaf> {
    if raw.cluster < -1 || (raw.cluster >= 0 && raw.cluster as usize >= vis.num_clusters()) {
        return Err(LoadError::ClusterOutOfRange {
            leaf: index,
            cluster: raw.cluster,
            clusters: vis.num_clusters(),
        });
    }

    if raw
        .face_start
        .checked_add(raw.face_count)
        .is_none_or(|end| end > data.leaf_faces.len())
    {
        return Err(LoadError::LeafFaceRange {
            leaf: index,
            start: raw.face_start,
            count: raw.face_count,
            len: data.leaf_faces.len(),
        });
    }

    let entries = raw
        .brush_start
        .checked_add(raw.brush_count)
        .and_then(|end| data.leaf_brushes.get(raw.brush_start..end))
        .ok_or(LoadError::LeafBrushRange {
            leaf: index,
            start: raw.brush_start,
            count: raw.brush_count,
            len: data.leaf_brushes.len(),
        })?;

    let mut solid_brushes = Vec::new();
    for (offset, &brush) in entries.iter().enumerate() {
        let resolved = usize::try_from(brush)
            .ok()
            .and_then(|i| brushes.get(i).map(|b| (i, b)));
        let Some((brush_index, resolved)) = resolved else {
            return Err(LoadError::BrushOutOfRange {
                entry: raw.brush_start + offset,
                brush,
                count: brushes.len(),
            });
        };
        // Only solid brushes matter to queries
        if resolved.is_solid() {
            solid_brushes.push(BrushId(brush_index as u32));
        }
    }

    Ok(Leaf {
        bounds: Aabb::from_array(raw.bounds),
        cluster: raw.cluster,
        face_group_start: raw.face_start,
        face_group_count: raw.face_count,
        solid_brushes,
    })
}

/// Checks that no node is reachable twice from the root.
fn check_tree(nodes: &[Node]) -> Result<()> {
    let mut visited = vec![false; nodes.len()];
    let mut stack = vec![ROOT];
    while let Some(index) = stack.pop() {
        if std::mem::replace(&mut visited[index], true) {
            return Err(LoadError::NotATree { node: index });
        }
        if let Node::Internal(node) = &nodes[index] {
            stack.push(node.back);
            stack.push(node.front);
        }
    }
    let unreachable = visited.iter().filter(|v| !**v).count();
    if unreachable > 0 {
        debug!("{unreachable} nodes are not reachable from the root");
    }
    Ok(())
}
