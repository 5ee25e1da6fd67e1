//! Renderable face groups and the arrays they index into.

use log::{trace, warn};

use crate::{Brush, BrushId, Plane3D};

/// Handle of a material owned by the material collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialHandle(pub u64);

/// A tessellated curved surface placed in the level's shared buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSurface {
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: usize,
    pub index_count: usize,
}

/// A batch of level geometry sharing one material.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceGroup {
    /// Flat polygons or meshes: an element range rebased by `vertex_start`.
    FaceList {
        plane: Plane3D,
        material: MaterialHandle,
        vertex_start: u32,
        vertex_count: u32,
        element_start: usize,
        element_count: usize,
        is_sky: bool,
    },
    /// Subdivided patch surface with its own vertex and index range.
    Patch {
        surface: PatchSurface,
        material: MaterialHandle,
        is_sky: bool,
    },
    /// Degenerate or unsupported data. Never drawn.
    Unknown,
}

impl FaceGroup {
    pub fn material(&self) -> Option<MaterialHandle> {
        match self {
            FaceGroup::FaceList { material, .. } | FaceGroup::Patch { material, .. } => {
                Some(*material)
            }
            FaceGroup::Unknown => None,
        }
    }

    pub fn is_sky(&self) -> bool {
        match self {
            FaceGroup::FaceList { is_sky, .. } | FaceGroup::Patch { is_sky, .. } => *is_sky,
            FaceGroup::Unknown => false,
        }
    }

    /// Supporting plane, available for flat face lists only.
    pub fn plane(&self) -> Option<&Plane3D> {
        match self {
            FaceGroup::FaceList { plane, .. } => Some(plane),
            FaceGroup::Patch { .. } | FaceGroup::Unknown => None,
        }
    }

    /// `(first index, index count, vertex offset)` in the shared buffers.
    pub fn index_range(&self) -> Option<(usize, usize, u32)> {
        match self {
            FaceGroup::FaceList {
                element_start,
                element_count,
                vertex_start,
                ..
            } => Some((*element_start, *element_count, *vertex_start)),
            FaceGroup::Patch { surface, .. } => {
                Some((surface.index_offset, surface.index_count, surface.vertex_offset))
            }
            FaceGroup::Unknown => None,
        }
    }
}

/// Flat arrays of face groups, leaf-face references, brushes and indices.
#[derive(Debug, Clone, Default)]
pub struct FaceGroupStore {
    pub(crate) face_groups: Vec<FaceGroup>,
    pub(crate) leaf_faces: Vec<usize>,
    pub(crate) brushes: Vec<Brush>,
    pub(crate) indexes: Vec<u32>,
}

impl FaceGroupStore {
    #[inline]
    pub fn face_groups(&self) -> &[FaceGroup] {
        &self.face_groups
    }

    #[inline]
    pub fn face_group(&self, index: usize) -> Option<&FaceGroup> {
        self.face_groups.get(index)
    }

    /// Face group indices referenced by a leaf's range in the leaf-face array.
    pub fn leaf_face_groups(&self, start: usize, count: usize) -> &[usize] {
        start
            .checked_add(count)
            .and_then(|end| self.leaf_faces.get(start..end))
            .unwrap_or(&[])
    }

    #[inline]
    pub fn brushes(&self) -> &[Brush] {
        &self.brushes
    }

    #[inline]
    pub fn brush(&self, id: BrushId) -> Option<&Brush> {
        self.brushes.get(id.index())
    }

    /// The level's shared index buffer.
    #[inline]
    pub fn indexes(&self) -> &[u32] {
        &self.indexes
    }

    /// Appends the indices of one face group to `out`, rebased onto its
    /// vertex range, and returns how many were written.
    pub fn cache_geometry(&self, face_group: usize, skip_sky: bool, out: &mut Vec<u32>) -> usize {
        let Some(group) = self.face_groups.get(face_group) else {
            return 0;
        };
        if skip_sky && group.is_sky() {
            return 0;
        }
        let Some((start, count, vertex_offset)) = group.index_range() else {
            trace!("face group {face_group} has no geometry to cache");
            return 0;
        };
        let Some(source) = start
            .checked_add(count)
            .and_then(|end| self.indexes.get(start..end))
        else {
            return 0;
        };
        let written = out.len();
        for &index in source {
            let Some(rebased) = index.checked_add(vertex_offset) else {
                warn!("face group {face_group}: vertex offset {vertex_offset} overflows, skipping");
                out.truncate(written);
                return 0;
            };
            out.push(rebased);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn store() -> FaceGroupStore {
        FaceGroupStore {
            face_groups: vec![
                FaceGroup::FaceList {
                    plane: Plane3D::new(Vector3::new(0.0, 0.0, 1.0), 0.0),
                    material: MaterialHandle(7),
                    vertex_start: 10,
                    vertex_count: 3,
                    element_start: 0,
                    element_count: 3,
                    is_sky: false,
                },
                FaceGroup::Patch {
                    surface: PatchSurface {
                        vertex_offset: 100,
                        vertex_count: 4,
                        index_offset: 3,
                        index_count: 6,
                    },
                    material: MaterialHandle(8),
                    is_sky: false,
                },
                FaceGroup::Unknown,
                FaceGroup::FaceList {
                    plane: Plane3D::new(Vector3::new(0.0, 0.0, -1.0), 50.0),
                    material: MaterialHandle(9),
                    vertex_start: 0,
                    vertex_count: 3,
                    element_start: 0,
                    element_count: 3,
                    is_sky: true,
                },
            ],
            leaf_faces: vec![0, 1, 2, 3],
            brushes: Vec::new(),
            indexes: vec![0, 1, 2, 0, 1, 2, 2, 1, 3],
        }
    }

    #[test]
    fn face_list_indices_are_rebased() {
        let mut out = Vec::new();
        assert_eq!(store().cache_geometry(0, true, &mut out), 3);
        assert_eq!(out, vec![10, 11, 12]);
    }

    #[test]
    fn patch_uses_its_surface_range() {
        let mut out = vec![99];
        assert_eq!(store().cache_geometry(1, true, &mut out), 6);
        assert_eq!(out, vec![99, 100, 101, 102, 102, 101, 103]);
    }

    #[test]
    fn unknown_and_sky_contribute_nothing() {
        let store = store();
        let mut out = Vec::new();
        assert_eq!(store.cache_geometry(2, true, &mut out), 0);
        assert_eq!(store.cache_geometry(3, true, &mut out), 0);
        assert!(out.is_empty());

        assert_eq!(store.cache_geometry(3, false, &mut out), 3);
    }

    #[test]
    fn accessors_follow_variant() {
        let store = store();
        assert_eq!(store.face_groups()[1].material(), Some(MaterialHandle(8)));
        assert!(store.face_groups()[1].plane().is_none());
        assert!(store.face_groups()[0].plane().is_some());
        assert_eq!(store.face_groups()[2].material(), None);
        assert_eq!(store.leaf_face_groups(1, 2), &[1, 2]);
        assert!(store.leaf_face_groups(3, 5).is_empty());
        assert!(store.leaf_face_groups(2, usize::MAX).is_empty());
    }

    #[test]
    fn overflowing_rebase_is_skipped() {
        let mut store = store();
        store.face_groups[0] = FaceGroup::FaceList {
            plane: Plane3D::new(Vector3::new(0.0, 0.0, 1.0), 0.0),
            material: MaterialHandle(7),
            vertex_start: u32::MAX - 1,
            vertex_count: 3,
            element_start: 0,
            element_count: 3,
            is_sky: false,
        };
        let mut out = vec![5];
        assert_eq!(store.cache_geometry(0, true, &mut out), 0);
        assert_eq!(out, vec![5]);
        // Other groups are unaffected
        assert_eq!(store.cache_geometry(1, true, &mut out), 6);
    }
}
