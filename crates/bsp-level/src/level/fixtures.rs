//! Small hand-built levels shared by the unit tests.

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::{BspLevel, BspOptions, ContentFlags};

use super::faces::{MaterialHandle, PatchSurface};
use super::ingest::{
    LevelData, RawBrush, RawFace, RawFaceKind, RawLeaf, RawNode, RawPlane, RawVisData, ViewPoint,
};

/// Node index of the leaf behind the `x = 0` plane in [`two_leaf_level`].
pub(crate) const LEFT_LEAF: usize = 1;
/// Node index of the leaf in front of the `x = 0` plane in [`two_leaf_level`].
pub(crate) const RIGHT_LEAF: usize = 2;

/// Routes log output through the test harness. `RUST_LOG` overrides the level.
pub(crate) fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}

fn plane(normal: [f32; 3], distance: f32) -> RawPlane {
    RawPlane { normal, distance }
}

/// Outward planes of an axis-aligned box.
fn box_planes(min: [f32; 3], max: [f32; 3]) -> Vec<RawPlane> {
    vec![
        plane([1.0, 0.0, 0.0], max[0]),
        plane([-1.0, 0.0, 0.0], -min[0]),
        plane([0.0, 1.0, 0.0], max[1]),
        plane([0.0, -1.0, 0.0], -min[1]),
        plane([0.0, 0.0, 1.0], max[2]),
        plane([0.0, 0.0, -1.0], -min[2]),
    ]
}

fn floor_face(material: u64, x: f32, vertex_start: u32, element_start: usize) -> RawFace {
    RawFace {
        kind: RawFaceKind::Polygon,
        material: MaterialHandle(material),
        vertex_start,
        vertex_count: 3,
        element_start,
        element_count: 3,
        normal: [0.0, 0.0, 1.0],
        origin: [x, 0.0, -10.0],
        patch_size: [0, 0],
        patch: None,
        is_sky: false,
    }
}

/// Two leaves split by the plane `x = 0`.
///
/// - left leaf (cluster 0): floor face 0 (material 1), patch face 2
///   (material 1) and sky face 4 (material 4)
/// - right leaf (cluster 1): floor face 1 (material 2), billboard face 3 and a
///   solid box brush spanning `x = 5..10` plus a water brush of the same shape
/// - cluster 0 sees only itself, cluster 1 sees both
pub(crate) fn two_leaf_data() -> LevelData {
    let mut planes = vec![plane([1.0, 0.0, 0.0], 0.0)];
    planes.extend(box_planes([5.0, -2.0, -2.0], [10.0, 2.0, 2.0]));

    let faces = vec![
        floor_face(1, -5.0, 0, 0),
        floor_face(2, 5.0, 3, 3),
        RawFace {
            kind: RawFaceKind::Patch,
            vertex_start: 6,
            vertex_count: 9,
            patch_size: [3, 3],
            patch: Some(PatchSurface {
                vertex_offset: 20,
                vertex_count: 4,
                index_offset: 6,
                index_count: 6,
            }),
            ..floor_face(1, -5.0, 0, 0)
        },
        RawFace {
            kind: RawFaceKind::Billboard,
            ..floor_face(3, 5.0, 0, 0)
        },
        RawFace {
            is_sky: true,
            normal: [0.0, 0.0, -1.0],
            origin: [-5.0, 0.0, 10.0],
            ..floor_face(4, -5.0, 40, 12)
        },
    ];

    LevelData {
        planes,
        nodes: vec![RawNode {
            plane: 0,
            bounds: [-10.0, -10.0, -10.0, 10.0, 10.0, 10.0],
            front: !1,
            back: !0,
        }],
        leaves: vec![
            RawLeaf {
                bounds: [-10.0, -10.0, -10.0, 0.0, 10.0, 10.0],
                cluster: 0,
                face_start: 0,
                face_count: 3,
                brush_start: 0,
                brush_count: 0,
            },
            RawLeaf {
                bounds: [0.0, -10.0, -10.0, 10.0, 10.0, 10.0],
                cluster: 1,
                face_start: 3,
                face_count: 2,
                brush_start: 0,
                brush_count: 2,
            },
        ],
        leaf_faces: vec![0, 2, 4, 1, 3],
        leaf_brushes: vec![0, 1],
        brushes: vec![
            RawBrush {
                planes: (1..7).collect(),
                contents: ContentFlags::SOLID,
            },
            RawBrush {
                planes: (1..7).collect(),
                contents: ContentFlags::WATER,
            },
        ],
        faces,
        indexes: vec![0, 1, 2, 0, 2, 1, 0, 1, 2, 2, 1, 3, 0, 1, 2],
        vis: RawVisData {
            num_clusters: 2,
            row_length: 1,
            data: vec![0b01, 0b11],
        },
        player_starts: vec![
            ViewPoint {
                position: Point3::new(-5.0, 0.0, 0.0),
                orientation: UnitQuaternion::identity(),
            },
            ViewPoint {
                position: Point3::new(5.0, 0.0, 0.0),
                orientation: UnitQuaternion::from_axis_angle(
                    &Vector3::z_axis(),
                    std::f32::consts::PI,
                ),
            },
        ],
    }
}

/// Three leaves along the x axis, split at `x = 0` and `x = 2`.
///
/// Leaves sit at node indices 2 (`x < 0`), 3 (`0..2`) and 4 (`x > 2`), all in
/// mutually visible clusters. Brush 0 is a solid box at `x = 5..10` in leaf 4;
/// brush 1 is a solid box at `x = 1..3` listed in both leaves 3 and 4.
pub(crate) fn three_leaf_data() -> LevelData {
    let mut planes = vec![plane([1.0, 0.0, 0.0], 0.0), plane([1.0, 0.0, 0.0], 2.0)];
    planes.extend(box_planes([5.0, -2.0, -2.0], [10.0, 2.0, 2.0]));
    planes.extend(box_planes([1.0, -1.0, -1.0], [3.0, 1.0, 1.0]));

    let leaf = |min_x: f32, max_x: f32, cluster: i32, brush_start: usize, brush_count: usize| {
        RawLeaf {
            bounds: [min_x, -10.0, -10.0, max_x, 10.0, 10.0],
            cluster,
            face_start: 0,
            face_count: 0,
            brush_start,
            brush_count,
        }
    };

    LevelData {
        planes,
        nodes: vec![
            RawNode {
                plane: 0,
                bounds: [-10.0, -10.0, -10.0, 10.0, 10.0, 10.0],
                front: 1,
                back: !0,
            },
            RawNode {
                plane: 1,
                bounds: [0.0, -10.0, -10.0, 10.0, 10.0, 10.0],
                front: !2,
                back: !1,
            },
        ],
        leaves: vec![
            leaf(-10.0, 0.0, 0, 0, 0),
            leaf(0.0, 2.0, 1, 0, 1),
            leaf(2.0, 10.0, 2, 1, 2),
        ],
        leaf_brushes: vec![1, 1, 0],
        brushes: vec![
            RawBrush {
                planes: (2..8).collect(),
                contents: ContentFlags::SOLID,
            },
            RawBrush {
                planes: (8..14).collect(),
                contents: ContentFlags::SOLID | ContentFlags::PLAYER_CLIP,
            },
        ],
        vis: RawVisData {
            num_clusters: 3,
            row_length: 1,
            data: vec![0b111; 3],
        },
        ..LevelData::default()
    }
}

pub(crate) fn two_leaf_level() -> BspLevel {
    BspLevel::load(two_leaf_data(), BspOptions::default()).expect("two-leaf fixture loads")
}

pub(crate) fn three_leaf_level() -> BspLevel {
    BspLevel::load(three_leaf_data(), BspOptions::default()).expect("three-leaf fixture loads")
}
