//! Load-time errors.
//!
//! Only structural problems in the ingested arrays are errors. Degenerate but
//! well-formed geometry is logged and made inert instead.

use thiserror::Error;

/// A reference in [`LevelData`](crate::LevelData) that cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("level has no leaves")]
    NoLeaves,

    #[error("node {node}: plane index {plane} out of range ({count} planes)")]
    NodePlaneOutOfRange { node: usize, plane: usize, count: usize },

    #[error("node {node}: child reference {child} resolves outside the node array")]
    ChildOutOfRange { node: usize, child: i32 },

    #[error("node {node} is reachable more than once; the nodes do not form a tree")]
    NotATree { node: usize },

    #[error("leaf {leaf}: face range {start}+{count} exceeds {len} leaf face entries")]
    LeafFaceRange { leaf: usize, start: usize, count: usize, len: usize },

    #[error("leaf face entry {entry} refers to face group {face} ({count} face groups)")]
    FaceOutOfRange { entry: usize, face: i32, count: usize },

    #[error("leaf {leaf}: brush range {start}+{count} exceeds {len} leaf brush entries")]
    LeafBrushRange { leaf: usize, start: usize, count: usize, len: usize },

    #[error("leaf brush entry {entry} refers to brush {brush} ({count} brushes)")]
    BrushOutOfRange { entry: usize, brush: i32, count: usize },

    #[error("brush {brush}: plane index {plane} out of range ({count} planes)")]
    BrushPlaneOutOfRange { brush: usize, plane: usize, count: usize },

    #[error("face group {face}: indices {start}+{count} exceed index buffer of {len}")]
    ElementRange { face: usize, start: usize, count: usize, len: usize },

    #[error("leaf {leaf}: cluster {cluster} invalid for {clusters} clusters")]
    ClusterOutOfRange { leaf: usize, cluster: i32, clusters: usize },

    #[error("visibility rows of {row_length} bytes cannot hold {clusters} clusters")]
    VisRowTooShort { row_length: usize, clusters: usize },

    #[error("visibility table of {clusters} rows of {row_length} bytes overflows")]
    VisTableOverflow { row_length: usize, clusters: usize },

    #[error("visibility table has {len} bytes, expected {expected}")]
    VisTableTooSmall { len: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, LoadError>;
