//! Mesh contract violations.

use thiserror::Error;

/// Result type for mesh validation.
pub type MeshResult<T> = Result<T, MeshError>;

/// Ways a [`PolyMesh`](crate::PolyMesh) snapshot can break its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// A face references a vertex past the end of the coordinate list.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Face holding the bad index.
        face: usize,
        /// The offending vertex index.
        index: u32,
        /// Number of coordinates in the mesh.
        vertex_count: usize,
    },

    /// The number of face normals differs from the number of faces.
    #[error("mesh has {faces} faces but {normals} face normals")]
    NormalCountMismatch {
        /// Number of faces.
        faces: usize,
        /// Number of normals.
        normals: usize,
    },
}
