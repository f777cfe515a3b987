//! Polygon mesh snapshot.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{FaceKind, Facet, MeshError, MeshResult, split_face};

/// A polygon mesh made of triangles and quads.
///
/// This is the snapshot handed to the STL writer. Faces always carry four
/// vertex indices; see [`FaceKind`] for how triangles are encoded. Each face
/// owns exactly one normal, stored at the same position in `normals`.
///
/// # Memory Layout
///
/// - `coords`: `Vec<Point3<f64>>` - Vertex positions
/// - `faces`: `Vec<[u32; 4]>` - Face corners as indices into `coords`
/// - `normals`: `Vec<Vector3<f64>>` - One normal per face
///
/// # Example
///
/// ```
/// use mesh_types::{PolyMesh, Point3, Vector3};
///
/// let mut mesh = PolyMesh::new();
/// mesh.coords.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.coords.push(Point3::new(1.0, 0.0, 0.0));
/// mesh.coords.push(Point3::new(0.0, 1.0, 0.0));
/// mesh.push_triangle([0, 1, 2], Vector3::z());
///
/// assert_eq!(mesh.faces[0], [0, 1, 2, 2]);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolyMesh {
    /// Vertex positions.
    pub coords: Vec<Point3<f64>>,

    /// Faces as four indices into `coords`.
    pub faces: Vec<[u32; 4]>,

    /// Face normals, parallel to `faces`.
    pub normals: Vec<Vector3<f64>>,
}

impl PolyMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            coords: Vec::new(),
            faces: Vec::new(),
            normals: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            coords: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            normals: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from its three parallel sequences.
    ///
    /// No validation is performed; call [`PolyMesh::validate`] before
    /// relying on the indices.
    #[inline]
    #[must_use]
    pub const fn from_parts(
        coords: Vec<Point3<f64>>,
        faces: Vec<[u32; 4]>,
        normals: Vec<Vector3<f64>>,
    ) -> Self {
        Self {
            coords,
            faces,
            normals,
        }
    }

    /// Create a mesh from flat arrays.
    ///
    /// # Arguments
    ///
    /// * `positions` - `[x0, y0, z0, x1, y1, z1, ...]`
    /// * `indices` - Four indices per face
    /// * `normals` - `[nx0, ny0, nz0, ...]`, one triple per face
    ///
    /// Returns an empty mesh if `positions` or `normals` is not a multiple of
    /// three long, or `indices` is not a multiple of four.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::PolyMesh;
    ///
    /// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// let indices = [0, 1, 2, 0];
    /// let normals = [0.0, 0.0, 1.0];
    ///
    /// let mesh = PolyMesh::from_raw(&positions, &indices, &normals);
    /// assert_eq!(mesh.vertex_count(), 3);
    /// assert_eq!(mesh.face_count(), 1);
    /// ```
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32], normals: &[f64]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 4 != 0 || normals.len() % 3 != 0 {
            return Self::new();
        }

        let coords = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();

        let faces = indices
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();

        let normals = normals
            .chunks_exact(3)
            .map(|c| Vector3::new(c[0], c[1], c[2]))
            .collect();

        Self {
            coords,
            faces,
            normals,
        }
    }

    /// Append a vertex and return its index.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: face slots are u32, meshes with >4B vertices are unsupported
    pub fn push_vertex(&mut self, position: Point3<f64>) -> u32 {
        let index = self.coords.len() as u32;
        self.coords.push(position);
        index
    }

    /// Append a triangle, encoded as `[a, b, c, c]`.
    pub fn push_triangle(&mut self, [a, b, c]: [u32; 3], normal: Vector3<f64>) {
        self.faces.push([a, b, c, c]);
        self.normals.push(normal);
    }

    /// Append a quad.
    ///
    /// A quad whose last corner repeats the first or third is
    /// indistinguishable from a triangle and will be emitted as one.
    pub fn push_quad(&mut self, corners: [u32; 4], normal: Vector3<f64>) {
        self.faces.push(corners);
        self.normals.push(normal);
    }

    /// Number of vertex coordinates.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.coords.len()
    }

    /// Number of faces, counting quads once.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Number of STL facets this mesh emits: triangles plus twice the quads.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .map(|face| FaceKind::of(face).triangle_count())
            .sum()
    }

    /// Kind of the face at `index`, or `None` if out of bounds.
    #[must_use]
    pub fn face_kind(&self, index: usize) -> Option<FaceKind> {
        self.faces.get(index).map(FaceKind::of)
    }

    /// Check the mesh invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::NormalCountMismatch`] if there is not exactly one
    /// normal per face, or [`MeshError::IndexOutOfRange`] for the first face
    /// slot that does not address a coordinate.
    pub fn validate(&self) -> MeshResult<()> {
        if self.normals.len() != self.faces.len() {
            return Err(self.normal_mismatch());
        }

        let vertex_count = self.coords.len();
        for (face, slots) in self.faces.iter().enumerate() {
            if let Some(&index) = slots.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Iterate over the facets this mesh emits, untransformed.
    ///
    /// Order is face order; a quad yields `(0, 1, 2)` then `(2, 3, 0)`.
    /// Items are errors where a face breaks the mesh invariants.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::unit_cube;
    ///
    /// let cube = unit_cube();
    /// let facets: Result<Vec<_>, _> = cube.facets().collect();
    /// assert_eq!(facets.unwrap().len(), 12);
    /// ```
    pub fn facets(&self) -> impl Iterator<Item = MeshResult<Facet>> + '_ {
        self.faces
            .iter()
            .enumerate()
            .flat_map(move |(face, &slots)| split_face(slots).map(move |tri| self.facet(face, tri)))
    }

    fn facet(&self, face: usize, tri: [u32; 3]) -> MeshResult<Facet> {
        let normal = *self
            .normals
            .get(face)
            .ok_or_else(|| self.normal_mismatch())?;

        let mut vertices = [Point3::origin(); 3];
        for (slot, &index) in vertices.iter_mut().zip(&tri) {
            *slot = *self
                .coords
                .get(index as usize)
                .ok_or(MeshError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count: self.coords.len(),
                })?;
        }

        Ok(Facet::new(normal, vertices))
    }

    fn normal_mismatch(&self) -> MeshError {
        MeshError::NormalCountMismatch {
            faces: self.faces.len(),
            normals: self.normals.len(),
        }
    }
}

/// Helper function to create a unit cube built from quads.
///
/// Spans (0,0,0) to (1,1,1) with outward normals and CCW corners.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 6);
/// assert_eq!(cube.triangle_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> PolyMesh {
    let mut mesh = PolyMesh::with_capacity(8, 6);

    mesh.coords.push(Point3::new(0.0, 0.0, 0.0)); // 0
    mesh.coords.push(Point3::new(1.0, 0.0, 0.0)); // 1
    mesh.coords.push(Point3::new(1.0, 1.0, 0.0)); // 2
    mesh.coords.push(Point3::new(0.0, 1.0, 0.0)); // 3
    mesh.coords.push(Point3::new(0.0, 0.0, 1.0)); // 4
    mesh.coords.push(Point3::new(1.0, 0.0, 1.0)); // 5
    mesh.coords.push(Point3::new(1.0, 1.0, 1.0)); // 6
    mesh.coords.push(Point3::new(0.0, 1.0, 1.0)); // 7

    mesh.push_quad([0, 3, 2, 1], -Vector3::z()); // bottom
    mesh.push_quad([4, 5, 6, 7], Vector3::z()); // top
    mesh.push_quad([0, 1, 5, 4], -Vector3::y()); // front
    mesh.push_quad([3, 7, 6, 2], Vector3::y()); // back
    mesh.push_quad([0, 4, 7, 3], -Vector3::x()); // left
    mesh.push_quad([1, 2, 6, 5], Vector3::x()); // right

    mesh
}
