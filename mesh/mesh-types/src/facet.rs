//! Emitted triangle type.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One STL facet: a normal and three vertex positions in emission order.
///
/// The normal is copied from the source face; it is never recomputed from
/// the vertex positions.
///
/// # Example
///
/// ```
/// use mesh_types::{Facet, Point3, Vector3};
///
/// let facet = Facet::new(
///     Vector3::z(),
///     [
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
/// );
///
/// let moved = facet.map_vertices(|p| p + Vector3::new(0.0, 0.0, 2.0));
/// assert_eq!(moved.vertices[2], Point3::new(0.0, 1.0, 2.0));
/// assert_eq!(moved.normal, Vector3::z());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Facet {
    /// Face normal.
    pub normal: Vector3<f64>,
    /// Vertex positions in winding order.
    pub vertices: [Point3<f64>; 3],
}

impl Facet {
    /// Create a facet from a normal and three positions.
    #[inline]
    #[must_use]
    pub const fn new(normal: Vector3<f64>, vertices: [Point3<f64>; 3]) -> Self {
        Self { normal, vertices }
    }

    /// Apply `f` to every vertex position, keeping the normal.
    #[must_use]
    pub fn map_vertices<F>(self, f: F) -> Self
    where
        F: FnMut(Point3<f64>) -> Point3<f64>,
    {
        Self {
            normal: self.normal,
            vertices: self.vertices.map(f),
        }
    }
}
