//! Polygon mesh snapshot types for STL export.
//!
//! This crate provides the read-only data model consumed by the STL writer:
//!
//! - [`PolyMesh`] - Vertex coordinates, four-slot faces and per-face normals
//! - [`FaceKind`] - Triangle/quad discrimination for a four-slot face
//! - [`Facet`] - One emitted triangle with its normal and vertex positions
//! - [`MeshError`] - Contract violations found by [`PolyMesh::validate`]
//!
//! # Face Encoding
//!
//! Every face stores exactly four vertex indices. A triangle repeats an
//! index in the last slot (`[a, b, c, c]` or `[a, b, c, a]`); anything else
//! is a quad that decomposes into `(0, 1, 2)` followed by `(2, 3, 0)`.
//!
//! # Example
//!
//! ```
//! use mesh_types::{PolyMesh, Point3, Vector3};
//!
//! let mut mesh = PolyMesh::new();
//! let a = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.push_vertex(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.push_vertex(Point3::new(1.0, 1.0, 0.0));
//! let d = mesh.push_vertex(Point3::new(0.0, 1.0, 0.0));
//! mesh.push_quad([a, b, c, d], Vector3::z());
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert_eq!(mesh.triangle_count(), 2);
//! assert!(mesh.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod face;
mod facet;
mod mesh;

pub use error::{MeshError, MeshResult};
pub use face::{FaceKind, split_face};
pub use facet::Facet;
pub use mesh::{PolyMesh, unit_cube};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
