//! Four-slot face decomposition.

use std::iter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether a four-slot face encodes a triangle or a quad.
///
/// A face is a triangle when its last slot repeats the first or the third
/// index. Both encodings occur in exported meshes: `[a, b, c, c]` and
/// `[a, b, c, a]`. For either, the quad's second half `(c, d, a)` would have
/// zero area.
///
/// # Example
///
/// ```
/// use mesh_types::FaceKind;
///
/// assert_eq!(FaceKind::of(&[0, 1, 2, 2]), FaceKind::Triangle);
/// assert_eq!(FaceKind::of(&[0, 1, 2, 0]), FaceKind::Triangle);
/// assert_eq!(FaceKind::of(&[0, 1, 2, 3]), FaceKind::Quad);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FaceKind {
    /// Slot 3 repeats slot 0 or slot 2; emits one triangle.
    Triangle,
    /// Four distinct corners; emits two triangles.
    Quad,
}

impl FaceKind {
    /// Classify a face by comparing its last slot with the first and third.
    #[inline]
    #[must_use]
    pub const fn of(face: &[u32; 4]) -> Self {
        if face[3] == face[0] || face[3] == face[2] {
            Self::Triangle
        } else {
            Self::Quad
        }
    }

    /// Number of triangles a face of this kind contributes.
    #[inline]
    #[must_use]
    pub const fn triangle_count(self) -> usize {
        match self {
            Self::Triangle => 1,
            Self::Quad => 2,
        }
    }
}

/// Split a four-slot face into the vertex-index triples to emit.
///
/// Always yields `(0, 1, 2)`; a quad additionally yields `(2, 3, 0)` after it.
///
/// # Example
///
/// ```
/// use mesh_types::split_face;
///
/// let tris: Vec<_> = split_face([4, 5, 6, 7]).collect();
/// assert_eq!(tris, vec![[4, 5, 6], [6, 7, 4]]);
///
/// let tris: Vec<_> = split_face([4, 5, 6, 6]).collect();
/// assert_eq!(tris, vec![[4, 5, 6]]);
/// ```
pub fn split_face(face: [u32; 4]) -> impl Iterator<Item = [u32; 3]> {
    let [a, b, c, d] = face;
    let second = (FaceKind::of(&face) == FaceKind::Quad).then_some([c, d, a]);
    iter::once([a, b, c]).chain(second)
}
