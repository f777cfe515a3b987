//! Export configuration.

use std::path::Path;

use mesh_types::{Facet, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placement applied to every coordinate on export.
///
/// Each emitted vertex is `coord * scale + offset`. Normals are written as
/// stored; they are neither scaled nor renormalized.
///
/// # Example
///
/// ```
/// use mesh_io::ExportConfig;
/// use mesh_types::{Point3, Vector3};
///
/// let config = ExportConfig::default()
///     .with_scale(10.0)
///     .with_offset(Vector3::new(0.0, 0.0, 5.0));
///
/// assert_eq!(config.apply(Point3::new(1.0, 2.0, 3.0)), Point3::new(10.0, 20.0, 35.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ExportConfig {
    /// Uniform scale factor. Default: 1.0
    pub scale: f64,

    /// Translation added after scaling. Default: zero
    pub offset: Vector3<f64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vector3::zeros(),
        }
    }
}

impl ExportConfig {
    /// Create a config from a scale and an offset.
    #[must_use]
    pub const fn new(scale: f64, offset: Vector3<f64>) -> Self {
        Self { scale, offset }
    }

    /// Set the scale factor.
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: Vector3<f64>) -> Self {
        self.offset = offset;
        self
    }

    /// Whether this config leaves coordinates untouched.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == Vector3::zeros()
    }

    /// Transform one position.
    #[inline]
    #[must_use]
    pub fn apply(&self, position: Point3<f64>) -> Point3<f64> {
        Point3::from(position.coords * self.scale + self.offset)
    }

    /// Transform the vertices of a facet, keeping its normal.
    #[inline]
    #[must_use]
    pub fn transform_facet(&self, facet: Facet) -> Facet {
        facet.map_vertices(|p| self.apply(p))
    }

    /// Make a name safe for use inside an exported file.
    ///
    /// Spaces and hyphens become underscores and letters are lowercased.
    ///
    /// ```
    /// use mesh_io::ExportConfig;
    ///
    /// assert_eq!(ExportConfig::good_name("My Human-01"), "my_human_01");
    /// ```
    #[must_use]
    pub fn good_name(name: &str) -> String {
        name.replace([' ', '-'], "_").to_lowercase()
    }

    /// Derive the `solid` name for an export path.
    ///
    /// Uses the file name without directory or extension, passed through
    /// [`ExportConfig::good_name`].
    ///
    /// ```
    /// use mesh_io::ExportConfig;
    ///
    /// assert_eq!(ExportConfig::solid_name("/tmp/out/Base Mesh.stl"), "base_mesh");
    /// ```
    #[must_use]
    pub fn solid_name<P: AsRef<Path>>(path: P) -> String {
        let stem = path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        Self::good_name(&stem).replace(' ', "_")
    }
}
