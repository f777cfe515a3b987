//! STL export for polygon meshes.
//!
//! This crate writes [`PolyMesh`] snapshots, made of triangles and quads, to
//! STL in either encoding:
//!
//! - **ASCII** - `solid`/`facet`/`vertex` text, six decimals per number
//! - **Binary** - 80-byte zero header, `u32` count, 50-byte records
//!
//! Every coordinate passes through an [`ExportConfig`] (`coord * scale +
//! offset`) on the way out. Quads are split into two triangles, so a mesh of
//! `T` triangles and `Q` quads produces `T + 2Q` facets, in the same order for
//! both encodings.
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{ExportConfig, StlFormat, save_stl};
//! use mesh_types::{unit_cube, Vector3};
//!
//! let config = ExportConfig::default()
//!     .with_scale(25.4)
//!     .with_offset(Vector3::new(0.0, 0.0, 10.0));
//!
//! let count = save_stl(&[unit_cube()], "cube.stl", &config, StlFormat::Binary).unwrap();
//! assert_eq!(count, 12);
//! ```
//!
//! # Streams
//!
//! The `write_*` functions accept any writer. [`write_stl_binary`] patches
//! the triangle count by seeking back to the header;
//! [`write_stl_binary_counted`] counts first and never seeks.
//!
//! # Failures
//!
//! Meshes are validated before any output is produced. I/O failures abort
//! the export; a partially written file is left in place.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod config;
mod error;
mod progress;
mod stl;

pub use config::ExportConfig;
pub use error::{IoError, IoResult};
pub use progress::{NoProgress, ProgressSink};
pub use stl::{
    load_stl, read_stl, save_stl_ascii, save_stl_ascii_with_progress, save_stl_binary,
    save_stl_binary_with_progress, write_stl_ascii, write_stl_binary, write_stl_binary_counted,
};

use std::path::Path;

use mesh_types::PolyMesh;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// STL encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StlFormat {
    /// Plain-text STL.
    Ascii,
    /// Little-endian binary STL.
    #[default]
    Binary,
}

impl StlFormat {
    /// Select binary or ASCII from a flag.
    #[must_use]
    pub const fn from_binary(binary: bool) -> Self {
        if binary { Self::Binary } else { Self::Ascii }
    }

    /// Whether this is the binary encoding.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(self, Self::Binary)
    }
}

/// Save meshes to an STL file in the given encoding.
///
/// Returns the number of facets written.
///
/// # Errors
///
/// Returns an error if:
/// - A mesh breaks its invariants
/// - The file cannot be created, written or (binary) seeked
pub fn save_stl<P: AsRef<Path>>(
    meshes: &[PolyMesh],
    path: P,
    config: &ExportConfig,
    format: StlFormat,
) -> IoResult<u32> {
    match format {
        StlFormat::Ascii => save_stl_ascii(meshes, path, config),
        StlFormat::Binary => save_stl_binary(meshes, path, config),
    }
}

/// [`save_stl`] with a progress observer.
///
/// # Errors
///
/// Same as [`save_stl`].
pub fn save_stl_with_progress<P: AsRef<Path>>(
    meshes: &[PolyMesh],
    path: P,
    config: &ExportConfig,
    format: StlFormat,
    progress: &mut dyn ProgressSink,
) -> IoResult<u32> {
    match format {
        StlFormat::Ascii => save_stl_ascii_with_progress(meshes, path, config, progress),
        StlFormat::Binary => save_stl_binary_with_progress(meshes, path, config, progress),
    }
}
