//! Error types for STL export and import.

use std::path::PathBuf;

use mesh_types::MeshError;
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while writing or reading STL.
#[derive(Debug, Error)]
pub enum IoError {
    /// A mesh handed to the writer breaks its invariants.
    ///
    /// Reported before any byte is written.
    #[error("invalid mesh {mesh}: {source}")]
    InvalidMesh {
        /// Position of the mesh in the export list.
        mesh: usize,
        /// What was wrong with it.
        #[source]
        source: MeshError,
    },

    /// The export would emit more triangles than binary STL can count.
    #[error("too many triangles for STL: {count} exceeds u32::MAX")]
    TooManyTriangles {
        /// Total triangle count of the export.
        count: u64,
    },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Invalid file content (parse error).
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// Binary STL shorter than its fixed header.
    #[error("invalid STL header: expected {expected} bytes, got {got}")]
    InvalidHeader {
        /// Expected header size.
        expected: usize,
        /// Actual header size.
        got: usize,
    },

    /// Binary STL holds fewer records than its header announces.
    #[error("invalid face count: expected {expected}, got {got}")]
    InvalidFaceCount {
        /// Count stored in the header.
        expected: u32,
        /// Complete records present.
        got: u32,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Float parsing error.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}
