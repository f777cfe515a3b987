//! Export progress reporting.

use std::path::Path;

/// Observer notified as an export advances.
///
/// Calls are fire-and-forget: a sink cannot influence the bytes written.
/// Any `FnMut(f64, &str)` closure is a sink.
///
/// # Example
///
/// ```
/// use mesh_io::{ExportConfig, write_stl_binary};
/// use std::io::Cursor;
///
/// let mut steps = Vec::new();
/// let mut record = |fraction: f64, status: &str| steps.push((fraction, status.to_string()));
/// write_stl_binary(&[], &ExportConfig::default(), Cursor::new(Vec::new()), &mut record).unwrap();
///
/// assert_eq!(steps.first().map(|s| s.0), Some(0.0));
/// assert_eq!(steps.last().map(|s| s.0), Some(1.0));
/// ```
pub trait ProgressSink {
    /// Report completion as a fraction in `[0, 1]` with a status line.
    fn report(&mut self, fraction: f64, status: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(f64, &str),
{
    fn report(&mut self, fraction: f64, status: &str) {
        self(fraction, status);
    }
}

/// Sink that ignores every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _fraction: f64, _status: &str) {}
}

/// Fraction reported once the header is out.
const HEADER_DONE: f64 = 0.3;

/// Fraction reported once the last mesh is out.
const MESHES_DONE: f64 = 0.99;

/// Maps export stages onto a [`ProgressSink`].
pub(crate) struct ExportProgress<'a> {
    sink: &'a mut dyn ProgressSink,
    meshes: usize,
    written: usize,
    target: Option<&'a Path>,
}

impl<'a> ExportProgress<'a> {
    pub(crate) fn new(sink: &'a mut dyn ProgressSink, meshes: usize) -> Self {
        Self {
            sink,
            meshes,
            written: 0,
            target: None,
        }
    }

    /// Name `path` in the final status line.
    pub(crate) fn with_target(mut self, path: Option<&'a Path>) -> Self {
        self.target = path;
        self
    }

    pub(crate) fn start(&mut self) {
        self.sink.report(0.0, "Starting STL export");
    }

    pub(crate) fn header_written(&mut self) {
        self.sink.report(HEADER_DONE, "Writing Objects");
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn mesh_written(&mut self) {
        self.written += 1;
        let done = self.written as f64 / self.meshes.max(1) as f64;
        self.sink
            .report(HEADER_DONE + (MESHES_DONE - HEADER_DONE) * done, "Writing Objects");
    }

    pub(crate) fn finish(&mut self) {
        match self.target {
            Some(path) => self.sink.report(
                1.0,
                &format!("STL export finished. Exported file: {}", path.display()),
            ),
            None => self.sink.report(1.0, "STL export finished"),
        }
    }
}
