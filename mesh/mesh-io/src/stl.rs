//! STL (Stereolithography) export, plus a facet reader for checking output.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (all zero)
//! UINT32       – Number of triangles, patched after the records are written
//! foreach triangle
//!     REAL32[3] – Face normal
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (0)
//! end
//! ```
//!
//! # ASCII Format
//!
//! ```text
//! solid name
//! facet normal ni nj nk
//! 	outer loop
//! 		vertex v1x v1y v1z
//! 		vertex v2x v2y v2z
//! 		vertex v3x v3y v3z
//! 	endloop
//! 	endfacet
//! ...
//! endsolid name
//! ```
//!
//! Numbers are fixed-point with six decimals.
//!
//! # Ordering
//!
//! Facets are written in mesh order, then face order. A quad `[a, b, c, d]`
//! becomes `(a, b, c)` followed by `(c, d, a)`; a face with `a == d` is a
//! triangle and contributes only the first.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use mesh_types::{Facet, Point3, PolyMesh, Vector3};
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::{IoError, IoResult};
use crate::progress::{ExportProgress, NoProgress, ProgressSink};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Offset of the triangle count in binary STL.
const COUNT_OFFSET: u64 = HEADER_SIZE as u64;

/// Validate every mesh and total up the triangles to emit.
fn check_meshes(meshes: &[PolyMesh]) -> IoResult<u32> {
    for (index, mesh) in meshes.iter().enumerate() {
        mesh.validate()
            .map_err(|source| IoError::InvalidMesh { mesh: index, source })?;
    }
    total_triangles(meshes.iter().map(PolyMesh::triangle_count))
}

/// Sum per-mesh triangle counts into the binary header's `u32`.
fn total_triangles(counts: impl IntoIterator<Item = usize>) -> IoResult<u32> {
    let total: u64 = counts.into_iter().map(|count| count as u64).sum();
    u32::try_from(total).map_err(|_| IoError::TooManyTriangles { count: total })
}

/// Feed every transformed facet to `emit`, in export order.
fn for_each_facet<F>(
    meshes: &[PolyMesh],
    config: &ExportConfig,
    progress: &mut ExportProgress<'_>,
    mut emit: F,
) -> IoResult<u32>
where
    F: FnMut(&Facet) -> IoResult<()>,
{
    let mut count: u32 = 0;
    for (index, mesh) in meshes.iter().enumerate() {
        for facet in mesh.facets() {
            let facet = facet.map_err(|source| IoError::InvalidMesh { mesh: index, source })?;
            emit(&config.transform_facet(facet))?;
            count += 1;
        }
        debug!(mesh = index, faces = mesh.face_count(), "Wrote mesh");
        progress.mesh_written();
    }
    Ok(count)
}

// =============================================================================
// ASCII
// =============================================================================

/// Write meshes as ASCII STL.
///
/// Spaces in `name` are replaced by underscores in the `solid`/`endsolid`
/// lines. Returns the number of facets written.
///
/// # Errors
///
/// Returns [`IoError::InvalidMesh`] before writing anything if a mesh breaks
/// its invariants, or [`IoError::Io`] if the writer fails.
///
/// # Example
///
/// ```
/// use mesh_io::{ExportConfig, NoProgress, write_stl_ascii};
///
/// let mut out = Vec::new();
/// write_stl_ascii(&[], &ExportConfig::default(), "empty", &mut out, &mut NoProgress).unwrap();
/// assert_eq!(out, b"solid empty\nendsolid empty\n");
/// ```
pub fn write_stl_ascii<W: Write>(
    meshes: &[PolyMesh],
    config: &ExportConfig,
    name: &str,
    writer: W,
    progress: &mut dyn ProgressSink,
) -> IoResult<u32> {
    let expected = check_meshes(meshes)?;
    write_ascii_checked(meshes, config, name, writer, progress, expected, None)
}

fn write_ascii_checked<W: Write>(
    meshes: &[PolyMesh],
    config: &ExportConfig,
    name: &str,
    mut writer: W,
    progress: &mut dyn ProgressSink,
    expected: u32,
    target: Option<&Path>,
) -> IoResult<u32> {
    let solid = name.replace(' ', "_");
    let mut progress = ExportProgress::new(progress, meshes.len()).with_target(target);
    progress.start();
    info!(
        meshes = meshes.len(),
        triangles = expected,
        solid = %solid,
        "Writing ASCII STL"
    );

    writeln!(writer, "solid {solid}")?;
    progress.header_written();

    let count = for_each_facet(meshes, config, &mut progress, |facet| {
        write_facet_ascii(&mut writer, facet)
    })?;

    writeln!(writer, "endsolid {solid}")?;
    writer.flush()?;
    progress.finish();

    Ok(count)
}

/// Fixed-point number with six decimals, written as printf's `%f` would.
///
/// NaN is written `nan` (Rust's own `NaN` spelling is not used).
struct Fixed(f64);

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            f.write_str("nan")
        } else {
            // inf and -inf already match
            write!(f, "{value:.6}")
        }
    }
}

fn write_facet_ascii<W: Write>(writer: &mut W, facet: &Facet) -> IoResult<()> {
    let n = &facet.normal;
    writeln!(
        writer,
        "facet normal {} {} {}",
        Fixed(n.x),
        Fixed(n.y),
        Fixed(n.z)
    )?;
    writeln!(writer, "\touter loop")?;
    for v in &facet.vertices {
        writeln!(
            writer,
            "\t\tvertex {} {} {}",
            Fixed(v.x),
            Fixed(v.y),
            Fixed(v.z)
        )?;
    }
    writeln!(writer, "\tendloop")?;
    writeln!(writer, "\tendfacet")?;
    Ok(())
}

// =============================================================================
// Binary
// =============================================================================

/// Write meshes as binary STL, patching the triangle count afterwards.
///
/// The count field is first written as zero; once every record is out the
/// writer seeks back to offset 80, stores the real count and seeks to the
/// end again. Returns the number of facets written.
///
/// # Errors
///
/// Returns [`IoError::InvalidMesh`] or [`IoError::TooManyTriangles`] before
/// writing anything, or [`IoError::Io`] if a write or the seek back fails.
/// A failed export may leave a truncated stream behind.
///
/// # Example
///
/// ```
/// use mesh_io::{ExportConfig, NoProgress, write_stl_binary};
/// use mesh_types::unit_cube;
/// use std::io::Cursor;
///
/// let mut out = Cursor::new(Vec::new());
/// let count = write_stl_binary(&[unit_cube()], &ExportConfig::default(), &mut out, &mut NoProgress).unwrap();
/// assert_eq!(count, 12);
/// assert_eq!(out.get_ref().len(), 84 + 50 * 12);
/// ```
pub fn write_stl_binary<W: Write + Seek>(
    meshes: &[PolyMesh],
    config: &ExportConfig,
    writer: W,
    progress: &mut dyn ProgressSink,
) -> IoResult<u32> {
    let expected = check_meshes(meshes)?;
    write_binary_checked(meshes, config, writer, progress, expected, None)
}

fn write_binary_checked<W: Write + Seek>(
    meshes: &[PolyMesh],
    config: &ExportConfig,
    mut writer: W,
    progress: &mut dyn ProgressSink,
    expected: u32,
    target: Option<&Path>,
) -> IoResult<u32> {
    let mut progress = ExportProgress::new(progress, meshes.len()).with_target(target);
    progress.start();
    info!(
        meshes = meshes.len(),
        triangles = expected,
        "Writing binary STL"
    );

    write_binary_header(&mut writer, 0)?;
    progress.header_written();

    let count = for_each_facet(meshes, config, &mut progress, |facet| {
        write_facet_binary(&mut writer, facet)
    })?;

    writer.seek(SeekFrom::Start(COUNT_OFFSET))?;
    writer.write_all(&count.to_le_bytes())?;
    writer.seek(SeekFrom::End(0))?;
    writer.flush()?;
    progress.finish();

    Ok(count)
}

/// Write meshes as binary STL without seeking.
///
/// The triangle count is computed up front and written directly into the
/// header, so this works on pipes, sockets and other one-way sinks. Output
/// is byte-identical to [`write_stl_binary`].
///
/// # Errors
///
/// Same as [`write_stl_binary`], minus seek failures.
pub fn write_stl_binary_counted<W: Write>(
    meshes: &[PolyMesh],
    config: &ExportConfig,
    mut writer: W,
    progress: &mut dyn ProgressSink,
) -> IoResult<u32> {
    let expected = check_meshes(meshes)?;
    let mut progress = ExportProgress::new(progress, meshes.len());
    progress.start();
    info!(
        meshes = meshes.len(),
        triangles = expected,
        "Writing binary STL (counted)"
    );

    write_binary_header(&mut writer, expected)?;
    progress.header_written();

    let count = for_each_facet(meshes, config, &mut progress, |facet| {
        write_facet_binary(&mut writer, facet)
    })?;
    debug_assert_eq!(count, expected);

    writer.flush()?;
    progress.finish();

    Ok(count)
}

fn write_binary_header<W: Write>(writer: &mut W, count: u32) -> IoResult<()> {
    writer.write_all(&[0u8; HEADER_SIZE])?;
    writer.write_all(&count.to_le_bytes())?;
    Ok(())
}

/// Write one 50-byte record: normal, three vertices, zero attribute field.
fn write_facet_binary<W: Write>(writer: &mut W, facet: &Facet) -> IoResult<()> {
    let values = facet
        .normal
        .iter()
        .chain(facet.vertices.iter().flat_map(|v| v.coords.iter()));

    // The trailing two bytes are the attribute byte count and stay zero.
    let mut record = [0u8; TRIANGLE_SIZE];
    for (chunk, &value) in record.chunks_exact_mut(4).zip(values) {
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: binary STL stores f32
        chunk.copy_from_slice(&(value as f32).to_le_bytes());
    }

    writer.write_all(&record)?;
    Ok(())
}

// =============================================================================
// Files
// =============================================================================

/// Save meshes to an ASCII STL file.
///
/// The solid name is derived from `path` with [`ExportConfig::solid_name`].
/// Meshes are validated before the file is created.
///
/// # Errors
///
/// Returns an error if a mesh is invalid or the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use mesh_io::{ExportConfig, save_stl_ascii};
/// use mesh_types::unit_cube;
///
/// save_stl_ascii(&[unit_cube()], "cube.stl", &ExportConfig::default()).unwrap();
/// ```
pub fn save_stl_ascii<P: AsRef<Path>>(
    meshes: &[PolyMesh],
    path: P,
    config: &ExportConfig,
) -> IoResult<u32> {
    save_stl_ascii_with_progress(meshes, path, config, &mut NoProgress)
}

/// [`save_stl_ascii`] with a progress observer.
///
/// # Errors
///
/// Returns an error if a mesh is invalid or the file cannot be written.
pub fn save_stl_ascii_with_progress<P: AsRef<Path>>(
    meshes: &[PolyMesh],
    path: P,
    config: &ExportConfig,
    progress: &mut dyn ProgressSink,
) -> IoResult<u32> {
    let path = path.as_ref();
    let expected = check_meshes(meshes)?;
    let name = ExportConfig::solid_name(path);

    let file = File::create(path)?;
    let count = write_ascii_checked(
        meshes,
        config,
        &name,
        BufWriter::new(file),
        progress,
        expected,
        Some(path),
    )?;

    info!(path = %path.display(), triangles = count, "STL export finished");
    Ok(count)
}

/// Save meshes to a binary STL file.
///
/// Meshes are validated before the file is created.
///
/// # Errors
///
/// Returns an error if a mesh is invalid or the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use mesh_io::{ExportConfig, save_stl_binary};
/// use mesh_types::unit_cube;
///
/// let count = save_stl_binary(&[unit_cube()], "cube.stl", &ExportConfig::default()).unwrap();
/// assert_eq!(count, 12);
/// ```
pub fn save_stl_binary<P: AsRef<Path>>(
    meshes: &[PolyMesh],
    path: P,
    config: &ExportConfig,
) -> IoResult<u32> {
    save_stl_binary_with_progress(meshes, path, config, &mut NoProgress)
}

/// [`save_stl_binary`] with a progress observer.
///
/// # Errors
///
/// Returns an error if a mesh is invalid or the file cannot be written.
pub fn save_stl_binary_with_progress<P: AsRef<Path>>(
    meshes: &[PolyMesh],
    path: P,
    config: &ExportConfig,
    progress: &mut dyn ProgressSink,
) -> IoResult<u32> {
    let path = path.as_ref();
    let expected = check_meshes(meshes)?;

    let file = File::create(path)?;
    let count = write_binary_checked(
        meshes,
        config,
        BufWriter::new(file),
        progress,
        expected,
        Some(path),
    )?;

    info!(path = %path.display(), triangles = count, "STL export finished");
    Ok(count)
}

// =============================================================================
// Reading
// =============================================================================

/// Load the facets of an STL file.
///
/// Detects ASCII vs binary. Normals are returned as stored in the file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid STL.
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<Vec<Facet>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;

    read_stl(BufReader::new(file))
}

/// Read the facets of an STL stream.
///
/// # Errors
///
/// Returns an error if reading fails or the content is not valid STL.
///
/// # Example
///
/// ```
/// use mesh_io::read_stl;
///
/// let facets = read_stl(&b"solid empty\nendsolid empty\n"[..]).unwrap();
/// assert!(facets.is_empty());
/// ```
pub fn read_stl<R: Read>(mut reader: R) -> IoResult<Vec<Facet>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    if is_ascii_stl(&bytes) {
        read_stl_ascii(std::str::from_utf8(&bytes)?)
    } else {
        read_stl_binary(&bytes)
    }
}

/// ASCII files start with "solid"; binary headers that happen to do the same
/// are recognized by the null bytes in their header.
fn is_ascii_stl(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    String::from_utf8_lossy(head).trim_start().starts_with("solid") && !head.contains(&0)
}

fn read_stl_binary(bytes: &[u8]) -> IoResult<Vec<Facet>> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(IoError::InvalidHeader {
            expected: HEADER_SIZE + 4,
            got: bytes.len(),
        });
    }

    let c = &bytes[HEADER_SIZE..HEADER_SIZE + 4];
    let face_count = u32::from_le_bytes([c[0], c[1], c[2], c[3]]);

    let records = bytes[HEADER_SIZE + 4..].chunks_exact(TRIANGLE_SIZE);
    if records.len() < face_count as usize {
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: fewer records than a u32 count
        return Err(IoError::InvalidFaceCount {
            expected: face_count,
            got: records.len() as u32,
        });
    }

    Ok(records.take(face_count as usize).map(read_record).collect())
}

fn read_record(record: &[u8]) -> Facet {
    let mut values = [0.0f64; 12];
    for (value, c) in values.iter_mut().zip(record.chunks_exact(4)) {
        *value = f64::from(f32::from_le_bytes([c[0], c[1], c[2], c[3]]));
    }

    Facet::new(
        Vector3::new(values[0], values[1], values[2]),
        [
            Point3::new(values[3], values[4], values[5]),
            Point3::new(values[6], values[7], values[8]),
            Point3::new(values[9], values[10], values[11]),
        ],
    )
}

fn parse_triple(parts: &[&str]) -> IoResult<[f64; 3]> {
    match parts {
        [x, y, z, ..] => Ok([x.parse()?, y.parse()?, z.parse()?]),
        _ => Err(IoError::invalid_content(format!(
            "expected three numbers, got {}",
            parts.len()
        ))),
    }
}

fn read_stl_ascii(text: &str) -> IoResult<Vec<Facet>> {
    let mut facets = Vec::new();
    let mut normal: Option<Vector3<f64>> = None;
    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(3);

    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(keyword) = parts.first() else {
            continue;
        };

        match keyword.to_lowercase().as_str() {
            "facet" => {
                if !parts.get(1).is_some_and(|p| p.eq_ignore_ascii_case("normal")) {
                    return Err(IoError::invalid_content("facet without normal"));
                }
                let [x, y, z] = parse_triple(&parts[2..])?;
                normal = Some(Vector3::new(x, y, z));
                vertices.clear();
            }
            "vertex" => {
                let [x, y, z] = parse_triple(&parts[1..])?;
                vertices.push(Point3::new(x, y, z));
            }
            "endfacet" => {
                let Some(n) = normal.take() else {
                    return Err(IoError::invalid_content("endfacet without facet"));
                };
                let [v0, v1, v2] = vertices[..] else {
                    return Err(IoError::invalid_content(format!(
                        "facet with {} vertices",
                        vertices.len()
                    )));
                };
                facets.push(Facet::new(n, [v0, v1, v2]));
                vertices.clear();
            }
            "endsolid" => break,
            _ => {
                // solid, outer loop, endloop
            }
        }
    }

    Ok(facets)
}
