//! End-to-end STL export tests.
//!
//! Covers the canonical scenarios (single triangle, single quad, no meshes)
//! on disk, plus transform, ordering and failure behaviour through streams.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::io::{self, Cursor, Seek, SeekFrom, Write};

use approx::assert_relative_eq;
use mesh_io::{
    ExportConfig, IoError, NoProgress, StlFormat, load_stl, read_stl, save_stl,
    save_stl_ascii_with_progress, write_stl_ascii, write_stl_binary, write_stl_binary_counted,
};
use mesh_types::{Facet, Point3, PolyMesh, Vector3, unit_cube};
use tempfile::tempdir;

// =============================================================================
// Fixtures
// =============================================================================

fn triangle() -> PolyMesh {
    PolyMesh::from_raw(
        &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        &[0, 1, 2, 2],
        &[0.0, 0.0, 1.0],
    )
}

fn quad() -> PolyMesh {
    PolyMesh::from_raw(
        &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0],
        &[0, 1, 2, 3],
        &[0.0, 0.0, 1.0],
    )
}

/// Mixed mesh: two triangles and three quads, with awkward coordinates.
fn mixed() -> PolyMesh {
    let mut mesh = PolyMesh::new();
    for i in 0..8u32 {
        let t = f64::from(i);
        mesh.push_vertex(Point3::new(t * 0.375, -t * 1.25, t.mul_add(0.5, -2.0)));
    }
    mesh.push_triangle([0, 1, 2], Vector3::new(0.0, 0.6, 0.8));
    mesh.push_quad([1, 2, 3, 4], Vector3::x());
    mesh.push_quad([4, 5, 6, 7], -Vector3::y());
    mesh.push_triangle([7, 6, 5], Vector3::z());
    mesh.push_quad([0, 2, 4, 6], Vector3::new(0.0, -0.8, 0.6));
    mesh
}

fn ascii_string(meshes: &[PolyMesh], config: &ExportConfig, name: &str) -> String {
    let mut out = Vec::new();
    write_stl_ascii(meshes, config, name, &mut out, &mut NoProgress).unwrap();
    String::from_utf8(out).unwrap()
}

fn binary_bytes(meshes: &[PolyMesh], config: &ExportConfig) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    write_stl_binary(meshes, config, &mut out, &mut NoProgress).unwrap();
    out.into_inner()
}

fn header_count(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(bytes[80..84].try_into().unwrap())
}

fn assert_facets_close(a: &[Facet], b: &[Facet]) {
    assert_eq!(a.len(), b.len());
    for (fa, fb) in a.iter().zip(b) {
        assert_relative_eq!(fa.normal, fb.normal, epsilon = 1e-5);
        for (va, vb) in fa.vertices.iter().zip(&fb.vertices) {
            assert_relative_eq!(va, vb, epsilon = 1e-5);
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn scenario_single_triangle() {
    let dir = tempdir().unwrap();
    let config = ExportConfig::default();

    let ascii_path = dir.path().join("tri.stl");
    assert_eq!(
        save_stl(&[triangle()], &ascii_path, &config, StlFormat::Ascii).unwrap(),
        1
    );
    let text = std::fs::read_to_string(&ascii_path).unwrap();
    assert_eq!(
        text.matches("facet normal 0.000000 0.000000 1.000000\n").count(),
        1
    );
    let vertices: Vec<&str> = text.lines().filter(|l| l.contains("vertex")).collect();
    assert_eq!(
        vertices,
        [
            "\t\tvertex 0.000000 0.000000 0.000000",
            "\t\tvertex 1.000000 0.000000 0.000000",
            "\t\tvertex 0.000000 1.000000 0.000000",
        ]
    );
    assert!(text.starts_with("solid tri\n"));
    assert!(text.ends_with("endsolid tri\n"));

    let binary_path = dir.path().join("tri_bin.stl");
    save_stl(&[triangle()], &binary_path, &config, StlFormat::Binary).unwrap();
    let bytes = std::fs::read(&binary_path).unwrap();
    assert_eq!(bytes.len(), 134);
    assert_eq!(header_count(&bytes), 1);
}

#[test]
fn scenario_single_quad() {
    let dir = tempdir().unwrap();
    let config = ExportConfig::default();

    let ascii_path = dir.path().join("quad.stl");
    save_stl(&[quad()], &ascii_path, &config, StlFormat::Ascii).unwrap();
    let text = std::fs::read_to_string(&ascii_path).unwrap();
    assert_eq!(text.matches("facet normal").count(), 2);
    assert_eq!(text.matches("endfacet").count(), 2);

    let binary_path = dir.path().join("quad_bin.stl");
    save_stl(&[quad()], &binary_path, &config, StlFormat::Binary).unwrap();
    let bytes = std::fs::read(&binary_path).unwrap();
    assert_eq!(bytes.len(), 184);
    assert_eq!(header_count(&bytes), 2);
}

#[test]
fn scenario_no_meshes() {
    let config = ExportConfig::default();

    assert_eq!(
        ascii_string(&[], &config, "empty"),
        "solid empty\nendsolid empty\n"
    );

    let bytes = binary_bytes(&[], &config);
    assert_eq!(bytes.len(), 84);
    assert_eq!(header_count(&bytes), 0);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn binary_count_is_triangles_plus_twice_quads() {
    let meshes = [mixed(), unit_cube(), triangle(), quad()];
    // mixed: 2 tri + 3 quad = 8, cube: 12, triangle: 1, quad: 2
    let expected = 8 + 12 + 1 + 2;

    let bytes = binary_bytes(&meshes, &ExportConfig::default());
    assert_eq!(header_count(&bytes), expected);
    assert_eq!(bytes.len(), 84 + 50 * expected as usize);
}

#[test]
fn quad_splits_into_012_then_230() {
    let mesh = quad();
    let c = &mesh.coords;
    let expected = [[c[0], c[1], c[2]], [c[2], c[3], c[0]]];

    let ascii = read_stl(ascii_string(&[mesh.clone()], &ExportConfig::default(), "q").as_bytes())
        .unwrap();
    let binary = read_stl(binary_bytes(&[mesh.clone()], &ExportConfig::default()).as_slice())
        .unwrap();

    for facets in [ascii, binary] {
        let vertices: Vec<_> = facets.iter().map(|f| f.vertices).collect();
        assert_eq!(vertices, expected);
    }
}

#[test]
fn first_equals_last_is_one_triangle() {
    let mut mesh = quad();
    mesh.faces[0] = [3, 1, 2, 3];

    let facets = read_stl(binary_bytes(&[mesh], &ExportConfig::default()).as_slice()).unwrap();
    assert_eq!(facets.len(), 1);
}

#[test]
fn transform_applied_to_every_vertex() {
    let mesh = mixed();
    let configs = [
        ExportConfig::default(),
        ExportConfig::new(2.0, Vector3::new(1.0, -1.0, 0.5)),
        ExportConfig::new(0.1, Vector3::zeros()),
        ExportConfig::new(1.0, Vector3::new(100.0, 0.0, -3.25)),
    ];

    let untransformed: Vec<Facet> = mesh.facets().map(Result::unwrap).collect();

    for config in &configs {
        let written = read_stl(binary_bytes(&[mesh.clone()], config).as_slice()).unwrap();
        assert_eq!(written.len(), untransformed.len());

        for (out, src) in written.iter().zip(&untransformed) {
            assert_relative_eq!(out.normal, src.normal, epsilon = 1e-6);
            for (v_out, v_src) in out.vertices.iter().zip(&src.vertices) {
                let expected = Point3::from(v_src.coords * config.scale + config.offset);
                assert_relative_eq!(*v_out, expected, epsilon = 1e-4);
            }
        }
    }
}

#[test]
fn ascii_and_binary_agree() {
    let meshes = [mixed(), unit_cube()];
    let config = ExportConfig::new(3.0, Vector3::new(-0.5, 0.25, 2.0));

    let ascii = read_stl(ascii_string(&meshes, &config, "both").as_bytes()).unwrap();
    let binary = read_stl(binary_bytes(&meshes, &config).as_slice()).unwrap();

    assert_eq!(ascii.len(), 20);
    assert_facets_close(&ascii, &binary);
}

#[test]
fn exports_are_reproducible() {
    let meshes = [mixed(), quad()];
    let config = ExportConfig::new(1.5, Vector3::new(0.1, 0.2, 0.3));

    assert_eq!(
        ascii_string(&meshes, &config, "again"),
        ascii_string(&meshes, &config, "again")
    );
    assert_eq!(binary_bytes(&meshes, &config), binary_bytes(&meshes, &config));
}

#[test]
fn counted_writer_matches_seeking_writer() {
    let meshes = [mixed(), unit_cube()];
    let config = ExportConfig::new(10.0, Vector3::new(0.0, 0.0, 1.0));

    let mut counted = Vec::new();
    write_stl_binary_counted(&meshes, &config, &mut counted, &mut NoProgress).unwrap();

    assert_eq!(counted, binary_bytes(&meshes, &config));
}

// =============================================================================
// Files and names
// =============================================================================

#[test]
fn solid_name_comes_from_file_name() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("My Human.stl");
    save_stl(&[], &path, &ExportConfig::default(), StlFormat::Ascii).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "solid my_human\nendsolid my_human\n");
}

#[test]
fn load_back_saved_files() {
    let dir = tempdir().unwrap();
    let config = ExportConfig::default().with_scale(2.0);

    for format in [StlFormat::Ascii, StlFormat::Binary] {
        let path = dir.path().join(format!("cube_{format:?}.stl"));
        save_stl(&[unit_cube()], &path, &config, format).unwrap();

        let facets = load_stl(&path).unwrap();
        assert_eq!(facets.len(), 12);
        let max = facets
            .iter()
            .flat_map(|f| f.vertices)
            .map(|v| v.x.max(v.y).max(v.z))
            .fold(f64::MIN, f64::max);
        assert_relative_eq!(max, 2.0, epsilon = 1e-6);
    }
}

// =============================================================================
// Failures
// =============================================================================

/// Accepts writes but refuses to seek, like a pipe.
struct PipeWriter(Vec<u8>);

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for PipeWriter {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "not seekable"))
    }
}

#[test]
fn non_seekable_sink_fails_seek_back() {
    let mut pipe = PipeWriter(Vec::new());
    let result = write_stl_binary(
        &[quad()],
        &ExportConfig::default(),
        &mut pipe,
        &mut NoProgress,
    );

    assert!(matches!(result, Err(IoError::Io(ref e)) if e.kind() == io::ErrorKind::Unsupported));
    // Records were written but the count placeholder was never patched.
    assert_eq!(pipe.0.len(), 184);
    assert_eq!(header_count(&pipe.0), 0);
}

#[test]
fn non_seekable_sink_works_with_counted_writer() {
    let mut pipe = PipeWriter(Vec::new());
    let count = write_stl_binary_counted(
        &[quad()],
        &ExportConfig::default(),
        &mut pipe,
        &mut NoProgress,
    )
    .unwrap();

    assert_eq!(count, 2);
    assert_eq!(header_count(&pipe.0), 2);
}

#[test]
fn invalid_mesh_creates_no_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.stl");

    let mut bad = quad();
    bad.normals.clear();

    for format in [StlFormat::Ascii, StlFormat::Binary] {
        let err = save_stl(&[bad.clone()], &path, &ExportConfig::default(), format).unwrap_err();
        assert!(matches!(err, IoError::InvalidMesh { mesh: 0, .. }));
        assert!(!path.exists());
    }
}

#[test]
fn unwritable_destination_is_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("out.stl");

    let err = save_stl(&[quad()], &path, &ExportConfig::default(), StlFormat::Binary).unwrap_err();
    assert!(matches!(err, IoError::Io(_)));
}

// =============================================================================
// Progress
// =============================================================================

#[test]
fn progress_reports_each_mesh() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progress.stl");

    let mut steps: Vec<(f64, String)> = Vec::new();
    let mut sink = |fraction: f64, status: &str| steps.push((fraction, status.to_string()));
    save_stl_ascii_with_progress(
        &[triangle(), quad(), unit_cube()],
        &path,
        &ExportConfig::default(),
        &mut sink,
    )
    .unwrap();

    // start, header, three meshes, finish
    assert_eq!(steps.len(), 6);
    assert_eq!(steps[0].0, 0.0);
    assert_relative_eq!(steps[1].0, 0.3);
    assert_relative_eq!(steps[4].0, 0.99, epsilon = 1e-12);
    assert_eq!(
        steps[5],
        (
            1.0,
            format!("STL export finished. Exported file: {}", path.display())
        )
    );
    assert!(steps.windows(2).all(|w| w[0].0 <= w[1].0));
    assert!(steps.iter().all(|(f, _)| (0.0..=1.0).contains(f)));
}

#[test]
fn progress_does_not_change_output() {
    let meshes = [mixed()];
    let config = ExportConfig::default();

    let mut calls = 0;
    let mut sink = |_: f64, _: &str| calls += 1;
    let mut out = Cursor::new(Vec::new());
    write_stl_binary(&meshes, &config, &mut out, &mut sink).unwrap();

    assert_eq!(out.into_inner(), binary_bytes(&meshes, &config));
    assert_eq!(calls, 4);
}
