//! I/O operations for stledit models
//!
//! This crate reads model files into the triangle records consumed by
//! `stledit_core::loader`. STL is the only supported format; both the ASCII
//! and binary encodings are handled.

pub mod stl;

pub use stl::{detect_format, parse_stl, StlFormat, StlReader};

use std::path::Path;
use stledit_core::{build_mesh_with_options, LoadError, LoadOptions, MeshData, Result, Triangle};

/// Trait for reading triangle soup from files
pub trait TriangleReader {
    fn read_triangles<P: AsRef<Path>>(path: P) -> Result<Vec<Triangle>>;
}

/// Auto-detect format and read triangles
pub fn read_triangles<P: AsRef<Path>>(path: P) -> Result<Vec<Triangle>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match extension.as_deref() {
        Some("stl") => StlReader::read_triangles(path),
        _ => Err(stledit_core::Error::UnsupportedFormat(format!(
            "Unsupported model format: {:?}",
            path.extension()
        ))),
    }
}

/// Parse a model held in memory, as fetched by an asset loader
pub fn parse_model(bytes: &[u8]) -> Result<Vec<Triangle>> {
    parse_stl(bytes)
}

/// Read a model file and resolve it into shared-vertex mesh data
pub fn load_mesh<P: AsRef<Path>>(path: P, options: &LoadOptions) -> std::result::Result<MeshData, LoadError> {
    let triangles = read_triangles(path)?;
    build_mesh_with_options(&triangles, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CUBE_STL: &[u8] = include_bytes!("../../assets/cube.stl");

    #[test]
    fn test_bundled_cube() {
        let triangles = parse_model(CUBE_STL).unwrap();
        assert_eq!(triangles.len(), 12);
        assert!(triangles.iter().all(|t| t.normal.is_some()));

        let mesh = build_mesh_with_options(&triangles, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
    }

    #[test]
    fn test_auto_detect_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cube.STL");
        fs::write(&path, CUBE_STL).unwrap();

        let triangles = read_triangles(&path).unwrap();
        assert_eq!(triangles.len(), 12);

        let mesh = load_mesh(&path, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
    }

    #[test]
    fn test_unsupported_format() {
        let result = read_triangles("model.obj");
        assert!(matches!(result, Err(stledit_core::Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = read_triangles("does/not/exist.stl");
        assert!(matches!(result, Err(stledit_core::Error::Io(_))));
    }

    #[test]
    fn test_empty_model_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.stl");
        fs::write(&path, "solid empty\nendsolid empty\n").unwrap();

        let result = load_mesh(&path, &LoadOptions::default());
        assert!(matches!(result, Err(LoadError::EmptyModel)));
    }
}
