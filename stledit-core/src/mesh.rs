//! Shared-vertex triangle mesh with derived face geometry

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::point::*;

/// Cross products shorter than this are treated as zero when normalizing
pub const DEGENERATE_NORMAL_THRESHOLD: f32 = 1e-12;

/// Stable identifier of a vertex, assigned at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub usize);

/// Stable identifier of a face, equal to its position in the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceId(pub usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// A canonical mesh vertex shared by one or more faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub position: Point3f,
    pub highlighted: bool,
    /// Faces referencing this vertex, sorted ascending. Fixed after load.
    pub connected_faces: Vec<FaceId>,
}

/// A triangle referencing three shared vertices.
///
/// `vertices` and `normal` are caches derived from the vertex positions and
/// are rewritten by [`Face::refresh_geometry`] whenever a vertex moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub id: FaceId,
    pub vertex_indices: [VertexId; 3],
    pub vertices: [Point3f; 3],
    pub normal: Vector3f,
    pub color: Color,
    pub highlighted: bool,
    /// Set when the last refresh found the triangle to have no area; the
    /// previous normal is kept in that case.
    pub degenerate: bool,
}

impl Vertex {
    /// Create an unhighlighted vertex with no face references yet
    pub fn new(id: VertexId, position: Point3f) -> Self {
        Self {
            id,
            position,
            highlighted: false,
            connected_faces: Vec::new(),
        }
    }
}

impl Face {
    /// Whether `vertex` is one of this face's corners
    pub fn references(&self, vertex: VertexId) -> bool {
        self.vertex_indices.contains(&vertex)
    }

    /// Rewrite the cached corner positions and recompute the normal.
    ///
    /// Returns `false` when the triangle is degenerate, in which case the
    /// previous normal is retained and `degenerate` is set.
    pub fn refresh_geometry(&mut self, corners: [Point3f; 3]) -> bool {
        self.vertices = corners;
        match triangle_normal(&corners[0], &corners[1], &corners[2]) {
            Some(normal) => {
                self.normal = normal;
                self.degenerate = false;
                true
            }
            None => {
                self.degenerate = true;
                false
            }
        }
    }
}

/// Right-handed unit normal of a triangle, `normalize((v1 - v0) x (v2 - v0))`.
///
/// Returns `None` for collinear or non-finite corners.
pub fn triangle_normal(v0: &Point3f, v1: &Point3f, v2: &Point3f) -> Option<Vector3f> {
    let cross = (v1 - v0).cross(&(v2 - v0));
    let length = cross.norm();
    if length.is_finite() && length > DEGENERATE_NORMAL_THRESHOLD {
        Some(cross / length)
    } else {
        None
    }
}

/// Vertex and face collections produced by the loader
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
}

impl MeshData {
    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Look up a vertex by id
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0)
    }

    /// Look up a face by id
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.0)
    }

    /// Current positions of a face's corners, looked up from the vertex list
    pub fn corner_positions(&self, face: &Face) -> Option<[Point3f; 3]> {
        let [a, b, c] = face.vertex_indices;
        Some([
            self.vertex(a)?.position,
            self.vertex(b)?.position,
            self.vertex(c)?.position,
        ])
    }

    /// Recompute every face's cached corners and normal from the vertices.
    ///
    /// Returns the number of faces found degenerate.
    pub fn refresh_faces(&mut self) -> usize {
        let mut degenerate = 0;
        for index in 0..self.faces.len() {
            let Some(corners) = self.corner_positions(&self.faces[index]) else {
                continue;
            };
            if !self.faces[index].refresh_geometry(corners) {
                degenerate += 1;
            }
        }
        degenerate
    }
}
