//! Conversion from triangle soup to shared-vertex mesh data
//!
//! Model files store every triangle with its own copy of each corner. The
//! editor needs one vertex per distinct position so that dragging a corner
//! moves every triangle that touches it. This module resolves the soup into
//! canonical vertices, face index triples and the reverse vertex-to-face map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Color;
use crate::error::LoadError;
use crate::mesh::*;
use crate::point::*;

/// One triangle as produced by a model parser
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [Point3f; 3],
    /// Facet normal stored in the file, if any
    pub normal: Option<Vector3f>,
}

impl Triangle {
    /// Create a triangle without a stored normal
    pub fn new(a: Point3f, b: Point3f, c: Point3f) -> Self {
        Self {
            vertices: [a, b, c],
            normal: None,
        }
    }

    /// Attach a stored facet normal
    pub fn with_normal(mut self, normal: Vector3f) -> Self {
        self.normal = Some(normal);
        self
    }

    /// The normal the face starts with: the stored one when usable,
    /// otherwise the one implied by the winding.
    fn initial_normal(&self) -> (Vector3f, bool) {
        let stored = self
            .normal
            .filter(|n| n.iter().all(|c| c.is_finite()))
            .and_then(|n| n.try_normalize(DEGENERATE_NORMAL_THRESHOLD));
        if let Some(normal) = stored {
            return (normal, false);
        }
        let [a, b, c] = &self.vertices;
        match triangle_normal(a, b, c) {
            Some(normal) => (normal, false),
            None => (Vector3f::zeros(), true),
        }
    }
}

/// Options controlling how triangle soup is resolved into mesh data
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Decimal places two corners must agree to in order to be merged
    pub decimals: u32,
    /// Color given to every face after loading
    pub face_color: Color,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            decimals: POSITION_DECIMALS,
            face_color: Color::default(),
        }
    }
}

impl LoadOptions {
    /// Set the merge precision
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// Set the initial face color
    pub fn with_face_color(mut self, color: Color) -> Self {
        self.face_color = color;
        self
    }
}

/// Split a flat position buffer (nine floats per triangle) into triangles.
///
/// `normals`, when given, holds one normal per corner in the same layout;
/// the three corner normals of each triangle are averaged into the facet
/// normal.
pub fn triangles_from_flat(
    positions: &[f32],
    normals: Option<&[f32]>,
) -> Result<Vec<Triangle>, LoadError> {
    if positions.len() % 9 != 0 {
        return Err(LoadError::MalformedTriangle {
            index: positions.len() / 9,
            points: (positions.len() % 9) / 3,
        });
    }

    let point = |buf: &[f32], i: usize| Point3f::new(buf[i], buf[i + 1], buf[i + 2]);
    let triangles = positions
        .chunks_exact(9)
        .enumerate()
        .map(|(index, chunk)| {
            let mut triangle = Triangle::new(point(chunk, 0), point(chunk, 3), point(chunk, 6));
            if let Some(normals) = normals {
                let base = index * 9;
                if let Some(corner_normals) = normals.get(base..base + 9) {
                    let sum = point(corner_normals, 0).coords
                        + point(corner_normals, 3).coords
                        + point(corner_normals, 6).coords;
                    triangle.normal = Some(sum / 3.0);
                }
            }
            triangle
        })
        .collect();
    Ok(triangles)
}

/// Resolve triangles into shared-vertex mesh data with default options
pub fn build_mesh(triangles: &[Triangle]) -> Result<MeshData, LoadError> {
    build_mesh_with_options(triangles, &LoadOptions::default())
}

/// Resolve triangles into shared-vertex mesh data.
///
/// Canonical vertex ids are assigned in first-seen order and face ids follow
/// input order, so loading the same file always yields the same ids.
pub fn build_mesh_with_options(
    triangles: &[Triangle],
    options: &LoadOptions,
) -> Result<MeshData, LoadError> {
    if triangles.is_empty() {
        return Err(LoadError::EmptyModel);
    }

    let mut lookup: HashMap<QuantizedPoint, VertexId> = HashMap::new();
    let mut vertices: Vec<Vertex> = Vec::new();
    let mut faces = Vec::with_capacity(triangles.len());

    for (index, triangle) in triangles.iter().enumerate() {
        if !triangle.vertices.iter().all(is_finite_point) {
            return Err(LoadError::NonFinitePoint { index });
        }
        let face_id = FaceId(index);
        let mut vertex_indices = [VertexId(0); 3];

        for (slot, position) in triangle.vertices.iter().enumerate() {
            let key = QuantizedPoint::with_decimals(position, options.decimals);
            let id = *lookup.entry(key).or_insert_with(|| {
                let id = VertexId(vertices.len());
                vertices.push(Vertex::new(id, *position));
                id
            });
            vertex_indices[slot] = id;

            // Faces are visited in ascending order, so checking the tail is
            // enough to keep the list sorted and free of duplicates.
            let connected = &mut vertices[id.0].connected_faces;
            if connected.last() != Some(&face_id) {
                connected.push(face_id);
            }
        }

        let (normal, degenerate) = triangle.initial_normal();
        faces.push(Face {
            id: face_id,
            vertex_indices,
            vertices: triangle.vertices,
            normal,
            color: options.face_color,
            highlighted: false,
            degenerate,
        });
    }

    // Cached corners point at the canonical positions, not the raw soup.
    let mut mesh = MeshData { vertices, faces };
    for face in &mut mesh.faces {
        let [a, b, c] = face.vertex_indices;
        face.vertices = [
            mesh.vertices[a.0].position,
            mesh.vertices[b.0].position,
            mesh.vertices[c.0].position,
        ];
    }

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "resolved triangle soup into shared-vertex mesh"
    );
    Ok(mesh)
}

/// Eight corners and twelve outward-wound triangles of an axis-aligned cube
/// centered on the origin.
pub fn cube_triangles(half_extent: f32) -> Vec<Triangle> {
    let h = half_extent;
    let p = |x: f32, y: f32, z: f32| Point3f::new(x * h, y * h, z * h);
    let quads = [
        // +x, -x
        [p(1., -1., -1.), p(1., 1., -1.), p(1., 1., 1.), p(1., -1., 1.)],
        [p(-1., -1., -1.), p(-1., -1., 1.), p(-1., 1., 1.), p(-1., 1., -1.)],
        // +y, -y
        [p(-1., 1., -1.), p(-1., 1., 1.), p(1., 1., 1.), p(1., 1., -1.)],
        [p(-1., -1., -1.), p(1., -1., -1.), p(1., -1., 1.), p(-1., -1., 1.)],
        // +z, -z
        [p(-1., -1., 1.), p(1., -1., 1.), p(1., 1., 1.), p(-1., 1., 1.)],
        [p(-1., -1., -1.), p(-1., 1., -1.), p(1., 1., -1.), p(1., -1., -1.)],
    ];
    quads
        .iter()
        .flat_map(|[a, b, c, d]| [Triangle::new(*a, *b, *c), Triangle::new(*a, *c, *d)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_resolves_to_eight_vertices() {
        let mesh = build_mesh(&cube_triangles(1.0)).unwrap();
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.vertex_count(), 8);

        for (i, face) in mesh.faces.iter().enumerate() {
            assert_eq!(face.id, FaceId(i));
            assert_eq!(face.color, Color::default());
            assert!(!face.highlighted);
        }
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let mesh = build_mesh(&cube_triangles(1.0)).unwrap();
        for face in &mesh.faces {
            let centroid = (face.vertices[0].coords + face.vertices[1].coords + face.vertices[2].coords) / 3.0;
            assert!(face.normal.dot(&centroid) > 0.0, "face {} points inward", face.id);
            assert_relative_eq!(face.normal.norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_connected_faces_invariant() {
        let mesh = build_mesh(&cube_triangles(2.0)).unwrap();
        for vertex in &mesh.vertices {
            assert!(!vertex.connected_faces.is_empty());
            assert!(vertex.connected_faces.windows(2).all(|w| w[0] < w[1]));
            for face_id in &vertex.connected_faces {
                assert!(mesh.faces[face_id.0].references(vertex.id));
            }
        }
        // every face reference shows up in the reverse map
        for face in &mesh.faces {
            for vertex_id in face.vertex_indices {
                assert!(mesh.vertices[vertex_id.0].connected_faces.contains(&face.id));
            }
        }
    }

    #[test]
    fn test_ids_assigned_in_first_seen_order() {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(1.0, 0.0, 0.0);
        let c = Point3f::new(0.0, 1.0, 0.0);
        let d = Point3f::new(1.0, 1.0, 0.0);
        let mesh = build_mesh(&[Triangle::new(a, b, c), Triangle::new(b, d, c)]).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces[0].vertex_indices, [VertexId(0), VertexId(1), VertexId(2)]);
        assert_eq!(mesh.faces[1].vertex_indices, [VertexId(1), VertexId(3), VertexId(2)]);
        assert_eq!(mesh.vertices[1].connected_faces, vec![FaceId(0), FaceId(1)]);
        assert_eq!(mesh.vertices[3].connected_faces, vec![FaceId(1)]);
    }

    #[test]
    fn test_near_duplicates_merge_regardless_of_order() {
        let exact = Point3f::new(0.5, 0.25, -1.0);
        let noisy = Point3f::new(0.500_000_1, 0.25, -1.000_000_1);
        let other = Point3f::new(3.0, 0.0, 0.0);
        let far = Point3f::new(0.0, 3.0, 0.0);

        let forward = build_mesh(&[
            Triangle::new(exact, other, far),
            Triangle::new(noisy, far, other),
        ])
        .unwrap();
        let backward = build_mesh(&[
            Triangle::new(noisy, other, far),
            Triangle::new(exact, far, other),
        ])
        .unwrap();

        assert_eq!(forward.vertex_count(), 3);
        assert_eq!(backward.vertex_count(), 3);
        assert_eq!(forward.faces[0].vertex_indices[0], forward.faces[1].vertex_indices[0]);
        assert_eq!(backward.faces[0].vertex_indices[0], backward.faces[1].vertex_indices[0]);
    }

    #[test]
    fn test_degenerate_face_lists_vertex_once() {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(1.0, 0.0, 0.0);
        let mesh = build_mesh(&[Triangle::new(a, a, b)]).unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.vertices[0].connected_faces, vec![FaceId(0)]);
        assert!(mesh.faces[0].degenerate);
        assert_eq!(mesh.faces[0].normal, Vector3f::zeros());
    }

    #[test]
    fn test_stored_normal_is_normalized() {
        let t = Triangle::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        )
        .with_normal(Vector3f::new(0.0, 0.0, 4.0));
        let mesh = build_mesh(&[t]).unwrap();
        assert_relative_eq!(mesh.faces[0].normal, Vector3f::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_zero_stored_normal_falls_back_to_winding() {
        let t = Triangle::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
        )
        .with_normal(Vector3f::zeros());
        let mesh = build_mesh(&[t]).unwrap();
        assert_relative_eq!(mesh.faces[0].normal, -Vector3f::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(build_mesh(&[]), Err(LoadError::EmptyModel)));
    }

    #[test]
    fn test_non_finite_corner_fails() {
        let origin = Triangle::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        );
        let poisoned = Triangle::new(
            Point3f::new(f32::NAN, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
        );
        match build_mesh(&[origin, poisoned]) {
            Err(LoadError::NonFinitePoint { index }) => assert_eq!(index, 1),
            other => panic!("expected non-finite point, got {:?}", other),
        }

        let infinite = Triangle::new(
            Point3f::new(0.0, f32::INFINITY, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
        );
        assert!(matches!(
            build_mesh(&[infinite]),
            Err(LoadError::NonFinitePoint { index: 0 })
        ));
    }

    #[test]
    fn test_flat_buffer_conversion() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let triangles = triangles_from_flat(&positions, Some(&normals)).unwrap();
        assert_eq!(triangles.len(), 1);
        assert_eq!(triangles[0].vertices[1], Point3f::new(1.0, 0.0, 0.0));
        assert_relative_eq!(triangles[0].normal.unwrap(), Vector3f::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_flat_buffer_rejects_partial_triangle() {
        let positions = [0.0; 15];
        match triangles_from_flat(&positions, None) {
            Err(LoadError::MalformedTriangle { index, points }) => {
                assert_eq!(index, 1);
                assert_eq!(points, 2);
            }
            other => panic!("expected malformed triangle, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_options() {
        let color: Color = "#ef4444".parse().unwrap();
        let options = LoadOptions::default().with_decimals(1).with_face_color(color);
        let mesh = build_mesh_with_options(
            &[Triangle::new(
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(0.01, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            )],
            &options,
        )
        .unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.faces[0].color, color);
    }
}
