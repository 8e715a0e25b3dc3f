//! Authoritative mesh state for an editing session
//!
//! [`MeshStore`] is the only mutator of vertices and faces. Every operation
//! runs to completion under a single `&mut self` borrow, recomputing derived
//! face geometry before it returns, so any `&self` reader always sees face
//! corners and normals that agree with the current vertex positions.
//!
//! Operations addressed to an unknown id are no-ops and report `false`;
//! callers may hold ids from an older snapshot and must not be able to
//! corrupt or crash the session through them.

use serde::{Deserialize, Serialize};
use stledit_core::{is_finite_point, Color, Drawable, Face, FaceId, MeshData, Point3f, Vertex, VertexId};
use tracing::{trace, warn};

use crate::config::SCALE_EPSILON;

/// Counts and extent of the mesh, as shown in the model info panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshStats {
    pub face_count: usize,
    pub vertex_count: usize,
    pub bounds_min: Point3f,
    pub bounds_max: Point3f,
}

/// `-1`, `0` or `1`; unlike `f32::signum`, zero maps to zero
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// New value of one coordinate of a vertex that was not moved directly.
///
/// When the driving vertex's coordinate went from `old` to `new`, every
/// other vertex is scaled about the origin by `|new| / |old|`, flipping
/// sides if the driving coordinate crossed zero. Axes that did not change,
/// or whose old value is within `epsilon` of zero, are left untouched.
///
/// This gives an intuitive resize only for meshes centered on the origin
/// with corners on both sides of each axis, such as the stock cube.
///
/// The product is formed in `f64`, so a zero coordinate stays zero even for
/// huge ratios. A result beyond the `f32` range comes back infinite.
pub fn linked_scale_axis(value: f32, old: f32, new: f32, epsilon: f32) -> f32 {
    if new == old || old.abs() <= epsilon {
        return value;
    }
    let scale = f64::from(new.abs()) / f64::from(old.abs());
    let flip = f64::from(sign(new) * sign(old));
    (f64::from(value) * scale * flip) as f32
}

/// Owner of the face and vertex collections plus the selection ids
#[derive(Debug, Clone)]
pub struct MeshStore {
    mesh: MeshData,
    selected_face: Option<FaceId>,
    selected_vertex: Option<VertexId>,
    scale_epsilon: f32,
    revision: u64,
}

impl MeshStore {
    /// Take ownership of freshly loaded mesh data
    pub fn new(mesh: MeshData) -> Self {
        Self {
            mesh,
            selected_face: None,
            selected_vertex: None,
            scale_epsilon: SCALE_EPSILON,
            revision: 0,
        }
    }

    /// Override the linked scaling threshold
    pub fn with_scale_epsilon(mut self, epsilon: f32) -> Self {
        self.scale_epsilon = epsilon;
        self
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn faces(&self) -> &[Face] {
        &self.mesh.faces
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.mesh.vertices
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.mesh.face(id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.mesh.vertex(id)
    }

    pub fn selected_face(&self) -> Option<FaceId> {
        self.selected_face
    }

    pub fn selected_vertex(&self) -> Option<VertexId> {
        self.selected_vertex
    }

    /// Counter bumped by every geometry change; color, highlight and
    /// selection changes leave it alone.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn stats(&self) -> MeshStats {
        let (bounds_min, bounds_max) = self.mesh.bounding_box();
        MeshStats {
            face_count: self.mesh.face_count(),
            vertex_count: self.mesh.vertex_count(),
            bounds_min,
            bounds_max,
        }
    }

    /// Recolor one face. Geometry is untouched.
    pub fn set_face_color(&mut self, id: FaceId, color: Color) -> bool {
        match self.mesh.faces.get_mut(id.0) {
            Some(face) => {
                face.color = color;
                true
            }
            None => false,
        }
    }

    /// Move a vertex, rescale every other vertex along the changed axes and
    /// recompute all face geometry.
    ///
    /// The move is all or nothing: if scaling would push any vertex outside
    /// the finite `f32` range, nothing changes and `false` is returned.
    pub fn set_vertex_position(&mut self, id: VertexId, position: Point3f) -> bool {
        if !is_finite_point(&position) {
            warn!(vertex = %id, ?position, "ignoring non-finite vertex position");
            return false;
        }
        let Some(old) = self.mesh.vertex(id).map(|v| v.position) else {
            return false;
        };

        let epsilon = self.scale_epsilon;
        let moved: Vec<Point3f> = self
            .mesh
            .vertices
            .iter()
            .map(|vertex| {
                if vertex.id == id {
                    return position;
                }
                let p = vertex.position;
                Point3f::new(
                    linked_scale_axis(p.x, old.x, position.x, epsilon),
                    linked_scale_axis(p.y, old.y, position.y, epsilon),
                    linked_scale_axis(p.z, old.z, position.z, epsilon),
                )
            })
            .collect();
        if !moved.iter().all(is_finite_point) {
            warn!(vertex = %id, ?old, new = ?position, "rejecting move that scales vertices out of range");
            return false;
        }
        for (vertex, p) in self.mesh.vertices.iter_mut().zip(moved) {
            vertex.position = p;
        }

        let degenerate = self.mesh.refresh_faces();
        if degenerate > 0 {
            warn!(
                vertex = %id,
                degenerate,
                "faces collapsed to zero area; keeping their previous normals"
            );
        }
        self.revision += 1;
        trace!(vertex = %id, ?old, new = ?position, revision = self.revision, "moved vertex");
        true
    }

    /// Set the selected face. Does not touch the vertex selection.
    pub fn set_selected_face(&mut self, id: Option<FaceId>) -> bool {
        if let Some(id) = id {
            if self.mesh.face(id).is_none() {
                return false;
            }
        }
        self.selected_face = id;
        true
    }

    /// Set the selected vertex. Does not touch the face selection.
    pub fn set_selected_vertex(&mut self, id: Option<VertexId>) -> bool {
        if let Some(id) = id {
            if self.mesh.vertex(id).is_none() {
                return false;
            }
        }
        self.selected_vertex = id;
        true
    }

    /// Highlight exactly one face, or none.
    ///
    /// Highlighting a face also clears every vertex highlight; clearing the
    /// face highlight leaves vertices alone.
    pub fn highlight_face(&mut self, id: Option<FaceId>) -> bool {
        if let Some(id) = id {
            if self.mesh.face(id).is_none() {
                return false;
            }
        }
        for face in &mut self.mesh.faces {
            face.highlighted = Some(face.id) == id;
        }
        if id.is_some() {
            for vertex in &mut self.mesh.vertices {
                vertex.highlighted = false;
            }
        }
        true
    }

    /// Highlight exactly one vertex, or none. Face highlights are untouched.
    pub fn highlight_vertex(&mut self, id: Option<VertexId>) -> bool {
        if let Some(id) = id {
            if self.mesh.vertex(id).is_none() {
                return false;
            }
        }
        for vertex in &mut self.mesh.vertices {
            vertex.highlighted = Some(vertex.id) == id;
        }
        true
    }
}
