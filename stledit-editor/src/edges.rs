//! Wireframe derivation
//!
//! Edges are not stored. They are derived from the current faces: every pair
//! of consecutive corners (including last to first) is a segment, and two
//! segments are the same edge when their endpoints match at six decimal
//! places in either order. Shared edges between neighbouring triangles
//! therefore appear once.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use stledit_core::{Face, Point3f, QuantizedPoint};

use crate::store::MeshStore;

/// One wireframe segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSegment {
    pub start: Point3f,
    pub end: Point3f,
}

/// Winding-independent identity of a segment
fn edge_key(a: &Point3f, b: &Point3f) -> (QuantizedPoint, QuantizedPoint) {
    let (ka, kb) = (QuantizedPoint::new(a), QuantizedPoint::new(b));
    if ka <= kb {
        (ka, kb)
    } else {
        (kb, ka)
    }
}

/// Unique edges of the given faces, in first-seen order
pub fn derive_edges(faces: &[Face]) -> Vec<EdgeSegment> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();

    for face in faces {
        let corners = &face.vertices;
        for i in 0..corners.len() {
            let start = corners[i];
            let end = corners[(i + 1) % corners.len()];
            if seen.insert(edge_key(&start, &end)) {
                edges.push(EdgeSegment { start, end });
            }
        }
    }
    edges
}

/// Memoized wireframe, rebuilt only when the store's geometry revision moves
#[derive(Debug, Default)]
pub struct EdgeCache {
    revision: Option<u64>,
    edges: Vec<EdgeSegment>,
}

impl EdgeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current edges of `store`, recomputed if its geometry changed.
    ///
    /// A cache must only ever be used with one store.
    pub fn edges(&mut self, store: &MeshStore) -> &[EdgeSegment] {
        if self.revision != Some(store.revision()) {
            self.edges = derive_edges(store.faces());
            self.revision = Some(store.revision());
        }
        &self.edges
    }

    /// Edges from the last refresh, possibly stale
    pub fn cached(&self) -> &[EdgeSegment] {
        &self.edges
    }

    /// Whether the cached edges were built from the store's current geometry
    pub fn is_current(&self, store: &MeshStore) -> bool {
        self.revision == Some(store.revision())
    }

    /// Drop the cached edges
    pub fn invalidate(&mut self) {
        self.revision = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stledit_core::{build_mesh, cube_triangles, Triangle};

    fn cube_faces() -> Vec<Face> {
        build_mesh(&cube_triangles(1.0)).unwrap().faces
    }

    #[test]
    fn test_cube_has_eighteen_edges() {
        let edges = derive_edges(&cube_faces());
        // 12 box edges plus one diagonal per square side
        assert_eq!(edges.len(), 18);

        let diagonals = edges
            .iter()
            .filter(|e| {
                let d = e.end - e.start;
                d.iter().filter(|c| c.abs() > 1e-6).count() == 2
            })
            .count();
        assert_eq!(diagonals, 6);
    }

    #[test]
    fn test_reversed_winding_is_same_edge() {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(1.0, 0.0, 0.0);
        let c = Point3f::new(0.0, 1.0, 0.0);
        let d = Point3f::new(1.0, 1.0, 0.0);
        let mesh = build_mesh(&[Triangle::new(a, b, c), Triangle::new(c, b, d)]).unwrap();

        let edges = derive_edges(&mesh.faces);
        assert_eq!(edges.len(), 5);
        // first occurrence wins and keeps its own direction
        assert_eq!(edges[1], EdgeSegment { start: b, end: c });
    }

    #[test]
    fn test_includes_wraparound_edge() {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(1.0, 0.0, 0.0);
        let c = Point3f::new(0.0, 1.0, 0.0);
        let mesh = build_mesh(&[Triangle::new(a, b, c)]).unwrap();

        let edges = derive_edges(&mesh.faces);
        assert_eq!(
            edges,
            vec![
                EdgeSegment { start: a, end: b },
                EdgeSegment { start: b, end: c },
                EdgeSegment { start: c, end: a },
            ]
        );
    }

    #[test]
    fn test_near_equal_endpoints_dedup() {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(1.0, 0.0, 0.0);
        let b_noisy = Point3f::new(1.000_000_1, 0.0, 0.0);
        let c = Point3f::new(0.0, 1.0, 0.0);
        let d = Point3f::new(0.0, -1.0, 0.0);
        let mut faces = build_mesh(&[Triangle::new(a, b, c), Triangle::new(b, a, d)])
            .unwrap()
            .faces;
        // simulate drift in one face's cached corner
        faces[1].vertices[0] = b_noisy;

        assert_eq!(derive_edges(&faces).len(), 5);
    }

    #[test]
    fn test_empty_faces() {
        assert!(derive_edges(&[]).is_empty());
    }

    #[test]
    fn test_cache_tracks_revision() {
        let mut store = MeshStore::new(build_mesh(&cube_triangles(1.0)).unwrap());
        let mut cache = EdgeCache::new();
        let before = cache.edges(&store).to_vec();
        assert_eq!(before.len(), 18);

        let corner = store
            .vertices()
            .iter()
            .find(|v| v.position == Point3f::new(1.0, 1.0, 1.0))
            .map(|v| v.id)
            .unwrap();
        store.set_vertex_position(corner, Point3f::new(3.0, 1.0, 1.0));

        assert!(!cache.is_current(&store));
        let after = cache.edges(&store).to_vec();
        assert_eq!(after.len(), 18);
        assert_ne!(before, after);
        assert!(after.iter().all(|e| e.start.x.abs() == 3.0 && e.end.x.abs() == 3.0));

        assert!(cache.is_current(&store));
        cache.invalidate();
        assert!(!cache.is_current(&store));
        assert_eq!(cache.edges(&store), after.as_slice());
        assert_eq!(cache.cached(), after.as_slice());
    }
}
