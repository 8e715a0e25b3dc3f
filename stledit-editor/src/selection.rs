//! Selection and highlight coordination
//!
//! The store keeps independent face and vertex selection slots. The functions
//! here layer the click semantics on top: a single active selection, click
//! again to deselect, and highlight following selection.

use serde::{Deserialize, Serialize};
use stledit_core::{FaceId, VertexId};

use crate::store::MeshStore;

/// What the user currently has selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Face(FaceId),
    Vertex(VertexId),
}

/// Current selection as recorded in the store
pub fn current_selection(store: &MeshStore) -> Selection {
    match (store.selected_face(), store.selected_vertex()) {
        (Some(face), _) => Selection::Face(face),
        (None, Some(vertex)) => Selection::Vertex(vertex),
        (None, None) => Selection::None,
    }
}

/// Handle a click on a face.
///
/// Clicking the selected face deselects it and clears face highlights;
/// clicking any other face selects and highlights it, which also drops the
/// vertex selection and every vertex highlight. Unknown ids change nothing.
pub fn pick_face(store: &mut MeshStore, id: FaceId) -> Selection {
    if store.face(id).is_none() {
        return current_selection(store);
    }

    if store.selected_face() == Some(id) {
        store.set_selected_face(None);
        store.highlight_face(None);
    } else {
        store.set_selected_vertex(None);
        store.set_selected_face(Some(id));
        store.highlight_face(Some(id));
    }
    current_selection(store)
}

/// Handle a click on a vertex.
///
/// Mirrors [`pick_face`], except that face highlights survive: vertex
/// highlighting never clears them.
pub fn pick_vertex(store: &mut MeshStore, id: VertexId) -> Selection {
    if store.vertex(id).is_none() {
        return current_selection(store);
    }

    if store.selected_vertex() == Some(id) {
        store.set_selected_vertex(None);
        store.highlight_vertex(None);
    } else {
        store.set_selected_face(None);
        store.set_selected_vertex(Some(id));
        store.highlight_vertex(Some(id));
    }
    current_selection(store)
}

/// Drop any selection and every highlight, whatever the edit mode
pub fn clear_selection(store: &mut MeshStore) {
    store.set_selected_face(None);
    store.set_selected_vertex(None);
    store.highlight_face(None);
    store.highlight_vertex(None);
}
