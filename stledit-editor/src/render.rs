//! Render boundary
//!
//! A renderer never touches the store. Once per frame it takes a
//! [`RenderSnapshot`] and either serializes it for a remote view or flattens
//! it into the `#[repr(C)]` vertex buffers below for GPU upload.

use bytemuck::{Pod, Zeroable};
use serde::Serialize;
use stledit_core::{Color, Face, FaceId, Vertex, VertexId};

use crate::config::EditorConfig;
use crate::edges::EdgeSegment;
use crate::interaction::{EditMode, Editor};

/// Fill of the selected face and selected vertex marker
pub const SELECTED_COLOR: Color = Color::rgb(0xfb, 0xbf, 0x24);
/// Fill of highlighted faces and vertex markers
pub const HIGHLIGHT_COLOR: Color = Color::rgb(0x60, 0xa5, 0xfa);
/// Fill of the vertex being dragged
pub const DRAGGING_COLOR: Color = Color::rgb(0xef, 0x44, 0x44);
/// Fill of an idle vertex marker
pub const MARKER_COLOR: Color = Color::rgb(0x8b, 0x5c, 0xf6);
/// Wireframe line color
pub const EDGE_COLOR: Color = Color::rgb(0x64, 0x74, 0x8b);
/// Wireframe line opacity
pub const EDGE_OPACITY: f32 = 0.4;

pub const FLAG_HIGHLIGHTED: u32 = 1;
pub const FLAG_SELECTED: u32 = 1 << 1;
pub const FLAG_DRAGGING: u32 = 1 << 2;

/// Face opacity in `mode`; faces recede while vertices are being edited
pub fn face_opacity(mode: EditMode) -> f32 {
    if mode == EditMode::Face {
        0.9
    } else {
        0.7
    }
}

/// One corner of a face, ready for a triangle-list draw
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
    pub flags: u32,
}

/// One end of a wireframe segment, for a line-list draw
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub _padding: f32,
}

/// Center of a vertex marker, drawn as an instanced sphere
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MarkerVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub flags: u32,
    pub _padding: u32,
}

/// Everything drawn in one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub mode: EditMode,
    pub faces: Vec<Face>,
    /// Empty unless the mode shows vertex markers
    pub vertices: Vec<Vertex>,
    pub edges: Vec<EdgeSegment>,
    pub selected_face: Option<FaceId>,
    pub selected_vertex: Option<VertexId>,
    pub dragging: Option<VertexId>,
    pub face_opacity: f32,
    /// Swatches for the color panel
    pub palette: Vec<Color>,
}

impl RenderSnapshot {
    /// Snapshot with nothing to draw, used before a model is ready
    pub fn empty(config: &EditorConfig) -> Self {
        let mode = config.initial_mode;
        Self {
            mode,
            faces: Vec::new(),
            vertices: Vec::new(),
            edges: Vec::new(),
            selected_face: None,
            selected_vertex: None,
            dragging: None,
            face_opacity: face_opacity(mode),
            palette: config.palette.clone(),
        }
    }

    /// Copy the drawable state out of an editor
    pub fn capture(editor: &Editor) -> Self {
        let store = editor.store();
        let mode = editor.mode();
        let vertices = if mode.shows_vertices() {
            store.vertices().to_vec()
        } else {
            Vec::new()
        };
        Self {
            mode,
            faces: store.faces().to_vec(),
            vertices,
            edges: editor.edges().to_vec(),
            selected_face: store.selected_face(),
            selected_vertex: store.selected_vertex(),
            dragging: editor.drag().map(|g| g.vertex),
            face_opacity: face_opacity(mode),
            palette: editor.palette().to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Serialize for a view running outside this process
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn face_flags(&self, face: &Face) -> u32 {
        let mut flags = 0;
        if face.highlighted {
            flags |= FLAG_HIGHLIGHTED;
        }
        if self.selected_face == Some(face.id) {
            flags |= FLAG_SELECTED;
        }
        flags
    }

    fn vertex_flags(&self, vertex: &Vertex) -> u32 {
        let mut flags = 0;
        if vertex.highlighted {
            flags |= FLAG_HIGHLIGHTED;
        }
        if self.selected_vertex == Some(vertex.id) {
            flags |= FLAG_SELECTED;
        }
        if self.dragging == Some(vertex.id) {
            flags |= FLAG_DRAGGING;
        }
        flags
    }

    /// Three vertices per face, flat shaded with the face normal
    pub fn face_buffer(&self) -> Vec<FaceVertex> {
        let mut buffer = Vec::with_capacity(self.faces.len() * 3);
        for face in &self.faces {
            let flags = self.face_flags(face);
            let color = display_color(flags, face.color).to_rgb_f32();
            let normal = [face.normal.x, face.normal.y, face.normal.z];
            for corner in &face.vertices {
                buffer.push(FaceVertex {
                    position: [corner.x, corner.y, corner.z],
                    normal,
                    color,
                    flags,
                });
            }
        }
        buffer
    }

    /// Two vertices per wireframe segment
    pub fn edge_buffer(&self) -> Vec<LineVertex> {
        self.edges
            .iter()
            .flat_map(|edge| [edge.start, edge.end])
            .map(|p| LineVertex {
                position: [p.x, p.y, p.z],
                _padding: 0.0,
            })
            .collect()
    }

    /// One marker per visible vertex
    pub fn vertex_buffer(&self) -> Vec<MarkerVertex> {
        self.vertices
            .iter()
            .map(|vertex| {
                let flags = self.vertex_flags(vertex);
                let color = if flags & FLAG_DRAGGING != 0 {
                    DRAGGING_COLOR
                } else {
                    display_color(flags, MARKER_COLOR)
                };
                MarkerVertex {
                    position: [vertex.position.x, vertex.position.y, vertex.position.z],
                    color: color.to_rgb_f32(),
                    flags,
                    _padding: 0,
                }
            })
            .collect()
    }
}

/// Selection beats highlight, highlight beats the base color
fn display_color(flags: u32, base: Color) -> Color {
    if flags & FLAG_SELECTED != 0 {
        SELECTED_COLOR
    } else if flags & FLAG_HIGHLIGHTED != 0 {
        HIGHLIGHT_COLOR
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stledit_core::{build_mesh, cube_triangles, DEFAULT_FACE_COLOR, PALETTE};

    fn editor(mode: EditMode) -> Editor {
        let mesh = build_mesh(&cube_triangles(1.0)).unwrap();
        Editor::new(mesh, EditorConfig::default().with_initial_mode(mode))
    }

    #[test]
    fn test_face_buffer_layout() {
        let snapshot = editor(EditMode::Face).snapshot();
        let buffer = snapshot.face_buffer();
        assert_eq!(buffer.len(), 36);
        assert_eq!(std::mem::size_of::<FaceVertex>(), 40);

        let bytes: &[u8] = bytemuck::cast_slice(&buffer);
        assert_eq!(bytes.len(), 36 * 40);
        let round: &[FaceVertex] = bytemuck::cast_slice(bytes);
        assert_eq!(round[7], buffer[7]);

        assert!(buffer.iter().all(|v| v.color == DEFAULT_FACE_COLOR.to_rgb_f32()));
        assert!(buffer.iter().all(|v| v.flags == 0));
    }

    #[test]
    fn test_selected_face_colors() {
        let mut editor = editor(EditMode::Face);
        assert!(editor.pick_face(FaceId(1)).is_applied());
        let buffer = editor.snapshot().face_buffer();

        for v in &buffer[3..6] {
            assert_eq!(v.flags, FLAG_HIGHLIGHTED | FLAG_SELECTED);
            assert_eq!(v.color, SELECTED_COLOR.to_rgb_f32());
        }
        assert_eq!(buffer[0].flags, 0);
    }

    #[test]
    fn test_edge_buffer() {
        let snapshot = editor(EditMode::Edge).snapshot();
        let buffer = snapshot.edge_buffer();
        assert_eq!(buffer.len(), 36);
        assert_eq!(bytemuck::cast_slice::<LineVertex, u8>(&buffer).len(), 36 * 16);
        let first = snapshot.edges[0].start;
        assert_eq!(buffer[0].position, [first.x, first.y, first.z]);
    }

    #[test]
    fn test_vertices_only_in_vertex_modes() {
        assert!(editor(EditMode::Face).snapshot().vertex_buffer().is_empty());
        assert_eq!(editor(EditMode::Vertex).snapshot().vertex_buffer().len(), 8);
        assert_eq!(editor(EditMode::Edge).snapshot().vertices.len(), 8);
    }

    #[test]
    fn test_dragging_marker() {
        let mut editor = editor(EditMode::Vertex);
        assert!(editor.pick_vertex(VertexId(2)).is_applied());
        assert!(editor.begin_drag(VertexId(2)).is_applied());
        let markers = editor.snapshot().vertex_buffer();

        let marker = &markers[2];
        assert_eq!(marker.flags, FLAG_HIGHLIGHTED | FLAG_SELECTED | FLAG_DRAGGING);
        assert_eq!(marker.color, DRAGGING_COLOR.to_rgb_f32());
        assert_eq!(markers[0].color, MARKER_COLOR.to_rgb_f32());
    }

    #[test]
    fn test_face_opacity() {
        assert_eq!(face_opacity(EditMode::Face), 0.9);
        assert_eq!(face_opacity(EditMode::Vertex), 0.7);
        assert_eq!(editor(EditMode::Edge).snapshot().face_opacity, 0.7);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = RenderSnapshot::empty(&EditorConfig::default());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.mode, EditMode::Face);
        assert_eq!(snapshot.palette.len(), 16);
        assert!(snapshot.face_buffer().is_empty());
        assert!(snapshot.edge_buffer().is_empty());
    }

    #[test]
    fn test_json_shape() {
        let mut editor = editor(EditMode::Face);
        assert!(editor.pick_face(FaceId(0)).is_applied());
        let json: serde_json::Value =
            serde_json::from_str(&editor.snapshot().to_json().unwrap()).unwrap();

        assert_eq!(json["mode"], "face");
        assert_eq!(json["selected_face"], 0);
        assert_eq!(json["faces"].as_array().unwrap().len(), 12);
        assert_eq!(json["faces"][0]["color"], "#9ca3af");
        assert_eq!(json["edges"].as_array().unwrap().len(), 18);
        assert!(json["selected_vertex"].is_null());
        assert_eq!(json["palette"].as_array().unwrap().len(), 16);
        assert_eq!(json["palette"][0], PALETTE[0].to_string());
    }

    #[test]
    fn test_custom_palette_reaches_snapshot() {
        let mesh = build_mesh(&cube_triangles(1.0)).unwrap();
        let mut config = EditorConfig::default();
        config.palette = vec![Color::rgb(1, 2, 3), Color::rgb(4, 5, 6)];
        let editor = Editor::new(mesh, config.clone());
        assert_eq!(editor.palette(), config.palette.as_slice());
        assert_eq!(editor.snapshot().palette, config.palette);
    }
}
