//! Edit modes, commands and the editor that dispatches them
//!
//! Every user action reaches the mesh as a [`Command`]. [`Editor::dispatch`]
//! is the single handler: it gates each command on the current [`EditMode`],
//! applies it through the store, and reports an [`Outcome`] so a front end
//! can tell an ignored click from an applied one.

use std::fmt;

use serde::{Deserialize, Serialize};
use stledit_core::{is_finite_point, Color, FaceId, MeshData, Point3f, Vector3f, VertexId};
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::EditorConfig;
use crate::edges::{EdgeCache, EdgeSegment};
use crate::render::RenderSnapshot;
use crate::selection::{self, Selection};
use crate::store::MeshStore;

/// What pointer input currently operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Face,
    Vertex,
    Edge,
}

impl EditMode {
    pub const ALL: [EditMode; 3] = [EditMode::Face, EditMode::Vertex, EditMode::Edge];

    /// Whether a click on an entity of `kind` selects it in this mode
    pub fn allows_pick(self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Face => self == EditMode::Face,
            EntityKind::Vertex => matches!(self, EditMode::Vertex | EditMode::Edge),
        }
    }

    /// Whether vertex markers are drawn and pickable
    pub fn shows_vertices(self) -> bool {
        matches!(self, EditMode::Vertex | EditMode::Edge)
    }

    /// Whether vertices can be moved, by drag or by axis value
    pub fn allows_move(self) -> bool {
        self == EditMode::Vertex
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditMode::Face => "face",
            EditMode::Vertex => "vertex",
            EditMode::Edge => "edge",
        };
        f.write_str(name)
    }
}

/// Kinds of entity the scene draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Face,
    Vertex,
}

/// Entity kinds drawn in `mode`. Faces are always drawn.
pub fn visible_kinds(mode: EditMode) -> &'static [EntityKind] {
    if mode.shows_vertices() {
        &[EntityKind::Face, EntityKind::Vertex]
    } else {
        &[EntityKind::Face]
    }
}

/// Entity under the pointer when a click lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PickTarget {
    Face(FaceId),
    Vertex(VertexId),
}

impl PickTarget {
    pub fn kind(self) -> EntityKind {
        match self {
            PickTarget::Face(_) => EntityKind::Face,
            PickTarget::Vertex(_) => EntityKind::Vertex,
        }
    }
}

/// Coordinate axis edited by a position slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// `point` with this axis replaced by `value`
    pub fn apply(self, mut point: Point3f, value: f32) -> Point3f {
        match self {
            Axis::X => point.x = value,
            Axis::Y => point.y = value,
            Axis::Z => point.z = value,
        }
        point
    }
}

/// A user action addressed to the mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Pick(PickTarget),
    Drag { vertex_id: VertexId, delta: Vector3f },
    SetColor { face_id: FaceId, color: Color },
    SetAxis { vertex_id: VertexId, axis: Axis, value: f32 },
    SwitchMode(EditMode),
    ClearSelection,
}

impl Command {
    /// Short name used in logs and rejection messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Pick(PickTarget::Face(_)) => "face pick",
            Command::Pick(PickTarget::Vertex(_)) => "vertex pick",
            Command::Drag { .. } => "drag",
            Command::SetColor { .. } => "set color",
            Command::SetAxis { .. } => "set axis",
            Command::SwitchMode(_) => "switch mode",
            Command::ClearSelection => "clear selection",
        }
    }
}

/// Why a command was not applied
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("{command} is not available in {mode} mode")]
    WrongMode { command: &'static str, mode: EditMode },

    #[error("unknown face {0}")]
    UnknownFace(FaceId),

    #[error("unknown vertex {0}")]
    UnknownVertex(VertexId),

    #[error("{0} must be finite")]
    InvalidValue(&'static str),

    #[error("no drag gesture in progress")]
    NoDrag,

    #[error("no model is loaded")]
    NotReady,
}

/// Result of dispatching a command
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Outcome {
    Applied,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Applied => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }
}

impl From<Result<(), Rejection>> for Outcome {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Outcome::Applied,
            Err(reason) => Outcome::Rejected(reason),
        }
    }
}

/// Pointer drag on one vertex.
///
/// Movement is cumulative since the pointer went down, so each tick places
/// the vertex relative to where it started rather than where the last tick
/// left it. Screen y grows downward, world y upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub vertex: VertexId,
    pub origin: Point3f,
    pub sensitivity: f32,
}

impl DragGesture {
    pub fn new(vertex: VertexId, origin: Point3f, sensitivity: f32) -> Self {
        Self {
            vertex,
            origin,
            sensitivity,
        }
    }

    /// World position for a cumulative pointer movement in pixels
    pub fn target(&self, movement: [f32; 2]) -> Point3f {
        let [mx, my] = movement;
        self.origin + Vector3f::new(mx * self.sensitivity, -my * self.sensitivity, 0.0)
    }
}

/// An editing session over one loaded mesh
#[derive(Debug)]
pub struct Editor {
    store: MeshStore,
    mode: EditMode,
    config: EditorConfig,
    edges: EdgeCache,
    drag: Option<DragGesture>,
}

impl Editor {
    pub fn new(mesh: MeshData, config: EditorConfig) -> Self {
        let store = MeshStore::new(mesh).with_scale_epsilon(config.scale_epsilon);
        let mut edges = EdgeCache::new();
        edges.edges(&store);
        Self {
            store,
            mode: config.initial_mode,
            config,
            edges,
            drag: None,
        }
    }

    pub fn store(&self) -> &MeshStore {
        &self.store
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Swatches the color panel offers for [`Editor::set_color`]
    pub fn palette(&self) -> &[Color] {
        &self.config.palette
    }

    pub fn selection(&self) -> Selection {
        selection::current_selection(&self.store)
    }

    /// The active drag gesture, if any
    pub fn drag(&self) -> Option<&DragGesture> {
        self.drag.as_ref()
    }

    /// Unique wireframe edges of the current geometry
    pub fn edges(&self) -> &[EdgeSegment] {
        self.edges.cached()
    }

    /// Everything a renderer needs for one frame
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(self)
    }

    /// Apply one command, or explain why it was refused
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        let outcome = Outcome::from(self.apply(command));
        match &outcome {
            Outcome::Applied => trace!(command = command.name(), mode = %self.mode, "applied"),
            Outcome::Rejected(reason) => {
                debug!(command = command.name(), mode = %self.mode, %reason, "rejected")
            }
        }
        outcome
    }

    fn apply(&mut self, command: Command) -> Result<(), Rejection> {
        match command {
            Command::Pick(target) => {
                self.require(Gate::Pick(target.kind()), command.name())?;
                match target {
                    PickTarget::Face(id) => {
                        self.known_face(id)?;
                        selection::pick_face(&mut self.store, id);
                    }
                    PickTarget::Vertex(id) => {
                        self.known_vertex(id)?;
                        selection::pick_vertex(&mut self.store, id);
                    }
                }
                Ok(())
            }
            Command::Drag { vertex_id, delta } => {
                self.require(Gate::Move, command.name())?;
                if !delta.iter().all(|c| c.is_finite()) {
                    return Err(Rejection::InvalidValue("drag delta"));
                }
                let position = self.known_vertex(vertex_id)? + delta;
                self.move_vertex(vertex_id, position)
            }
            Command::SetColor { face_id, color } => {
                if self.store.set_face_color(face_id, color) {
                    Ok(())
                } else {
                    Err(Rejection::UnknownFace(face_id))
                }
            }
            Command::SetAxis { vertex_id, axis, value } => {
                self.require(Gate::Move, command.name())?;
                if !value.is_finite() {
                    return Err(Rejection::InvalidValue("axis value"));
                }
                let position = axis.apply(self.known_vertex(vertex_id)?, value);
                self.move_vertex(vertex_id, position)
            }
            Command::SwitchMode(mode) => {
                if !mode.allows_move() {
                    self.drag = None;
                }
                self.mode = mode;
                Ok(())
            }
            Command::ClearSelection => {
                selection::clear_selection(&mut self.store);
                Ok(())
            }
        }
    }

    fn require(&self, gate: Gate, command: &'static str) -> Result<(), Rejection> {
        let allowed = match gate {
            Gate::Pick(kind) => self.mode.allows_pick(kind),
            Gate::Move => self.mode.allows_move(),
        };
        if allowed {
            Ok(())
        } else {
            Err(Rejection::WrongMode {
                command,
                mode: self.mode,
            })
        }
    }

    fn known_face(&self, id: FaceId) -> Result<(), Rejection> {
        self.store.face(id).map(|_| ()).ok_or(Rejection::UnknownFace(id))
    }

    fn known_vertex(&self, id: VertexId) -> Result<Point3f, Rejection> {
        self.store
            .vertex(id)
            .map(|v| v.position)
            .ok_or(Rejection::UnknownVertex(id))
    }

    fn move_vertex(&mut self, id: VertexId, position: Point3f) -> Result<(), Rejection> {
        if !is_finite_point(&position) {
            return Err(Rejection::InvalidValue("vertex position"));
        }
        if self.store.vertex(id).is_none() {
            return Err(Rejection::UnknownVertex(id));
        }
        if !self.store.set_vertex_position(id, position) {
            return Err(Rejection::InvalidValue("scaled vertex positions"));
        }
        self.edges.edges(&self.store);
        Ok(())
    }

    /// Pick a face
    pub fn pick_face(&mut self, id: FaceId) -> Outcome {
        self.dispatch(Command::Pick(PickTarget::Face(id)))
    }

    /// Pick a vertex
    pub fn pick_vertex(&mut self, id: VertexId) -> Outcome {
        self.dispatch(Command::Pick(PickTarget::Vertex(id)))
    }

    /// Recolor a face
    pub fn set_color(&mut self, face_id: FaceId, color: Color) -> Outcome {
        self.dispatch(Command::SetColor { face_id, color })
    }

    /// Set one coordinate of a vertex
    pub fn set_axis(&mut self, vertex_id: VertexId, axis: Axis, value: f32) -> Outcome {
        self.dispatch(Command::SetAxis { vertex_id, axis, value })
    }

    /// Change the edit mode. Selection is kept.
    pub fn switch_mode(&mut self, mode: EditMode) -> Outcome {
        self.dispatch(Command::SwitchMode(mode))
    }

    /// Start dragging a vertex from its current position
    pub fn begin_drag(&mut self, vertex_id: VertexId) -> Outcome {
        let result = self.start_drag(vertex_id);
        self.log_gesture(result, "begin drag")
    }

    fn start_drag(&mut self, vertex_id: VertexId) -> Result<(), Rejection> {
        self.require(Gate::Move, "drag")?;
        let origin = self.known_vertex(vertex_id)?;
        self.drag = Some(DragGesture::new(vertex_id, origin, self.config.drag_sensitivity));
        debug!(vertex = %vertex_id, ?origin, "drag started");
        Ok(())
    }

    /// Move the dragged vertex for a cumulative pointer movement
    pub fn update_drag(&mut self, movement: [f32; 2]) -> Outcome {
        let result = match self.drag {
            Some(gesture) => self.move_vertex(gesture.vertex, gesture.target(movement)),
            None => Err(Rejection::NoDrag),
        };
        self.log_gesture(result, "update drag")
    }

    /// Release the pointer. Returns the gesture that ended, if any.
    pub fn end_drag(&mut self) -> Option<DragGesture> {
        let gesture = self.drag.take();
        if let Some(gesture) = &gesture {
            debug!(vertex = %gesture.vertex, "drag ended");
        }
        gesture
    }

    fn log_gesture(&self, result: Result<(), Rejection>, action: &'static str) -> Outcome {
        if let Err(reason) = &result {
            debug!(action, mode = %self.mode, %reason, "rejected");
        }
        result.into()
    }
}

/// Mode requirement of a command
#[derive(Debug, Clone, Copy)]
enum Gate {
    Pick(EntityKind),
    Move,
}
