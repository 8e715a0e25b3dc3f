//! Session lifecycle
//!
//! A session starts out `Loading`, then either becomes `Ready` with an
//! [`Editor`] over the parsed model or ends `Failed`. There is no retry and
//! no way back: a failed session stays empty until it is dropped.

use std::path::Path;

use stledit_core::{build_mesh_with_options, Error, LoadError, LoadOptions, MeshData};
use tracing::{error, info};

use crate::config::EditorConfig;
use crate::interaction::{Command, Editor, Outcome, Rejection};
use crate::render::RenderSnapshot;

/// Where the session is in its lifecycle
#[derive(Debug)]
pub enum SessionState {
    Loading,
    Ready(Box<Editor>),
    Failed(LoadError),
}

/// Owner of the editor for one opened model
#[derive(Debug)]
pub struct Session {
    config: EditorConfig,
    state: SessionState,
}

fn parse(bytes: &[u8], options: &LoadOptions) -> Result<MeshData, LoadError> {
    let triangles = stledit_io::parse_model(bytes)?;
    build_mesh_with_options(&triangles, options)
}

impl Session {
    /// Start a session in the `Loading` state; fails if `config` does not
    /// validate
    pub fn new(config: EditorConfig) -> stledit_core::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: SessionState::Loading,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    pub fn editor(&self) -> Option<&Editor> {
        match &self.state {
            SessionState::Ready(editor) => Some(editor.as_ref()),
            _ => None,
        }
    }

    pub fn editor_mut(&mut self) -> Option<&mut Editor> {
        match &mut self.state {
            SessionState::Ready(editor) => Some(editor.as_mut()),
            _ => None,
        }
    }

    /// The load error, if loading failed
    pub fn failure(&self) -> Option<&LoadError> {
        match &self.state {
            SessionState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Settle the session with the result of a load.
    ///
    /// Only the first result counts; a session that already left `Loading`
    /// ignores later ones.
    pub fn finish_load(&mut self, result: Result<MeshData, LoadError>) -> &SessionState {
        if !matches!(self.state, SessionState::Loading) {
            return &self.state;
        }
        self.state = match result {
            Ok(mesh) => {
                info!(
                    faces = mesh.face_count(),
                    vertices = mesh.vertex_count(),
                    "model loaded"
                );
                SessionState::Ready(Box::new(Editor::new(mesh, self.config.clone())))
            }
            Err(err) => {
                error!(error = %err, "failed to load model");
                SessionState::Failed(err)
            }
        };
        &self.state
    }

    /// Parse a model already held in memory
    pub fn load_bytes(&mut self, bytes: &[u8]) -> &SessionState {
        let result = parse(bytes, &self.config.load_options());
        self.finish_load(result)
    }

    /// Read and parse a model file without blocking the async runtime
    pub async fn load_path<P: AsRef<Path>>(&mut self, path: P) -> &SessionState {
        let path = path.as_ref();
        info!(path = %path.display(), "loading model");
        let result = match tokio::fs::read(path).await {
            Ok(bytes) => {
                let options = self.config.load_options();
                tokio::task::spawn_blocking(move || parse(&bytes, &options))
                    .await
                    .unwrap_or_else(|join| Err(LoadError::Source(Error::Io(std::io::Error::other(join)))))
            }
            Err(err) => Err(LoadError::Source(Error::Io(err))),
        };
        self.finish_load(result)
    }

    /// Dispatch to the editor, or reject while no model is ready
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        match self.editor_mut() {
            Some(editor) => editor.dispatch(command),
            None => Outcome::Rejected(Rejection::NotReady),
        }
    }

    /// Current frame; empty while loading or after a failure
    pub fn snapshot(&self) -> RenderSnapshot {
        match self.editor() {
            Some(editor) => editor.snapshot(),
            None => RenderSnapshot::empty(&self.config),
        }
    }
}
