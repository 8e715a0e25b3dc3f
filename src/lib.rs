//! # stledit
//!
//! An interactive editing engine for small triangulated solids loaded from
//! STL files.
//!
//! This is the umbrella crate that provides convenient access to all stledit
//! functionality. You can use this crate to get everything in one place, or
//! use individual crates for more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Shared-vertex mesh, colors, typed ids and the triangle loader
//! - **I/O**: ASCII and binary STL parsing
//! - **Editor**: Mesh store, selection, edit modes, commands and render snapshots
//!
//! ## Quick Start
//!
//! ```rust
//! use stledit::prelude::*;
//!
//! let mesh = build_mesh(&cube_triangles(1.0)).unwrap();
//! let mut editor = Editor::new(mesh, EditorConfig::default());
//!
//! assert!(editor.pick_face(FaceId(0)).is_applied());
//! assert!(editor.switch_mode(EditMode::Vertex).is_applied());
//! assert!(editor.set_axis(VertexId(0), Axis::X, 2.0).is_applied());
//! assert_eq!(editor.edges().len(), 18);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables io and editor
//! - `io`: STL file support
//! - `editor`: Interactive editing

// Re-export core functionality
pub use stledit_core::*;

// Re-export sub-crates
#[cfg(feature = "io")]
pub use stledit_io as io;

#[cfg(feature = "editor")]
pub use stledit_editor as editor;

/// Convenient imports for common use cases
pub mod prelude {
    pub use stledit_core::*;

    #[cfg(feature = "io")]
    pub use stledit_io::*;

    #[cfg(feature = "editor")]
    pub use stledit_editor::*;
}
