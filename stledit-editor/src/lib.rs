//! Interactive editing for stledit meshes
//!
//! This crate owns the mutable side of the editor:
//! - [`store`]: the authoritative mesh state and its mutation operations
//! - [`edges`]: wireframe derivation from the current faces
//! - [`selection`]: click-to-select and highlight coordination
//! - [`interaction`]: edit modes, the command enum and the [`Editor`]
//! - [`session`]: loading a model and holding the editor once it is ready
//! - [`render`]: per-frame snapshots and GPU-ready vertex buffers
//! - [`config`]: editor settings loaded from JSON

pub mod config;
pub mod store;
pub mod edges;
pub mod selection;
pub mod interaction;
pub mod session;
pub mod render;

pub use config::*;
pub use store::*;
pub use edges::*;
pub use selection::*;
pub use interaction::*;
pub use session::*;
pub use render::*;
