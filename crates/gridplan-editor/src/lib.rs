//! Gridplan Editor -- interactive editing on top of a gridplan layout.
//!
//! - [`draw::PipelineDraw`] -- the drag-to-draw belt state machine.
//! - [`editor::Editor`] -- tool mode, selection, moves and previews around
//!   a [`gridplan_spatial::Layout`].
//! - [`config::EditorConfig`] -- grid bounds and power rules from TOML.
//! - [`persist`] -- JSON scene files.

pub mod config;
pub mod draw;
pub mod editor;
pub mod error;
pub mod persist;

pub use config::{EditorConfig, GridConfig};
pub use draw::{DrawState, DrawStep, PipelineDraw};
pub use editor::{ClickOutcome, Editor, MoveTarget, Preview, Selection, Tool};
pub use error::{EditError, EditorError};
pub use persist::{load_scene, save_scene, scene_from_json, scene_to_json};
