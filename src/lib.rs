//! Editing core of a raster image editor.
//!
//! [`modules::image_editor`] holds the linear edit [`History`] and the pure
//! [`Filter`]/[`Transform`] pipeline; [`Editor`] drives both the way the window
//! shell does, together with file I/O and persisted [`EditorSettings`].

#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod error;
pub mod modules;

pub use app::{Editor, SaveAction, SaveRequest};
pub use error::{EditorError, Result};
pub use modules::EditorModule;
pub use modules::image_editor::{
    ActionState, ChannelLayout, Filter, History, Position, Snapshot, SourceInfo, Transform, Update, ZoomState,
};
pub use modules::settings::EditorSettings;
