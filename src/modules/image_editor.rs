//! Edit history and the transform/filter pipeline.
//!
//! The two halves are independent: [`Transform`] and [`Filter`] turn one
//! [`Snapshot`] into a fresh one, and [`History`] records whatever snapshots it
//! is handed. Callers glue them together (see [`crate::Editor`]).

mod ie_helpers;
mod ie_history;
mod ie_main;
mod ie_tools;

pub use ie_history::{ActionState, History, Listener, Position, Update};
pub use ie_main::{
    ChannelLayout, Snapshot, SourceInfo, ZoomState, color_mode,
    MAX_ZOOM, MIN_ZOOM, SUPPORTED_MODES, WHEEL_ZOOM_STEP, WINDOW_TITLE, ZOOM_STEP,
};
pub use ie_tools::{Filter, Transform, aspect_height, aspect_width, resize};
