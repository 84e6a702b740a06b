use image::ImageError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the editing core.
///
/// Every variant is recoverable at the call site. Operations that fail never
/// leave the history in a partially mutated state.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("failed to decode image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("failed to write image {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("unsupported color mode {mode}: only RGB and RGBA images can be edited")]
    UnsupportedMode { mode: String },

    #[error("invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("failed to access settings file: {0}")]
    SettingsIo(#[from] std::io::Error),

    #[error("failed to encode settings: {0}")]
    SettingsFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;
