use std::path::PathBuf;
use thiserror::Error;

pub type VisionResult<T> = Result<T, VisionError>;

/// Failures of the perception layer. Routine absence (a template below
/// threshold, an unreadable timer) is not an error and never shows up here.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Template directory {path:?} is unreadable: {source}")]
    TemplateDirUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Text recognizer '{binary}' is unavailable: {reason}")]
    RecognizerUnavailable { binary: String, reason: String },

    #[error("No template named '{0}' is loaded")]
    UnknownTemplate(String),

    #[error("Failed to decode screenshot: {0}")]
    FrameDecode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Region [{x},{y},{width},{height}] does not overlap the {frame_width}x{frame_height} frame")]
    EmptyRegion {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("Text recognition failed: {reason}")]
    Recognition { reason: String },
}

impl VisionError {
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            VisionError::TemplateDirUnreadable { .. } | VisionError::RecognizerUnavailable { .. }
        )
    }
}
