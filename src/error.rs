//! Error taxonomy for batch validation and per-frame processing

use crate::classifier::ClassifierError;
use crate::constants::MAX_FRAMES;

/// Request-level validation failures. These abort the whole request with
/// a 400 before any frame is processed.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("no Base64 images provided")]
    EmptyBatch,

    #[error("frame count exceeds the limit of {}", MAX_FRAMES)]
    TooManyFrames,
}

/// Per-frame pipeline failures. A failed frame becomes an error entry in
/// the result list; it never aborts the rest of the batch.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid Base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unreadable image data: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("failed to persist annotated image: {0}")]
    Io(String),

    #[error("frame task aborted")]
    Aborted,
}
