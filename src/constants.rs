//! Application constants

/// Maximum number of frames accepted per request
pub const MAX_FRAMES: usize = 100;

/// Maximum request body size (100 Base64 frames can get large)
pub const MAX_REQUEST_BODY_SIZE: usize = 64 * 1024 * 1024;

/// Brightness multiplier applied before classification
pub const BRIGHTNESS_FACTOR: f32 = 1.2;

/// Contrast multiplier applied before classification
pub const CONTRAST_FACTOR: f32 = 1.3;

/// Bilateral smoothing window radius (9px window)
pub const BILATERAL_RADIUS: u32 = 4;

/// Bilateral color-similarity sigma
pub const BILATERAL_SIGMA_COLOR: f32 = 75.0;

/// Bilateral spatial sigma
pub const BILATERAL_SIGMA_SPACE: f32 = 75.0;

/// Default directory for annotated output images
pub const DEFAULT_OUTPUT_DIR: &str = "output_images";

/// Hugging Face repo for the face-expression ViT (7 emotion classes)
pub const DEFAULT_MODEL_REPO: &str = "trpakov/vit-face-expression";

/// Default top-confidence floor used when face detection is enforced
pub const DEFAULT_MIN_FACE_CONFIDENCE: f32 = 0.30;
