//! Pluggable facial-emotion classifier facade
//!
//! The model is an opaque external dependency: the contract is solely
//! bitmap in, dominant label plus per-label confidence scores out.

use image::RgbImage;

/// The seven labels the backing models emit, plus a fallback for anything
/// outside that set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmotionLabel {
    Angry,
    Disgust,
    Fear,
    Happy,
    Neutral,
    Sad,
    Surprise,
    Other(String),
}

/// Known labels in the model's class order (alphabetical, matching the
/// hub model's id2label config).
pub const EMOTION_CLASSES: [EmotionLabel; 7] = [
    EmotionLabel::Angry,
    EmotionLabel::Disgust,
    EmotionLabel::Fear,
    EmotionLabel::Happy,
    EmotionLabel::Neutral,
    EmotionLabel::Sad,
    EmotionLabel::Surprise,
];

impl EmotionLabel {
    pub fn as_str(&self) -> &str {
        match self {
            EmotionLabel::Angry => "angry",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Other(s) => s,
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification result: the dominant label and the confidence score
/// for each known label. Scores need not sum to exactly 1.
#[derive(Debug, Clone)]
pub struct Classification {
    pub dominant: EmotionLabel,
    pub scores: Vec<(EmotionLabel, f32)>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Only returned when face detection is enforced.
    #[error("no face detected in frame")]
    NoFaceDetected,

    #[error("emotion model failure: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Pluggable emotion classifier.
///
/// With `enforce_detection` disabled the classifier must still return a
/// best-effort label for blank or faceless frames; with it enabled it
/// fails with `NoFaceDetected` when no face is confidently located.
pub trait EmotionClassifier: Send + Sync {
    fn classify(
        &self,
        image: &RgbImage,
        enforce_detection: bool,
    ) -> Result<Classification, ClassifierError>;
}

mod fixture;
mod vit;

pub use fixture::FixtureClassifier;
pub use vit::VitEmotionClassifier;
