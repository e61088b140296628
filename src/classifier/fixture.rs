use image::RgbImage;

use super::{Classification, ClassifierError, EMOTION_CLASSES, EmotionClassifier};

/// Deterministic classifier for tests or opt-out runs without the model
/// download.
///
/// The label is derived from the top-left pixel: class index = red
/// channel mod 7, in model class order (angry, disgust, fear, happy,
/// neutral, sad, surprise). A pure-white top-left pixel stands in for a
/// faceless frame: with `enforce_detection` set it yields
/// `NoFaceDetected`, otherwise it is best-effort labeled like any other.
pub struct FixtureClassifier;

impl FixtureClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FixtureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionClassifier for FixtureClassifier {
    fn classify(
        &self,
        image: &RgbImage,
        enforce_detection: bool,
    ) -> Result<Classification, ClassifierError> {
        let probe = image
            .pixels()
            .next()
            .map(|p| p.0)
            .unwrap_or([0, 0, 0]);

        if enforce_detection && probe == [255, 255, 255] {
            return Err(ClassifierError::NoFaceDetected);
        }

        let index = probe[0] as usize % EMOTION_CLASSES.len();
        let dominant = EMOTION_CLASSES[index].clone();
        let scores = EMOTION_CLASSES
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), if i == index { 1.0 } else { 0.0 }))
            .collect();

        Ok(Classification { dominant, scores })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::EmotionLabel;
    use image::Rgb;

    #[test]
    fn test_label_follows_red_channel() {
        let img = RgbImage::from_pixel(2, 2, Rgb([3, 0, 0]));
        let result = FixtureClassifier::new().classify(&img, false).unwrap();
        assert_eq!(result.dominant, EmotionLabel::Happy);
        assert_eq!(result.scores.len(), 7);
    }

    #[test]
    fn test_white_frame_fails_only_when_enforced() {
        let img = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
        let classifier = FixtureClassifier::new();

        let err = classifier.classify(&img, true).unwrap_err();
        assert!(matches!(err, ClassifierError::NoFaceDetected));

        // Best-effort label when enforcement is off (255 % 7 == 3, happy)
        let ok = classifier.classify(&img, false).unwrap();
        assert_eq!(ok.dominant, EmotionLabel::Happy);
    }
}
