//! Emotion label to binary sentiment mapping

use crate::classifier::EmotionLabel;

/// Coarse sentiment bucket derived from a dominant emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    /// Numeric code used on the wire: 0 = positive, 1 = negative
    pub fn code(self) -> u8 {
        match self {
            Sentiment::Positive => 0,
            Sentiment::Negative => 1,
        }
    }

    /// Per-frame category string
    pub fn category(self) -> &'static str {
        match self {
            Sentiment::Positive => "positiva",
            Sentiment::Negative => "negativa",
        }
    }

    /// Aggregate verdict string
    pub fn verdict_label(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positivo",
            Sentiment::Negative => "Negativo",
        }
    }
}

/// Map a dominant emotion to its sentiment bucket.
///
/// Labels outside the known set fall back to positive.
pub fn sentiment_for(label: &EmotionLabel) -> Sentiment {
    match label {
        EmotionLabel::Happy | EmotionLabel::Surprise | EmotionLabel::Neutral => {
            Sentiment::Positive
        }
        EmotionLabel::Sad
        | EmotionLabel::Angry
        | EmotionLabel::Fear
        | EmotionLabel::Disgust => Sentiment::Negative,
        EmotionLabel::Other(_) => Sentiment::Positive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_table() {
        let positive = [
            EmotionLabel::Happy,
            EmotionLabel::Surprise,
            EmotionLabel::Neutral,
        ];
        let negative = [
            EmotionLabel::Sad,
            EmotionLabel::Angry,
            EmotionLabel::Fear,
            EmotionLabel::Disgust,
        ];

        for label in positive {
            let s = sentiment_for(&label);
            assert_eq!(s, Sentiment::Positive, "{label:?}");
            assert_eq!(s.code(), 0);
            assert_eq!(s.category(), "positiva");
        }
        for label in negative {
            let s = sentiment_for(&label);
            assert_eq!(s, Sentiment::Negative, "{label:?}");
            assert_eq!(s.code(), 1);
            assert_eq!(s.category(), "negativa");
        }
    }

    #[test]
    fn test_unknown_label_defaults_to_positive() {
        let label = EmotionLabel::Other("contempt".to_string());
        assert_eq!(sentiment_for(&label), Sentiment::Positive);
        assert_eq!(sentiment_for(&label).code(), 0);
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(Sentiment::Positive.verdict_label(), "Positivo");
        assert_eq!(Sentiment::Negative.verdict_label(), "Negativo");
    }
}
