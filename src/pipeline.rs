//! Per-frame analysis pipeline and batch orchestration
//!
//! Frames are independent, so the batch runs with bounded concurrency on
//! blocking worker threads. Results land in index-addressed slots, so the
//! output order always matches the input order no matter which frame
//! finishes first. A single frame's failure becomes an error entry for
//! that frame and never aborts the rest of the batch.

use std::env;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::annotate::ArtifactSink;
use crate::classifier::{EmotionClassifier, EmotionLabel};
use crate::codec;
use crate::constants::MAX_FRAMES;
use crate::enhance;
use crate::error::{BatchError, FrameError};
use crate::sentiment::{self, Sentiment};

const DEFAULT_CONCURRENCY: usize = 4;

/// Per-request pipeline switches. The enhancement and aggregation flags
/// come from server config; detection enforcement follows the request
/// shape (single image enforces, batches best-effort).
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub enhance: bool,
    pub enforce_detection: bool,
    pub aggregate: bool,
}

/// Successful analysis of one frame.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub label: EmotionLabel,
    pub sentiment: Sentiment,
}

/// Outcome for one frame, tagged with its 1-based input position.
#[derive(Debug)]
pub struct FrameRecord {
    pub frame: usize,
    pub outcome: Result<FrameAnalysis, FrameError>,
}

/// Majority vote across successfully classified frames. Ties favor
/// positive.
#[derive(Debug, Clone, Copy)]
pub struct BatchVerdict {
    pub sentiment: Sentiment,
    pub positive: usize,
    pub negative: usize,
}

#[derive(Debug)]
pub struct BatchOutput {
    pub records: Vec<FrameRecord>,
    pub verdict: Option<BatchVerdict>,
}

/// Run the full pipeline over a batch of Base64 frames.
///
/// Batch-size validation happens before any frame is touched. The output
/// always contains exactly one record per input frame, in input order.
pub async fn run_batch(
    classifier: Arc<dyn EmotionClassifier>,
    sink: Arc<dyn ArtifactSink>,
    images: Vec<String>,
    options: AnalysisOptions,
) -> Result<BatchOutput, BatchError> {
    if images.is_empty() {
        return Err(BatchError::EmptyBatch);
    }
    if images.len() > MAX_FRAMES {
        return Err(BatchError::TooManyFrames);
    }

    // Artifacts from concurrent requests must not collide, so every batch
    // gets its own namespace.
    let request_id = format!("{:016x}", rand::random::<u64>());
    let total = images.len();
    log::info!("[analyze] Request {}: {} frame(s)", request_id, total);

    let concurrency = pipeline_concurrency();
    let mut slots: Vec<Option<Result<FrameAnalysis, FrameError>>> = Vec::new();
    slots.resize_with(total, || None);

    let mut pending = images.into_iter().enumerate();
    let mut tasks: JoinSet<(usize, Result<FrameAnalysis, FrameError>)> = JoinSet::new();

    // Keep `concurrency` frames in flight, refilling as each completes.
    loop {
        while tasks.len() < concurrency {
            let Some((i, payload)) = pending.next() else {
                break;
            };
            let classifier = classifier.clone();
            let sink = sink.clone();
            let request_id = request_id.clone();
            tasks.spawn_blocking(move || {
                let frame = i + 1;
                let outcome = process_frame(
                    classifier.as_ref(),
                    sink.as_ref(),
                    &request_id,
                    frame,
                    &payload,
                    options,
                );
                (i, outcome)
            });
        }

        if tasks.is_empty() {
            break;
        }

        if let Some(result) = tasks.join_next().await {
            match result {
                Ok((i, outcome)) => {
                    if let Err(e) = &outcome {
                        log::warn!("[analyze] Frame {} failed: {}", i + 1, e);
                    }
                    slots[i] = Some(outcome);
                }
                Err(e) => {
                    // The frame index is lost when a task panics; the
                    // owning slot is backfilled below.
                    log::error!("[analyze] Frame task panicked: {}", e);
                }
            }
        }
    }

    let records: Vec<FrameRecord> = slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| FrameRecord {
            frame: i + 1,
            outcome: slot.unwrap_or(Err(FrameError::Aborted)),
        })
        .collect();

    let verdict = options.aggregate.then(|| vote(&records));
    if let Some(v) = &verdict {
        log::info!(
            "[analyze] Request {}: verdict {} ({} positive, {} negative)",
            request_id,
            v.sentiment.verdict_label(),
            v.positive,
            v.negative
        );
    }

    Ok(BatchOutput { records, verdict })
}

/// Decode, optionally enhance, classify, map, and annotate one frame.
fn process_frame(
    classifier: &dyn EmotionClassifier,
    sink: &dyn ArtifactSink,
    request_id: &str,
    frame: usize,
    payload: &str,
    options: AnalysisOptions,
) -> Result<FrameAnalysis, FrameError> {
    let decoded = codec::decode_base64_image(payload)?;
    let image = if options.enhance {
        enhance::enhance_image(&decoded)
    } else {
        decoded
    };

    let classification = classifier.classify(&image, options.enforce_detection)?;
    let sentiment = sentiment::sentiment_for(&classification.dominant);

    log::debug!(
        "[analyze] Frame {} scores: {:?}",
        frame,
        classification.scores
    );
    log::info!(
        "[analyze] Frame {}: {} -> {} ({})",
        frame,
        classification.dominant,
        sentiment.category(),
        sentiment.code()
    );

    sink.persist(request_id, frame, &image, &classification.dominant)
        .map_err(|e| FrameError::Io(e.to_string()))?;

    Ok(FrameAnalysis {
        label: classification.dominant,
        sentiment,
    })
}

/// Count positive vs negative among successful frames; positive wins ties.
fn vote(records: &[FrameRecord]) -> BatchVerdict {
    let mut positive = 0;
    let mut negative = 0;
    for record in records {
        match &record.outcome {
            Ok(analysis) if analysis.sentiment == Sentiment::Positive => positive += 1,
            Ok(_) => negative += 1,
            Err(_) => {}
        }
    }
    let sentiment = if positive >= negative {
        Sentiment::Positive
    } else {
        Sentiment::Negative
    };
    BatchVerdict {
        sentiment,
        positive,
        negative,
    }
}

fn pipeline_concurrency() -> usize {
    env::var("PIPELINE_CONCURRENCY")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_CONCURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::NoOpSink;
    use crate::classifier::FixtureClassifier;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    /// Base64 PNG whose red channel selects the fixture label
    /// (class order: angry, disgust, fear, happy, neutral, sad, surprise).
    fn frame_b64(red: u8) -> String {
        let img = RgbImage::from_pixel(4, 4, Rgb([red, 0, 0]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        STANDARD.encode(buf.into_inner())
    }

    fn options() -> AnalysisOptions {
        AnalysisOptions {
            enhance: false,
            enforce_detection: false,
            aggregate: true,
        }
    }

    async fn run(images: Vec<String>, options: AnalysisOptions) -> Result<BatchOutput, BatchError> {
        run_batch(
            Arc::new(FixtureClassifier::new()),
            Arc::new(NoOpSink),
            images,
            options,
        )
        .await
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let err = run(vec![], options()).await.unwrap_err();
        assert!(matches!(err, BatchError::EmptyBatch));
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected() {
        let images = vec![frame_b64(3); MAX_FRAMES + 1];
        let err = run(images, options()).await.unwrap_err();
        assert!(matches!(err, BatchError::TooManyFrames));
    }

    #[tokio::test]
    async fn test_output_order_matches_input_order() {
        // happy, sad, neutral, angry, surprise
        let reds = [3u8, 5, 4, 0, 6];
        let expected = ["happy", "sad", "neutral", "angry", "surprise"];
        let images = reds.iter().map(|r| frame_b64(*r)).collect();

        let output = run(images, options()).await.unwrap();
        assert_eq!(output.records.len(), 5);
        for (i, record) in output.records.iter().enumerate() {
            assert_eq!(record.frame, i + 1);
            let analysis = record.outcome.as_ref().unwrap();
            assert_eq!(analysis.label.as_str(), expected[i]);
        }
    }

    #[tokio::test]
    async fn test_failed_frame_does_not_abort_batch() {
        let images = vec![frame_b64(3), "garbage!!".to_string(), frame_b64(5)];
        let output = run(images, options()).await.unwrap();

        assert_eq!(output.records.len(), 3);
        assert!(output.records[0].outcome.is_ok());
        assert!(matches!(
            output.records[1].outcome,
            Err(FrameError::Base64(_))
        ));
        assert!(output.records[2].outcome.is_ok());
    }

    #[tokio::test]
    async fn test_tie_favors_positive() {
        // one happy, one sad
        let images = vec![frame_b64(3), frame_b64(5)];
        let output = run(images, options()).await.unwrap();
        let verdict = output.verdict.unwrap();
        assert_eq!(verdict.positive, 1);
        assert_eq!(verdict.negative, 1);
        assert_eq!(verdict.sentiment, Sentiment::Positive);
    }

    #[tokio::test]
    async fn test_no_verdict_when_aggregation_off() {
        let opts = AnalysisOptions {
            aggregate: false,
            ..options()
        };
        let output = run(vec![frame_b64(3)], opts).await.unwrap();
        assert!(output.verdict.is_none());
    }
}
