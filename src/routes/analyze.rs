//! Emotion analysis endpoint (/api/analyze_emotion)

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::pipeline::{self, AnalysisOptions, BatchOutput};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/analyze_emotion", post(analyze_emotion))
}

/// Accepts either the batch shape (`images`) or the single-image shape
/// (`image`).
#[derive(Deserialize)]
struct AnalyzeRequest {
    images: Option<Vec<String>>,
    image: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum FrameEntry {
    Success {
        frame: usize,
        emotion: u8,
        dominant_emotion: String,
        category: &'static str,
    },
    Failure {
        frame: usize,
        error: String,
    },
}

#[derive(Serialize)]
struct AnalyzeResponse {
    results: Vec<FrameEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emotion: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dominant_emotion: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'static str>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

/// POST /api/analyze_emotion - Classify one or more Base64 face images
///
/// The body is parsed from raw bytes rather than through the Json
/// extractor so a malformed body surfaces as a 500 with an error message
/// instead of the extractor's 4xx rejection.
async fn analyze_emotion(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: AnalyzeRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            log::error!("[analyze] Unreadable request body: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("invalid request body: {}", e),
            );
        }
    };

    // Single-image requests enforce face detection; batch requests
    // best-effort label every frame.
    let (images, enforce_detection) = match request.image {
        Some(single) => (vec![single], true),
        None => (request.images.unwrap_or_default(), false),
    };

    let options = AnalysisOptions {
        enhance: state.enhance,
        enforce_detection,
        aggregate: state.aggregate,
    };

    match pipeline::run_batch(state.classifier.clone(), state.sink.clone(), images, options).await {
        Ok(output) => (StatusCode::OK, Json(render(output))).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

fn render(output: BatchOutput) -> AnalyzeResponse {
    let results = output
        .records
        .into_iter()
        .map(|record| match record.outcome {
            Ok(analysis) => FrameEntry::Success {
                frame: record.frame,
                emotion: analysis.sentiment.code(),
                dominant_emotion: analysis.label.as_str().to_string(),
                category: analysis.sentiment.category(),
            },
            Err(e) => FrameEntry::Failure {
                frame: record.frame,
                error: e.to_string(),
            },
        })
        .collect();

    match output.verdict {
        Some(verdict) => AnalyzeResponse {
            results,
            emotion: Some(verdict.sentiment.code()),
            dominant_emotion: Some(verdict.sentiment.verdict_label()),
            category: Some(verdict.sentiment.category()),
        },
        None => AnalyzeResponse {
            results,
            emotion: None,
            dominant_emotion: None,
            category: None,
        },
    }
}
