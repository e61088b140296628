use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use facemood::annotate::{ArtifactSink, DiskSink, NoOpSink};
use facemood::classifier::{EmotionClassifier, FixtureClassifier, VitEmotionClassifier};
use facemood::constants::{DEFAULT_MIN_FACE_CONFIDENCE, DEFAULT_MODEL_REPO, DEFAULT_OUTPUT_DIR};
use facemood::{AppState, build_router};

#[tokio::main]
async fn main() {
    env_logger::init();

    let classifier: Arc<dyn EmotionClassifier> = match emotion_backend().as_str() {
        "fixture" => {
            log::warn!("[server] Using fixture classifier, labels are not real inferences");
            Arc::new(FixtureClassifier::new())
        }
        _ => Arc::new(
            VitEmotionClassifier::new(&model_repo(), min_face_confidence())
                .expect("Failed to load emotion model"),
        ),
    };

    let sink: Arc<dyn ArtifactSink> = if artifacts_enabled() {
        Arc::new(DiskSink::new(output_dir()))
    } else {
        Arc::new(NoOpSink)
    };

    let state = Arc::new(AppState {
        classifier,
        sink,
        enhance: enhance_frames(),
        aggregate: compute_aggregate(),
    });

    let app = build_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    log::info!("[server] Listening on http://{}", addr);
    axum::serve(listener, app).await.expect("Server failed");
}

/// "vit" (default) or "fixture" for runs without the model download
fn emotion_backend() -> String {
    env::var("EMOTION_BACKEND").unwrap_or_else(|_| "vit".to_string())
}

fn model_repo() -> String {
    env::var("EMOTION_MODEL_REPO").unwrap_or_else(|_| DEFAULT_MODEL_REPO.to_string())
}

fn min_face_confidence() -> f32 {
    env::var("MIN_FACE_CONFIDENCE")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v| (0.0..=1.0).contains(v))
        .unwrap_or(DEFAULT_MIN_FACE_CONFIDENCE)
}

fn output_dir() -> PathBuf {
    env::var("OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

fn artifacts_enabled() -> bool {
    env_flag("SAVE_ANNOTATED_FRAMES", true)
}

fn enhance_frames() -> bool {
    env_flag("ENHANCE_FRAMES", true)
}

fn compute_aggregate() -> bool {
    env_flag("COMPUTE_AGGREGATE", true)
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}
