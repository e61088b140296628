//! Facial-emotion sentiment analysis API
//!
//! Accepts Base64-encoded face images, classifies the dominant emotion in
//! each with a pretrained model, and maps it to a coarse positive/negative
//! sentiment, with a majority-vote verdict across the batch.

pub mod annotate;
pub mod classifier;
pub mod codec;
pub mod constants;
pub mod enhance;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod sentiment;

use axum::{Router, extract::DefaultBodyLimit};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::annotate::ArtifactSink;
use crate::classifier::EmotionClassifier;
use crate::constants::MAX_REQUEST_BODY_SIZE;

/// Shared application state
pub struct AppState {
    pub classifier: Arc<dyn EmotionClassifier>,
    pub sink: Arc<dyn ArtifactSink>,
    /// Run the enhancement filter before classification
    pub enhance: bool,
    /// Append the majority-vote verdict to batch responses
    pub aggregate: bool,
}

/// Build the application router. Tests drive this directly so they
/// exercise the same middleware stack production uses.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::build_routes())
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_SIZE))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
