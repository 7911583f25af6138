//! Router assembly

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{generate, health_check, stream_handler};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/agent/generate", post(generate))
        .route("/agent/stream", get(stream_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
