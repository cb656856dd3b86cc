pub mod callback;
pub mod metrics;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

pub use state::AppState;

/// Assembles the Ingest HTTP surface: the Source callback route and the
/// metrics scrape route, with a request body size cap applied uniformly.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/vk/callback/:hook_id", post(callback::handle_callback))
        .route("/metrics", get(metrics::handle_metrics))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}
