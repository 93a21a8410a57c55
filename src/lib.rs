pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod upstream;

use axum::{routing::get, routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::routes::chat_routes::{chat_stream_handler, healthz_handler};
use crate::upstream::OllamaClient;

/// Builds the relay router around one upstream client.
pub fn create_router(client: OllamaClient) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/chat/stream", post(chat_stream_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(client)
}
