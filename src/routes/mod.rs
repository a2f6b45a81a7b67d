pub mod health;
pub mod ingest;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/webhook", post(ingest::webhook))
        .route("/live", get(health::live))
        .route("/health", get(health::health))
        .route("/failed", get(health::failed_items))
}
