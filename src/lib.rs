pub mod clients;
pub mod command;
pub mod config;
pub mod dedup;
pub mod error;
pub mod health;
pub mod history;
pub mod models;
pub mod pipeline;
pub mod queue;
pub mod routes;
pub mod signature;
pub mod state;
pub mod store;
pub mod worker;

use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub fn build_app(state: SharedState) -> Router {
    let max_body_size = state.config.max_body_size;

    routes::routes()
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
