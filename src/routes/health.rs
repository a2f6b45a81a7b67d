use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::{FailedWorkItem, HealthSnapshot};
use crate::queue;
use crate::state::SharedState;

/// Liveness probe. No store dependency: answers whenever the process is up.
pub async fn live() -> Json<Value> {
    Json(json!({ "status": "alive", "timestamp": Utc::now() }))
}

/// Worker health snapshot. A store read failure never turns into an error
/// response; the last known state is returned annotated with the failure.
pub async fn health(State(state): State<SharedState>) -> Json<HealthSnapshot> {
    let snapshot = match queue::depths(&*state.store).await {
        Ok((pending, failed)) => {
            state.health.set_queue_depths(pending, failed);
            state.health.snapshot(None)
        }
        Err(e) => {
            tracing::warn!("Health check could not read queue depths: {e}");
            state.health.snapshot(Some(e.to_string()))
        }
    };
    Json(snapshot)
}

/// The failed list, newest first, for manual inspection.
pub async fn failed_items(
    State(state): State<SharedState>,
) -> Result<Json<Vec<FailedWorkItem>>, AppError> {
    let items = queue::failed_items(&*state.store).await?;
    Ok(Json(items))
}
