use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::{Value, json};

use crate::command;
use crate::error::AppError;
use crate::models::{Identity, WebhookPayload, WorkItem};
use crate::queue;
use crate::signature;
use crate::state::SharedState;

/// Ingestion boundary. Verifies the webhook signature, applies every
/// precondition (command grammar, resolvable target owner, trust score,
/// dedup and history checks), and only then appends to the pending list.
/// Events that fail a precondition are acknowledged and dropped; only
/// signature and payload problems are client errors.
pub async fn webhook(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let provided_signature = headers
        .get("x-castmint-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized {
            code: "missing_signature",
            message: "Missing signature header".to_string(),
        })?;
    let timestamp = headers
        .get("x-castmint-timestamp")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized {
            code: "missing_timestamp",
            message: "Missing timestamp header".to_string(),
        })?;

    if !signature::verify(
        &state.config.webhook_secret,
        timestamp,
        &body,
        provided_signature,
    ) {
        return Err(AppError::Unauthorized {
            code: "invalid_signature",
            message: "Signature verification failed".to_string(),
        });
    }

    let payload: WebhookPayload =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest {
            code: "invalid_payload",
            message: format!("Malformed webhook payload: {e}"),
        })?;

    if payload.event_type != "cast.created" {
        return Ok(ignored("unhandled_event_type"));
    }

    let cast = payload.data;

    if !command::is_mint_command(&cast.text, &state.config.bot_handle) {
        return Ok(ignored("not_a_mint_command"));
    }

    let Some(target_hash) = cast.parent_hash.clone() else {
        tracing::debug!(cast_hash = %cast.hash, "Mint command outside a reply, ignoring");
        return Ok(ignored("no_parent_cast"));
    };
    let Some(owner_fid) = cast.parent_author.as_ref().and_then(|p| p.fid) else {
        tracing::debug!(cast_hash = %cast.hash, "Parent cast has no resolvable owner, ignoring");
        return Ok(ignored("no_parent_author"));
    };

    let score = cast.author.score.unwrap_or(0.0);
    if score < state.config.min_user_score {
        tracing::info!(
            fid = cast.author.fid,
            score,
            "Requester below trust threshold, ignoring"
        );
        return Ok(ignored("below_trust_threshold"));
    }

    if state.dedup.is_target_processed(&target_hash).await? {
        return Ok(ignored("already_minted"));
    }
    if state.history.lookup_result(&target_hash).await?.is_some() {
        return Ok(ignored("already_minted"));
    }

    let item = WorkItem {
        work_hash: cast.hash.clone(),
        target_hash: target_hash.clone(),
        requester: Identity {
            fid: cast.author.fid,
            username: cast.author.username.clone(),
            payable_address: cast.author.payable_address(),
        },
        target_owner: Identity {
            fid: owner_fid,
            username: String::new(),
            payable_address: None,
        },
        submitted_at: cast.timestamp,
    };

    let queue_length = queue::enqueue(&*state.store, &item).await?;
    state.wake.notify_one();

    tracing::info!(
        target_hash = %target_hash,
        requester_fid = item.requester.fid,
        queue_length,
        "Mint request enqueued"
    );

    Ok(Json(json!({
        "success": true,
        "enqueued": true,
        "queue_length": queue_length,
    })))
}

fn ignored(reason: &str) -> Json<Value> {
    Json(json!({ "success": true, "enqueued": false, "reason": reason }))
}
