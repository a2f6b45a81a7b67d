use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A Farcaster actor referenced by a queued mint request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub fid: i64,
    pub username: String,
    /// Verified address capable of receiving funds, if the actor has one.
    pub payable_address: Option<String>,
}

/// A queued mint request. Immutable once enqueued; queue operations are
/// push/pop only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Hash of the reply cast that carried the mint command.
    pub work_hash: String,
    /// Hash of the parent cast being minted. Deduplication key: at most one
    /// completed mint per target.
    pub target_hash: String,
    pub requester: Identity,
    pub target_owner: Identity,
    pub submitted_at: DateTime<Utc>,
}

/// A work item that exhausted the pipeline, kept for manual inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedWorkItem {
    pub id: Uuid,
    pub item: WorkItem,
    pub failure_reason: String,
    pub failed_at: DateTime<Utc>,
}

impl FailedWorkItem {
    pub fn new(item: WorkItem, failure_reason: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            item,
            failure_reason,
            failed_at: Utc::now(),
        }
    }
}
