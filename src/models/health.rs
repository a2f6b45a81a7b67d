use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Idle,
    Processing,
    Error,
    ShuttingDown,
}

/// Point-in-time view of the worker, returned by the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: WorkerStatus,
    pub queue_size: usize,
    pub failed_count: usize,
    pub last_processed_at: Option<DateTime<Utc>>,
    pub recent_errors: Vec<HealthError>,
    /// Set when the queue store could not be read; the counts above are then
    /// the last known values rather than live ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthError {
    pub message: String,
    pub at: DateTime<Utc>,
}
