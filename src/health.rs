use std::collections::VecDeque;
use std::sync::RwLock;

use chrono::Utc;

use crate::models::WorkerStatus;
use crate::models::health::{HealthError, HealthSnapshot};

const MAX_RECENT_ERRORS: usize = 10;

/// Health state owned by the worker, updated through the transition methods
/// below and read from the outside only as a snapshot.
pub struct HealthMonitor {
    inner: RwLock<Inner>,
}

struct Inner {
    status: WorkerStatus,
    queue_size: usize,
    failed_count: usize,
    last_processed_at: Option<chrono::DateTime<Utc>>,
    recent_errors: VecDeque<HealthError>,
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                status: WorkerStatus::Idle,
                queue_size: 0,
                failed_count: 0,
                last_processed_at: None,
                recent_errors: VecDeque::new(),
            }),
        }
    }

    pub fn set_status(&self, status: WorkerStatus) {
        self.inner.write().expect("health lock poisoned").status = status;
    }

    /// An item finished the pipeline (minted or skipped as already done).
    pub fn record_success(&self) {
        let mut inner = self.inner.write().expect("health lock poisoned");
        inner.status = WorkerStatus::Idle;
        inner.last_processed_at = Some(Utc::now());
    }

    pub fn record_error(&self, message: String) {
        let mut inner = self.inner.write().expect("health lock poisoned");
        inner.status = WorkerStatus::Error;
        inner.last_processed_at = Some(Utc::now());
        if inner.recent_errors.len() == MAX_RECENT_ERRORS {
            inner.recent_errors.pop_back();
        }
        inner.recent_errors.push_front(HealthError {
            message,
            at: Utc::now(),
        });
    }

    pub fn set_queue_depths(&self, queue_size: usize, failed_count: usize) {
        let mut inner = self.inner.write().expect("health lock poisoned");
        inner.queue_size = queue_size;
        inner.failed_count = failed_count;
    }

    /// Snapshot of the current state. `store_error` annotates a failed
    /// queue-depth refresh; the counts in the snapshot are then the last
    /// known values.
    pub fn snapshot(&self, store_error: Option<String>) -> HealthSnapshot {
        let inner = self.inner.read().expect("health lock poisoned");
        HealthSnapshot {
            status: inner.status,
            queue_size: inner.queue_size,
            failed_count: inner.failed_count,
            last_processed_at: inner.last_processed_at,
            recent_errors: inner.recent_errors.iter().cloned().collect(),
            store_error,
        }
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new()
    }
}
