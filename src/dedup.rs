use std::sync::Arc;

use crate::store::{PROCESSED_SET, QueueStore, StoreError};

/// Enforces "at most one successful mint per target". The mark is written
/// only after the full pipeline (mint + history record) has succeeded;
/// marking earlier would permanently block legitimate retries when a later
/// step fails.
#[derive(Clone)]
pub struct DedupGate {
    store: Arc<dyn QueueStore>,
}

impl DedupGate {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self { store }
    }

    pub async fn is_target_processed(&self, target_hash: &str) -> Result<bool, StoreError> {
        self.store.is_member(PROCESSED_SET, target_hash).await
    }

    pub async fn mark_target_processed(&self, target_hash: &str) -> Result<(), StoreError> {
        self.store.add_to_set(PROCESSED_SET, target_hash).await
    }
}
