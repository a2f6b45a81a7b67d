use crate::models::{FailedWorkItem, WorkItem};
use crate::store::{FAILED_LIST, PENDING_LIST, QueueStore, StoreError};

/// Append a work item to the pending list. Pure durable append: all
/// validation (command grammar, trust score, dedup, history) happens at the
/// ingestion boundary before this is called. Returns the pending-list length
/// after the insert.
pub async fn enqueue(store: &dyn QueueStore, item: &WorkItem) -> Result<usize, StoreError> {
    let payload = serde_json::to_string(item)?;
    store.push_front(PENDING_LIST, &payload).await
}

/// Remove and return the oldest pending item, or `None` if the queue is
/// empty. Enqueue pushes the head and this pops the tail, so items come out
/// in strict FIFO order.
pub async fn dequeue(store: &dyn QueueStore) -> Result<Option<WorkItem>, StoreError> {
    match store.pop_back(PENDING_LIST).await? {
        Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
        None => Ok(None),
    }
}

/// Record an item that exhausted the pipeline. Failed items are never
/// requeued automatically; they accumulate for manual inspection.
pub async fn push_failed(store: &dyn QueueStore, failed: &FailedWorkItem) -> Result<usize, StoreError> {
    let payload = serde_json::to_string(failed)?;
    store.push_front(FAILED_LIST, &payload).await
}

/// Current pending and failed list depths, read non-destructively.
pub async fn depths(store: &dyn QueueStore) -> Result<(usize, usize), StoreError> {
    let pending = store.peek_range(PENDING_LIST, 0, -1).await?.len();
    let failed = store.peek_range(FAILED_LIST, 0, -1).await?.len();
    Ok((pending, failed))
}

/// The failed list, newest first. Entries that no longer decode are skipped
/// rather than failing the whole read.
pub async fn failed_items(store: &dyn QueueStore) -> Result<Vec<FailedWorkItem>, StoreError> {
    let payloads = store.peek_range(FAILED_LIST, 0, -1).await?;
    Ok(payloads
        .iter()
        .filter_map(|p| serde_json::from_str(p).ok())
        .collect())
}
