pub mod postgres;

use async_trait::async_trait;

pub use postgres::PgQueueStore;

/// Pending mint requests, FIFO. Enqueue pushes the head, dequeue pops the tail.
pub const PENDING_LIST: &str = "mint:pending";
/// Items that exhausted the pipeline, newest first. Never auto-requeued.
pub const FAILED_LIST: &str = "mint:failed";
/// Target hashes with a fully completed mint.
pub const PROCESSED_SET: &str = "mint:processed";

#[derive(Debug)]
pub enum StoreError {
    /// The store could not be reached or the operation failed mid-flight.
    Unavailable(String),
    /// A stored payload could not be encoded or decoded.
    Codec(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "queue store unavailable: {msg}"),
            StoreError::Codec(msg) => write!(f, "queue payload codec error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Codec(err.to_string())
    }
}

/// Durable list/set primitives over named collections. Every operation is a
/// single atomic statement against the backend; an empty list yields
/// `Ok(None)`, never an error.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Insert at the head of `list`. Returns the list length after the insert.
    async fn push_front(&self, list: &str, payload: &str) -> Result<usize, StoreError>;

    /// Remove and return the tail of `list`, or `None` if the list is empty.
    async fn pop_back(&self, list: &str) -> Result<Option<String>, StoreError>;

    /// Non-destructive read from the head of `list`. `stop` of `-1` reads to
    /// the end; otherwise the range is inclusive, as in `[start, stop]`.
    async fn peek_range(&self, list: &str, start: i64, stop: i64)
    -> Result<Vec<String>, StoreError>;

    /// Add `member` to `set`. Adding an existing member is a no-op.
    async fn add_to_set(&self, set: &str, member: &str) -> Result<(), StoreError>;

    async fn is_member(&self, set: &str, member: &str) -> Result<bool, StoreError>;
}
