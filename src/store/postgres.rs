use async_trait::async_trait;
use sqlx::PgPool;

use super::{QueueStore, StoreError};

/// Queue store backed by the `list_entries` and `set_members` tables. The
/// pool is constructed at startup and closed on shutdown; every operation
/// here is a single statement, so concurrent enqueuers and the worker never
/// need explicit locking.
pub struct PgQueueStore {
    pool: PgPool,
}

impl PgQueueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueStore for PgQueueStore {
    async fn push_front(&self, list: &str, payload: &str) -> Result<usize, StoreError> {
        // The CTE's insert is not visible to the count in the same statement,
        // hence the + 1.
        let len: i64 = sqlx::query_scalar(
            "WITH ins AS (
                 INSERT INTO list_entries (list, position, payload)
                 VALUES ($1, COALESCE((SELECT MIN(position) FROM list_entries WHERE list = $1), 0) - 1, $2)
             )
             SELECT COUNT(*) + 1 FROM list_entries WHERE list = $1",
        )
        .bind(list)
        .bind(payload)
        .fetch_one(&self.pool)
        .await?;
        Ok(len as usize)
    }

    async fn pop_back(&self, list: &str) -> Result<Option<String>, StoreError> {
        let payload: Option<String> = sqlx::query_scalar(
            "DELETE FROM list_entries
             WHERE id = (
                 SELECT id FROM list_entries
                 WHERE list = $1
                 ORDER BY position DESC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING payload",
        )
        .bind(list)
        .fetch_optional(&self.pool)
        .await?;
        Ok(payload)
    }

    async fn peek_range(
        &self,
        list: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StoreError> {
        let limit = if stop < 0 {
            i64::MAX
        } else {
            (stop - start + 1).max(0)
        };
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT payload FROM list_entries
             WHERE list = $1
             ORDER BY position ASC
             OFFSET $2 LIMIT $3",
        )
        .bind(list)
        .bind(start.max(0))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn add_to_set(&self, set: &str, member: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO set_members (set_name, member) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(set)
        .bind(member)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_member(&self, set: &str, member: &str) -> Result<bool, StoreError> {
        let present: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM set_members WHERE set_name = $1 AND member = $2)",
        )
        .bind(set)
        .bind(member)
        .fetch_one(&self.pool)
        .await?;
        Ok(present)
    }
}
