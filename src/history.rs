use async_trait::async_trait;
use sqlx::PgPool;

use crate::clients::ClientError;
use crate::models::MintRecord;

/// The persistent mint history, consumed as an external collaborator: the
/// enqueue path reads it to reject already-minted targets, the pipeline
/// writes the final record before the dedup mark.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn record_result(&self, record: &MintRecord) -> Result<(), ClientError>;
    async fn lookup_result(&self, target_hash: &str) -> Result<Option<MintRecord>, ClientError>;
}

pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn record_result(&self, record: &MintRecord) -> Result<(), ClientError> {
        sqlx::query(
            "INSERT INTO mint_records
                 (target_hash, asset_uri, metadata_uri, requester_fid, owner_fid,
                  contract_address, token_id, tx_hash, minted_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (target_hash) DO NOTHING",
        )
        .bind(&record.target_hash)
        .bind(&record.asset_uri)
        .bind(&record.metadata_uri)
        .bind(record.requester_fid)
        .bind(record.owner_fid)
        .bind(&record.contract_address)
        .bind(record.token_id)
        .bind(&record.tx_hash)
        .bind(record.minted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(())
    }

    async fn lookup_result(&self, target_hash: &str) -> Result<Option<MintRecord>, ClientError> {
        sqlx::query_as::<_, MintRecord>("SELECT * FROM mint_records WHERE target_hash = $1")
            .bind(target_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }
}
