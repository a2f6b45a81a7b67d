use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The durable record of a completed mint. `target_hash` is unique: the
/// history store holds at most one record per target cast.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct MintRecord {
    pub target_hash: String,
    pub asset_uri: String,
    pub metadata_uri: String,
    pub requester_fid: i64,
    pub owner_fid: i64,
    pub contract_address: String,
    pub token_id: i64,
    pub tx_hash: String,
    pub minted_at: DateTime<Utc>,
}
