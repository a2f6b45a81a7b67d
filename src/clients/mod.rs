pub mod chain;
pub mod farcaster;
pub mod renderer;
pub mod storage;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::Identity;

/// Error surfaced by an external collaborator call. Timeouts are kept
/// distinct from other transport failures; both are retryable at the call
/// site, semantic errors are not.
#[derive(Debug, Clone)]
pub enum ClientError {
    Timeout(String),
    Transport(String),
    NotFound(String),
    RateLimited(String),
    /// The service understood the request and refused it (bad input,
    /// insufficient funds, ...).
    Semantic(String),
}

impl ClientError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Timeout(_) | ClientError::Transport(_))
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Timeout(msg) => write!(f, "timed out: {msg}"),
            ClientError::Transport(msg) => write!(f, "transport error: {msg}"),
            ClientError::NotFound(msg) => write!(f, "not found: {msg}"),
            ClientError::RateLimited(msg) => write!(f, "rate limited: {msg}"),
            ClientError::Semantic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Map a non-success HTTP status to the matching error variant.
pub(crate) fn error_for_status(status: reqwest::StatusCode, context: &str) -> ClientError {
    match status.as_u16() {
        404 => ClientError::NotFound(context.to_string()),
        429 => ClientError::RateLimited(context.to_string()),
        _ => ClientError::Semantic(format!("{context}: HTTP {status}")),
    }
}

/// A resolved cast and its author.
#[derive(Debug, Clone)]
pub struct Cast {
    pub hash: String,
    pub text: String,
    pub author: Identity,
    pub embeds: Vec<String>,
}

/// Fixed-percentage revenue split configuration. Recipients are kept sorted
/// by address so the same participants always produce the same on-chain
/// prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    pub recipients: Vec<SplitRecipient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRecipient {
    pub address: String,
    /// Share in whole percent; shares across a config sum to 100.
    pub share: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictedSplit {
    pub address: String,
    pub exists: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedSplit {
    pub address: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MintedToken {
    pub token_id: i64,
    pub tx_hash: String,
}

/// Farcaster read/write access.
#[async_trait]
pub trait SocialClient: Send + Sync {
    async fn fetch_cast(&self, hash: &str) -> Result<Cast, ClientError>;

    /// Publish a reply under `parent_hash`, returning the new cast's hash.
    async fn publish_reply(
        &self,
        signer_id: &str,
        text: &str,
        parent_hash: &str,
        embeds: &[String],
    ) -> Result<String, ClientError>;
}

/// Turns a cast into a PNG artifact. Pure function of its input.
#[async_trait]
pub trait AssetRenderer: Send + Sync {
    async fn render(&self, cast: &Cast) -> Result<Vec<u8>, ClientError>;
}

/// Content-addressed storage. Re-uploading identical bytes is acceptable;
/// callers do not rely on URI stability across calls.
#[async_trait]
pub trait ContentStorage: Send + Sync {
    async fn store(&self, bytes: Vec<u8>, filename: &str) -> Result<String, ClientError>;
}

/// Deterministic revenue-split deployment.
#[async_trait]
pub trait SplitService: Send + Sync {
    async fn predict_target(&self, config: &SplitConfig) -> Result<PredictedSplit, ClientError>;
    async fn create_target(&self, config: &SplitConfig) -> Result<CreatedSplit, ClientError>;
}

/// Token minting against a fixed collection contract.
#[async_trait]
pub trait MintService: Send + Sync {
    async fn mint(
        &self,
        contract_address: &str,
        metadata_uri: &str,
        payout_address: &str,
    ) -> Result<MintedToken, ClientError>;
}
