use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Incoming cast event from the Farcaster webhook provider.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: CastPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastPayload {
    pub hash: String,
    pub text: String,
    pub parent_hash: Option<String>,
    pub parent_author: Option<ParentAuthor>,
    pub timestamp: DateTime<Utc>,
    pub author: AuthorPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParentAuthor {
    pub fid: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorPayload {
    pub fid: i64,
    #[serde(default)]
    pub username: String,
    /// Provider-computed trust score in [0, 1].
    pub score: Option<f64>,
    pub verified_addresses: Option<VerifiedAddresses>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedAddresses {
    #[serde(default)]
    pub eth_addresses: Vec<String>,
}

impl AuthorPayload {
    /// First verified payment address, if any.
    pub fn payable_address(&self) -> Option<String> {
        self.verified_addresses
            .as_ref()
            .and_then(|v| v.eth_addresses.first())
            .filter(|a| !a.is_empty())
            .cloned()
    }
}
