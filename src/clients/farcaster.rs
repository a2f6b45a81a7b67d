use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::models::Identity;

use super::{Cast, ClientError, SocialClient, error_for_status};

/// Farcaster access through a hosted hub API.
pub struct FarcasterApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FarcasterApi {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct CastEnvelope {
    cast: CastData,
}

#[derive(Deserialize)]
struct CastData {
    hash: String,
    text: String,
    author: CastAuthor,
    #[serde(default)]
    embeds: Vec<CastEmbed>,
}

#[derive(Deserialize)]
struct CastAuthor {
    fid: i64,
    #[serde(default)]
    username: String,
    verified_addresses: Option<AuthorAddresses>,
}

#[derive(Deserialize)]
struct AuthorAddresses {
    #[serde(default)]
    eth_addresses: Vec<String>,
}

#[derive(Deserialize)]
struct CastEmbed {
    url: Option<String>,
}

#[derive(Deserialize)]
struct PublishEnvelope {
    cast: PublishedCast,
}

#[derive(Deserialize)]
struct PublishedCast {
    hash: String,
}

#[async_trait]
impl SocialClient for FarcasterApi {
    async fn fetch_cast(&self, hash: &str) -> Result<Cast, ClientError> {
        let resp = self
            .client
            .get(format!("{}/cast", self.base_url))
            .query(&[("identifier", hash), ("type", "hash")])
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_status(
                resp.status(),
                &format!("cast {hash}"),
            ));
        }

        let envelope: CastEnvelope = resp.json().await?;
        let author = envelope.cast.author;
        Ok(Cast {
            hash: envelope.cast.hash,
            text: envelope.cast.text,
            author: Identity {
                fid: author.fid,
                username: author.username,
                payable_address: author
                    .verified_addresses
                    .and_then(|a| a.eth_addresses.into_iter().next())
                    .filter(|a| !a.is_empty()),
            },
            embeds: envelope
                .cast
                .embeds
                .into_iter()
                .filter_map(|e| e.url)
                .collect(),
        })
    }

    async fn publish_reply(
        &self,
        signer_id: &str,
        text: &str,
        parent_hash: &str,
        embeds: &[String],
    ) -> Result<String, ClientError> {
        let body = json!({
            "signer_uuid": signer_id,
            "text": text,
            "parent": parent_hash,
            "embeds": embeds.iter().map(|url| json!({ "url": url })).collect::<Vec<_>>(),
        });

        let resp = self
            .client
            .post(format!("{}/cast", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_status(resp.status(), "publish reply"));
        }

        let envelope: PublishEnvelope = resp.json().await?;
        Ok(envelope.cast.hash)
    }
}
