use async_trait::async_trait;
use serde::Deserialize;

use super::{ClientError, ContentStorage, error_for_status};

/// IPFS pinning through a hosted gateway.
pub struct PinningClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl PinningClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct PinResponse {
    cid: String,
}

#[async_trait]
impl ContentStorage for PinningClient {
    async fn store(&self, bytes: Vec<u8>, filename: &str) -> Result<String, ClientError> {
        let resp = self
            .client
            .post(format!("{}/pin", self.base_url))
            .query(&[("filename", filename)])
            .bearer_auth(&self.token)
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_status(
                resp.status(),
                &format!("pin {filename}"),
            ));
        }

        let pinned: PinResponse = resp.json().await?;
        Ok(format!("ipfs://{}", pinned.cid))
    }
}
