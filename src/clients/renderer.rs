use async_trait::async_trait;
use serde_json::json;

use super::{AssetRenderer, Cast, ClientError, error_for_status};

/// Renders a cast into a PNG via an external image service.
pub struct HttpRenderer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRenderer {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AssetRenderer for HttpRenderer {
    async fn render(&self, cast: &Cast) -> Result<Vec<u8>, ClientError> {
        let resp = self
            .client
            .post(format!("{}/render", self.base_url))
            .json(&json!({
                "hash": cast.hash,
                "text": cast.text,
                "username": cast.author.username,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_status(
                resp.status(),
                &format!("render {}", cast.hash),
            ));
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
