use async_trait::async_trait;
use serde_json::json;

use super::{
    ClientError, CreatedSplit, MintService, MintedToken, PredictedSplit, SplitConfig,
    SplitService, error_for_status,
};

/// Split deployment and token minting through a transaction relay service.
/// The relay owns keys and gas handling; from here both operations are
/// opaque remote calls that return an address/hash or fail.
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RelayClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(90))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl SplitService for RelayClient {
    async fn predict_target(&self, config: &SplitConfig) -> Result<PredictedSplit, ClientError> {
        let resp = self
            .client
            .post(format!("{}/splits/predict", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(config)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_status(resp.status(), "predict split"));
        }
        Ok(resp.json().await?)
    }

    async fn create_target(&self, config: &SplitConfig) -> Result<CreatedSplit, ClientError> {
        let resp = self
            .client
            .post(format!("{}/splits", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(config)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_status(resp.status(), "create split"));
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl MintService for RelayClient {
    async fn mint(
        &self,
        contract_address: &str,
        metadata_uri: &str,
        payout_address: &str,
    ) -> Result<MintedToken, ClientError> {
        let resp = self
            .client
            .post(format!("{}/mint", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&json!({
                "contract_address": contract_address,
                "metadata_uri": metadata_uri,
                "payout_address": payout_address,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_status(resp.status(), "mint token"));
        }
        Ok(resp.json().await?)
    }
}
