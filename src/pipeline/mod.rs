pub mod metadata;
pub mod splits;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::clients::{
    AssetRenderer, ClientError, ContentStorage, MintService, SocialClient, SplitService,
};
use crate::dedup::DedupGate;
use crate::history::HistoryStore;
use crate::models::{MintRecord, WorkItem};
use crate::store::StoreError;

/// Per-call timeout, distinct from transport failures: an attempt that runs
/// past this is aborted and retried under the step's own retry policy.
const CALL_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;
const RETRY_MAX_DELAY_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ValidateRequester,
    ResolveTarget,
    RenderAsset,
    PinAsset,
    PinMetadata,
    ResolveSplit,
    MintToken,
    RecordResult,
    Reply,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::ValidateRequester => "validate_requester",
            Step::ResolveTarget => "resolve_target",
            Step::RenderAsset => "render_asset",
            Step::PinAsset => "pin_asset",
            Step::PinMetadata => "pin_metadata",
            Step::ResolveSplit => "resolve_split",
            Step::MintToken => "mint_token",
            Step::RecordResult => "record_result",
            Step::Reply => "reply",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline failure, annotated with the step that failed and the item's
/// target hash before it reaches the failed list.
#[derive(Debug)]
pub struct PipelineError {
    pub step: Step,
    pub target_hash: String,
    pub kind: ErrorKind,
}

#[derive(Debug)]
pub enum ErrorKind {
    /// Terminal for the item; never retried at any layer.
    Validation(String),
    Client(ClientError),
    Store(StoreError),
}

impl PipelineError {
    fn validation(step: Step, target_hash: &str, message: impl Into<String>) -> Self {
        Self {
            step,
            target_hash: target_hash.to_string(),
            kind: ErrorKind::Validation(message.into()),
        }
    }

    fn client(step: Step, target_hash: &str, err: ClientError) -> Self {
        Self {
            step,
            target_hash: target_hash.to_string(),
            kind: ErrorKind::Client(err),
        }
    }

    fn store(step: Step, target_hash: &str, err: StoreError) -> Self {
        Self {
            step,
            target_hash: target_hash.to_string(),
            kind: ErrorKind::Store(err),
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let detail = match &self.kind {
            ErrorKind::Validation(msg) => msg.clone(),
            ErrorKind::Client(err) => err.to_string(),
            ErrorKind::Store(err) => err.to_string(),
        };
        write!(
            f,
            "step {} failed for target {}: {detail}",
            self.step, self.target_hash
        )
    }
}

impl std::error::Error for PipelineError {}

#[derive(Debug)]
pub enum PipelineOutcome {
    Minted(MintRecord),
    /// The target already has a completed mint; the item was dropped without
    /// side effects.
    Skipped,
}

/// Run `op` under the per-call timeout, retrying transient failures with
/// capped-exponential backoff. Semantic and validation failures surface
/// immediately.
async fn with_retry<T, F, Fut>(step: Step, target_hash: &str, mut op: F) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0u32;
    loop {
        let result = match tokio::time::timeout(CALL_TIMEOUT, op()).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(format!(
                "no response within {}s",
                CALL_TIMEOUT.as_secs()
            ))),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt + 1 < RETRY_ATTEMPTS => {
                let delay = (RETRY_BASE_DELAY_MS * 2u64.pow(attempt)).min(RETRY_MAX_DELAY_MS);
                tracing::warn!(
                    step = %step,
                    target_hash,
                    attempt = attempt + 1,
                    "call failed ({err}), retrying in {delay}ms"
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
                attempt += 1;
            }
            Err(err) => return Err(PipelineError::client(step, target_hash, err)),
        }
    }
}

/// The ordered mint sequence. Each step consumes the previous step's output;
/// any error aborts the remaining steps for the item, except the final
/// reply, which is best-effort.
pub struct MintPipeline {
    social: Arc<dyn SocialClient>,
    renderer: Arc<dyn AssetRenderer>,
    storage: Arc<dyn ContentStorage>,
    splits: Arc<dyn SplitService>,
    minter: Arc<dyn MintService>,
    history: Arc<dyn HistoryStore>,
    dedup: DedupGate,
    contract_address: String,
    platform_address: String,
    signer_id: String,
}

impl MintPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        social: Arc<dyn SocialClient>,
        renderer: Arc<dyn AssetRenderer>,
        storage: Arc<dyn ContentStorage>,
        splits: Arc<dyn SplitService>,
        minter: Arc<dyn MintService>,
        history: Arc<dyn HistoryStore>,
        dedup: DedupGate,
        contract_address: String,
        platform_address: String,
        signer_id: String,
    ) -> Self {
        Self {
            social,
            renderer,
            storage,
            splits,
            minter,
            history,
            dedup,
            contract_address,
            platform_address,
            signer_id,
        }
    }

    pub async fn run(&self, item: &WorkItem) -> Result<PipelineOutcome, PipelineError> {
        let target = item.target_hash.as_str();

        // Entry re-check: duplicate enqueues for the same target can race
        // past the ingestion-time checks; catching them here prevents a
        // second token for the same cast.
        if self
            .dedup
            .is_target_processed(target)
            .await
            .map_err(|e| PipelineError::store(Step::ValidateRequester, target, e))?
        {
            return Ok(PipelineOutcome::Skipped);
        }
        let existing = with_retry(Step::ValidateRequester, target, || {
            self.history.lookup_result(target)
        })
        .await?;
        if existing.is_some() {
            return Ok(PipelineOutcome::Skipped);
        }

        // Step 1: the requester must be payable before anything is spent.
        let requester_address = item
            .requester
            .payable_address
            .clone()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                PipelineError::validation(
                    Step::ValidateRequester,
                    target,
                    format!(
                        "requester fid {} has no payable address",
                        item.requester.fid
                    ),
                )
            })?;

        // Step 2: resolve the target cast and its owner.
        let cast = with_retry(Step::ResolveTarget, target, || {
            self.social.fetch_cast(target)
        })
        .await?;
        let owner = cast.author.clone();
        let owner_address = owner.payable_address.clone().filter(|a| !a.is_empty()).ok_or_else(|| {
            PipelineError::validation(
                Step::ResolveTarget,
                target,
                format!("target owner fid {} has no payable address", owner.fid),
            )
        })?;

        // Step 3: render the cast image.
        let image = with_retry(Step::RenderAsset, target, || self.renderer.render(&cast)).await?;

        // Step 4: pin the image.
        let asset_filename = format!("{target}.png");
        let asset_uri = with_retry(Step::PinAsset, target, || {
            self.storage.store(image.clone(), &asset_filename)
        })
        .await?;

        // Step 5: compose and pin the metadata document.
        let document = metadata::compose(&cast, &item.requester, &asset_uri);
        let document_bytes = serde_json::to_vec(&document).map_err(|e| {
            PipelineError::store(Step::PinMetadata, target, StoreError::Codec(e.to_string()))
        })?;
        let metadata_filename = format!("{target}.json");
        let metadata_uri = with_retry(Step::PinMetadata, target, || {
            self.storage.store(document_bytes.clone(), &metadata_filename)
        })
        .await?;

        // Step 6: resolve or create the revenue split. Deterministic config,
        // so an existing split for the same participants is reused.
        let split = splits::split_config(&owner_address, &requester_address, &self.platform_address);
        let predicted = with_retry(Step::ResolveSplit, target, || {
            self.splits.predict_target(&split)
        })
        .await?;
        let payout_address = if predicted.exists {
            predicted.address
        } else {
            with_retry(Step::ResolveSplit, target, || {
                self.splits.create_target(&split)
            })
            .await?
            .address
        };

        // Step 7: mint.
        let minted = with_retry(Step::MintToken, target, || {
            self.minter
                .mint(&self.contract_address, &metadata_uri, &payout_address)
        })
        .await?;

        // Step 8: record, then mark the dedup set. The order matters: a mark
        // without a record would incorrectly block retries; a record without
        // a mark is healed by the history lookup above.
        let record = MintRecord {
            target_hash: target.to_string(),
            asset_uri,
            metadata_uri: metadata_uri.clone(),
            requester_fid: item.requester.fid,
            owner_fid: owner.fid,
            contract_address: self.contract_address.clone(),
            token_id: minted.token_id,
            tx_hash: minted.tx_hash.clone(),
            minted_at: Utc::now(),
        };
        with_retry(Step::RecordResult, target, || {
            self.history.record_result(&record)
        })
        .await?;
        self.dedup
            .mark_target_processed(target)
            .await
            .map_err(|e| PipelineError::store(Step::RecordResult, target, e))?;

        // Step 9: confirmation reply. Best-effort: the mint is already
        // durable, so a failure here is logged and swallowed.
        let reply_text = format!(
            "Minted! @{}'s cast is now token #{} on {}.",
            owner.username, minted.token_id, self.contract_address
        );
        if let Err(err) = with_retry(Step::Reply, target, || {
            self.social
                .publish_reply(&self.signer_id, &reply_text, &item.work_hash, &[])
        })
        .await
        {
            tracing::warn!(target_hash = target, "confirmation reply failed: {err}");
        }

        Ok(PipelineOutcome::Minted(record))
    }
}
