use std::collections::{HashMap, HashSet, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tokio::sync::{Notify, watch};

use castmint::clients::{
    AssetRenderer, Cast, ClientError, ContentStorage, CreatedSplit, MintService, MintedToken,
    PredictedSplit, SocialClient, SplitConfig, SplitService,
};
use castmint::config::Config;
use castmint::dedup::DedupGate;
use castmint::health::HealthMonitor;
use castmint::history::HistoryStore;
use castmint::models::{Identity, MintRecord};
use castmint::pipeline::MintPipeline;
use castmint::state::{AppState, SharedState};
use castmint::store::{QueueStore, StoreError};
use castmint::worker::Worker;

pub const TEST_SECRET: &str = "test-webhook-secret";
pub const TEST_CONTRACT: &str = "0xc0ffee0000000000000000000000000000000000";
pub const TEST_PLATFORM: &str = "0x9999999999999999999999999999999999999999";

// ── In-memory collaborators ─────────────────────────────────────

/// Queue store over in-process maps, same list/set semantics as the
/// Postgres one. `fail` simulates a store outage for every operation.
#[derive(Default)]
pub struct MemoryStore {
    lists: Mutex<HashMap<String, VecDeque<String>>>,
    sets: Mutex<HashMap<String, HashSet<String>>>,
    pub fail: AtomicBool,
}

impl MemoryStore {
    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn push_front(&self, list: &str, payload: &str) -> Result<usize, StoreError> {
        self.check()?;
        let mut lists = self.lists.lock().unwrap();
        let entries = lists.entry(list.to_string()).or_default();
        entries.push_front(payload.to_string());
        Ok(entries.len())
    }

    async fn pop_back(&self, list: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        let mut lists = self.lists.lock().unwrap();
        Ok(lists.get_mut(list).and_then(|entries| entries.pop_back()))
    }

    async fn peek_range(
        &self,
        list: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StoreError> {
        self.check()?;
        let lists = self.lists.lock().unwrap();
        let entries: Vec<String> = lists
            .get(list)
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default();
        let start = start.max(0) as usize;
        let end = if stop < 0 {
            entries.len()
        } else {
            ((stop + 1) as usize).min(entries.len())
        };
        Ok(entries
            .get(start..end.max(start))
            .map(|s| s.to_vec())
            .unwrap_or_default())
    }

    async fn add_to_set(&self, set: &str, member: &str) -> Result<(), StoreError> {
        self.check()?;
        let mut sets = self.sets.lock().unwrap();
        sets.entry(set.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn is_member(&self, set: &str, member: &str) -> Result<bool, StoreError> {
        self.check()?;
        let sets = self.sets.lock().unwrap();
        Ok(sets.get(set).is_some_and(|s| s.contains(member)))
    }
}

#[derive(Default)]
pub struct MemoryHistory {
    records: Mutex<HashMap<String, MintRecord>>,
    pub fail_writes: AtomicBool,
}

impl MemoryHistory {
    pub fn get(&self, target_hash: &str) -> Option<MintRecord> {
        self.records.lock().unwrap().get(target_hash).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn insert(&self, record: MintRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.target_hash.clone(), record);
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn record_result(&self, record: &MintRecord) -> Result<(), ClientError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClientError::Semantic(
                "simulated history outage".to_string(),
            ));
        }
        let mut records = self.records.lock().unwrap();
        records
            .entry(record.target_hash.clone())
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn lookup_result(&self, target_hash: &str) -> Result<Option<MintRecord>, ClientError> {
        Ok(self.records.lock().unwrap().get(target_hash).cloned())
    }
}

#[derive(Default)]
pub struct FakeSocial {
    casts: Mutex<HashMap<String, Cast>>,
    pub replies: Mutex<Vec<(String, String)>>,
}

impl FakeSocial {
    pub fn insert_cast(&self, cast: Cast) {
        self.casts.lock().unwrap().insert(cast.hash.clone(), cast);
    }

    pub fn reply_count(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl SocialClient for FakeSocial {
    async fn fetch_cast(&self, hash: &str) -> Result<Cast, ClientError> {
        self.casts
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("cast {hash}")))
    }

    async fn publish_reply(
        &self,
        _signer_id: &str,
        text: &str,
        parent_hash: &str,
        _embeds: &[String],
    ) -> Result<String, ClientError> {
        let mut replies = self.replies.lock().unwrap();
        replies.push((parent_hash.to_string(), text.to_string()));
        Ok(format!("0xreply{}", replies.len()))
    }
}

pub struct FakeRenderer;

#[async_trait]
impl AssetRenderer for FakeRenderer {
    async fn render(&self, _cast: &Cast) -> Result<Vec<u8>, ClientError> {
        Ok(b"png-bytes".to_vec())
    }
}

#[derive(Default)]
pub struct FakeStorage {
    counter: AtomicU32,
}

#[async_trait]
impl ContentStorage for FakeStorage {
    async fn store(&self, _bytes: Vec<u8>, filename: &str) -> Result<String, ClientError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("ipfs://test{n}/{filename}"))
    }
}

/// Split + mint relay with deterministic split addresses derived from the
/// config, so prediction is stable across calls. `mint_transport_failures`
/// makes the next N mint calls fail with a transport error.
#[derive(Default)]
pub struct FakeChain {
    pub created_splits: Mutex<Vec<SplitConfig>>,
    pub mint_calls: AtomicU32,
    pub mint_transport_failures: AtomicU32,
    next_token: AtomicI64,
}

pub fn split_address(config: &SplitConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(config).unwrap());
    format!("0x{}", hex::encode(&hasher.finalize()[..20]))
}

#[async_trait]
impl SplitService for FakeChain {
    async fn predict_target(&self, config: &SplitConfig) -> Result<PredictedSplit, ClientError> {
        let exists = self.created_splits.lock().unwrap().contains(config);
        Ok(PredictedSplit {
            address: split_address(config),
            exists,
        })
    }

    async fn create_target(&self, config: &SplitConfig) -> Result<CreatedSplit, ClientError> {
        let mut created = self.created_splits.lock().unwrap();
        if !created.contains(config) {
            created.push(config.clone());
        }
        Ok(CreatedSplit {
            address: split_address(config),
            tx_hash: "0xsplit".to_string(),
        })
    }
}

#[async_trait]
impl MintService for FakeChain {
    async fn mint(
        &self,
        _contract_address: &str,
        _metadata_uri: &str,
        _payout_address: &str,
    ) -> Result<MintedToken, ClientError> {
        self.mint_calls.fetch_add(1, Ordering::SeqCst);
        if self.mint_transport_failures.load(Ordering::SeqCst) > 0 {
            self.mint_transport_failures.fetch_sub(1, Ordering::SeqCst);
            return Err(ClientError::Transport("connection reset".to_string()));
        }
        let token_id = self.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MintedToken {
            token_id,
            tx_hash: format!("0xtx{token_id}"),
        })
    }
}

// ── Test server ─────────────────────────────────────────────────

/// A running app instance wired to in-memory collaborators, plus handles to
/// inspect and drive them.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    pub history: Arc<MemoryHistory>,
    pub social: Arc<FakeSocial>,
    pub chain: Arc<FakeChain>,
    pub health: Arc<HealthMonitor>,
    shutdown_tx: watch::Sender<bool>,
    worker_handle: tokio::task::JoinHandle<()>,
    server_handle: tokio::task::JoinHandle<()>,
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        webhook_secret: TEST_SECRET.to_string(),
        host: [127, 0, 0, 1].into(),
        port: 0,
        log_level: "warn".to_string(),
        max_body_size: 1024 * 1024,
        poll_interval_ms: 25,
        min_user_score: 0.5,
        bot_handle: "castmint".to_string(),
        signer_id: "signer-test".to_string(),
        farcaster_api_url: "http://unused".to_string(),
        farcaster_api_key: "unused".to_string(),
        renderer_url: "http://unused".to_string(),
        storage_url: "http://unused".to_string(),
        storage_token: "unused".to_string(),
        relay_url: "http://unused".to_string(),
        relay_api_key: "unused".to_string(),
        contract_address: TEST_CONTRACT.to_string(),
        platform_address: TEST_PLATFORM.to_string(),
    }
}

pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let history = Arc::new(MemoryHistory::default());
    let social = Arc::new(FakeSocial::default());
    let chain = Arc::new(FakeChain::default());
    let health = Arc::new(HealthMonitor::new());
    let wake = Arc::new(Notify::new());

    let store_dyn: Arc<dyn QueueStore> = store.clone();
    let history_dyn: Arc<dyn HistoryStore> = history.clone();
    let dedup = DedupGate::new(store_dyn.clone());
    let config = test_config();

    let pipeline = MintPipeline::new(
        social.clone(),
        Arc::new(FakeRenderer),
        Arc::new(FakeStorage::default()),
        chain.clone(),
        chain.clone(),
        history_dyn.clone(),
        dedup.clone(),
        config.contract_address.clone(),
        config.platform_address.clone(),
        config.signer_id.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = Worker::new(
        store_dyn.clone(),
        pipeline,
        health.clone(),
        wake.clone(),
        Duration::from_millis(config.poll_interval_ms),
    );
    let worker_handle = worker.spawn(shutdown_rx);

    let state: SharedState = Arc::new(AppState {
        config,
        store: store_dyn,
        history: history_dyn,
        dedup,
        health: health.clone(),
        wake,
    });
    let app = castmint::build_app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });

    TestApp {
        addr,
        client: reqwest::Client::new(),
        store,
        history,
        social,
        chain,
        health,
        shutdown_tx,
        worker_handle,
        server_handle,
    }
}

pub async fn cleanup(app: TestApp) {
    let _ = app.shutdown_tx.send(true);
    let _ = app.worker_handle.await;
    app.server_handle.abort();
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a payload to /webhook with a valid signature.
    pub async fn post_webhook(&self, payload: &Value) -> reqwest::Response {
        let raw = serde_json::to_vec(payload).unwrap();
        let timestamp = Utc::now().timestamp().to_string();
        let sig = castmint::signature::sign(TEST_SECRET, &timestamp, &raw);
        self.client
            .post(self.url("/webhook"))
            .header("x-castmint-signature", sig)
            .header("x-castmint-timestamp", timestamp)
            .header("content-type", "application/json")
            .body(raw)
            .send()
            .await
            .expect("webhook request failed")
    }

    /// Seed the social fake with a target cast owned by `owner`.
    pub fn seed_target(&self, hash: &str, owner: Identity) {
        self.social.insert_cast(Cast {
            hash: hash.to_string(),
            text: "gm".to_string(),
            author: owner,
            embeds: vec![],
        });
    }
}

/// A cast.created event carrying a mint command in reply to `parent_hash`.
pub fn mint_event(
    cast_hash: &str,
    parent_hash: &str,
    requester_fid: i64,
    requester_address: Option<&str>,
    score: f64,
) -> Value {
    json!({
        "type": "cast.created",
        "data": {
            "hash": cast_hash,
            "text": "@castmint mint",
            "parent_hash": parent_hash,
            "parent_author": { "fid": 99 },
            "timestamp": "2026-01-01T00:00:00Z",
            "author": {
                "fid": requester_fid,
                "username": format!("user{requester_fid}"),
                "score": score,
                "verified_addresses": {
                    "eth_addresses": requester_address.map(|a| vec![a.to_string()]).unwrap_or_default(),
                },
            },
        },
    })
}

pub fn identity(fid: i64, address: Option<&str>) -> Identity {
    Identity {
        fid,
        username: format!("user{fid}"),
        payable_address: address.map(|a| a.to_string()),
    }
}

/// Poll `check` until it returns true or `timeout_ms` elapses.
pub async fn wait_until<F: Fn() -> bool>(check: F, timeout_ms: u64) -> bool {
    let deadline = std::time::Instant::now() + Duration::from_millis(timeout_ms);
    while std::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
