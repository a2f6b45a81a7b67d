use std::sync::Arc;

use tokio::sync::Notify;

use crate::config::Config;
use crate::dedup::DedupGate;
use crate::health::HealthMonitor;
use crate::history::HistoryStore;
use crate::store::QueueStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn QueueStore>,
    pub history: Arc<dyn HistoryStore>,
    pub dedup: DedupGate,
    pub health: Arc<HealthMonitor>,
    /// Wakes the worker immediately after an enqueue instead of waiting out
    /// the poll interval.
    pub wake: Arc<Notify>,
}
