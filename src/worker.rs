use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, watch};

use crate::health::HealthMonitor;
use crate::models::{FailedWorkItem, WorkerStatus};
use crate::pipeline::{MintPipeline, PipelineOutcome};
use crate::queue;
use crate::store::{QueueStore, StoreError};

/// The single consumer of the pending list. Exactly one instance runs per
/// process, so at most one pipeline execution is ever in flight.
pub struct Worker {
    store: Arc<dyn QueueStore>,
    pipeline: MintPipeline,
    health: Arc<HealthMonitor>,
    wake: Arc<Notify>,
    poll_interval: Duration,
}

impl Worker {
    pub fn new(
        store: Arc<dyn QueueStore>,
        pipeline: MintPipeline,
        health: Arc<HealthMonitor>,
        wake: Arc<Notify>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            pipeline,
            health,
            wake,
            poll_interval,
        }
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Poll loop: dequeue, run the pipeline, repeat. Each iteration waits
    /// the fixed poll interval regardless of outcome; an enqueue wakes the
    /// loop early. A pipeline failure routes the item to the failed list and
    /// never stops the loop. On shutdown the in-flight item finishes before
    /// the task exits.
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Mint worker started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.process_next().await {
                tracing::error!("Worker queue error: {e}");
                self.health.record_error(e.to_string());
            }
            self.refresh_depths().await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.wake.notified() => {}
                _ = shutdown.changed() => {}
            }
        }

        self.health.set_status(WorkerStatus::ShuttingDown);
        tracing::info!("Mint worker stopped");
    }

    /// Dequeue and process at most one item.
    async fn process_next(&self) -> Result<(), StoreError> {
        let item = match queue::dequeue(&*self.store).await? {
            Some(item) => item,
            None => {
                self.health.set_status(WorkerStatus::Idle);
                return Ok(());
            }
        };

        self.health.set_status(WorkerStatus::Processing);
        tracing::info!(
            target_hash = %item.target_hash,
            requester_fid = item.requester.fid,
            "Processing mint request"
        );

        match self.pipeline.run(&item).await {
            Ok(PipelineOutcome::Minted(record)) => {
                tracing::info!(
                    target_hash = %record.target_hash,
                    token_id = record.token_id,
                    "Mint completed"
                );
                self.health.record_success();
            }
            Ok(PipelineOutcome::Skipped) => {
                tracing::info!(
                    target_hash = %item.target_hash,
                    "Target already minted, skipping"
                );
                self.health.record_success();
            }
            Err(e) => {
                tracing::error!(target_hash = %item.target_hash, "Pipeline failed: {e}");
                self.health.record_error(e.to_string());
                let failed = FailedWorkItem::new(item, e.to_string());
                if let Err(push_err) = queue::push_failed(&*self.store, &failed).await {
                    tracing::error!("Failed to record failed item: {push_err}");
                }
            }
        }

        Ok(())
    }

    async fn refresh_depths(&self) {
        match queue::depths(&*self.store).await {
            Ok((pending, failed)) => self.health.set_queue_depths(pending, failed),
            Err(e) => tracing::warn!("Could not refresh queue depths: {e}"),
        }
    }
}
