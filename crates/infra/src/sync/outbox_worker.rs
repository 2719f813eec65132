//! Outbox worker for periodic batch processing and forwarding.
//!
//! Polls the SQLCipher-backed outbox queue for pending time entries, forwards
//! each entry to the Neon domain API, and updates local outbox status based on
//! the outcome. The implementation follows the runtime rules captured in
//! `CLAUDE.md`: join handles are tracked, cancellation is explicit, and every
//! asynchronous operation is wrapped in a timeout. SAP-bound entries are
//! handled by the dedicated `SapScheduler`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use pulsearc_infra::observability::metrics::PerformanceMetrics;
//! use pulsearc_infra::sync::{OutboxWorker, OutboxWorkerConfig};
//!
//! # async fn example() -> Result<(), String> {
//! let metrics = Arc::new(PerformanceMetrics::new());
//! // ... create outbox_repo and Neon client ...
//! # let outbox_repo = todo!(); // Arc<dyn OutboxQueue>
//! # let neon_client = todo!(); // Arc<NeonClient>
//! let mut worker = OutboxWorker::new(
//!     outbox_repo,
//!     neon_client,
//!     OutboxWorkerConfig {
//!         batch_size: 50,
//!         poll_interval: Duration::from_secs(60),
//!         ..Default::default()
//!     },
//!     metrics.clone(),
//! );
//!
//! worker.start().await?;
//! // ... application runs ...
//! worker.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pulsearc_core::OutboxQueue;
use pulsearc_domain::types::{PrismaTimeEntryDto, TimeEntryOutbox};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::observability::metrics::PerformanceMetrics;
use crate::observability::MetricsResult;
use crate::sync::errors::SyncError;
use crate::sync::neon_client::NeonClient;

/// Configuration for the outbox worker.
#[derive(Debug, Clone)]
pub struct OutboxWorkerConfig {
    /// Maximum number of entries to process per batch
    pub batch_size: usize,
    /// Interval between polling attempts
    pub poll_interval: Duration,
    /// Timeout for processing a single batch
    pub processing_timeout: Duration,
    /// Maximum retry attempts before marking as permanently failed
    pub max_retries: usize,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for OutboxWorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            poll_interval: Duration::from_secs(60),
            processing_timeout: Duration::from_secs(300),
            max_retries: 3,
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Interface for submitting time entries to a remote destination.
#[async_trait]
pub trait TimeEntryForwarder: Send + Sync {
    /// Forward a time entry payload using the provided idempotency key.
    async fn forward_time_entry(
        &self,
        dto: &PrismaTimeEntryDto,
        idempotency_key: &str,
    ) -> Result<String, SyncError>;
}

#[async_trait]
impl TimeEntryForwarder for NeonClient {
    async fn forward_time_entry(
        &self,
        dto: &PrismaTimeEntryDto,
        idempotency_key: &str,
    ) -> Result<String, SyncError> {
        self.submit_time_entry(dto, idempotency_key).await
    }
}

/// Outbox worker with explicit lifecycle management.
pub struct OutboxWorker {
    outbox_repo: Arc<dyn OutboxQueue>,
    forwarder: Arc<dyn TimeEntryForwarder>,
    config: OutboxWorkerConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
    metrics: Arc<PerformanceMetrics>,
}

impl OutboxWorker {
    /// Create a new outbox worker with the given configuration.
    pub fn new(
        outbox_repo: Arc<dyn OutboxQueue>,
        forwarder: Arc<dyn TimeEntryForwarder>,
        config: OutboxWorkerConfig,
        metrics: Arc<PerformanceMetrics>,
    ) -> Self {
        Self {
            outbox_repo,
            forwarder,
            config,
            cancellation: CancellationToken::new(),
            task_handle: None,
            metrics,
        }
    }

    /// Start the worker, spawning the background processing task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), String> {
        if self.is_running() {
            return Err("Worker already running".to_string());
        }

        info!("Starting outbox worker");

        // Create fresh cancellation token
        self.cancellation = CancellationToken::new();

        let outbox_repo = Arc::clone(&self.outbox_repo);
        let forwarder = Arc::clone(&self.forwarder);
        let poll_interval = self.config.poll_interval;
        let batch_size = self.config.batch_size;
        let processing_timeout = self.config.processing_timeout;
        let cancel = self.cancellation.clone();
        let metrics = Arc::clone(&self.metrics);

        let handle = tokio::spawn(async move {
            Self::process_loop(
                outbox_repo,
                forwarder,
                poll_interval,
                batch_size,
                processing_timeout,
                cancel,
                metrics,
            )
            .await;
        });

        self.task_handle = Some(handle);
        info!("Outbox worker started");
        log_metric(self.metrics.record_call(), "outbox_worker.start");

        Ok(())
    }

    /// Stop the worker and wait for the processing task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<(), String> {
        if !self.is_running() {
            return Err("Worker not running".to_string());
        }

        info!("Stopping outbox worker");

        // Cancel background task
        self.cancellation.cancel();

        // Await join handle with timeout
        if let Some(handle) = self.task_handle.take() {
            let join_timeout = self.config.join_timeout;
            match tokio::time::timeout(join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Worker task panicked: {}", e);
                    return Err("Worker task panicked".to_string());
                }
                Err(_) => {
                    warn!("Worker task did not complete within timeout");
                    return Err("Worker task timeout".to_string());
                }
            }
        }

        info!("Outbox worker stopped");
        self.cancellation = CancellationToken::new();
        log_metric(self.metrics.record_call(), "outbox_worker.stop");

        Ok(())
    }

    /// Returns true when a worker instance is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Background processing loop.
    #[allow(clippy::too_many_arguments)]
    async fn process_loop(
        outbox_repo: Arc<dyn OutboxQueue>,
        forwarder: Arc<dyn TimeEntryForwarder>,
        poll_interval: Duration,
        batch_size: usize,
        processing_timeout: Duration,
        cancel: CancellationToken,
        metrics: Arc<PerformanceMetrics>,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Outbox worker process loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(poll_interval) => {
                    log_metric(metrics.record_call(), "outbox_worker.tick");
                    let started = Instant::now();

                    match tokio::time::timeout(
                        processing_timeout,
                        Self::process_batch(&outbox_repo, &forwarder, batch_size, &metrics),
                    )
                    .await
                    {
                        Ok(Ok(())) => {
                            log_metric(
                                metrics.record_fetch_time(started.elapsed()),
                                "outbox_worker.batch.duration",
                            );
                        }
                        Ok(Err(e)) => {
                            error!(error = %e, "Batch processing failed");
                            log_metric(metrics.record_fetch_error(), "outbox_worker.batch.error");
                            log_metric(
                                metrics.record_fetch_time(started.elapsed()),
                                "outbox_worker.batch.duration",
                            );
                        }
                        Err(_) => {
                            warn!(timeout_secs = processing_timeout.as_secs(), "Batch processing timed out");
                            log_metric(metrics.record_fetch_timeout(), "outbox_worker.batch.timeout");
                        }
                    }
                }
            }
        }
    }

    /// Process a single batch of outbox entries.
    async fn process_batch(
        outbox_repo: &Arc<dyn OutboxQueue>,
        forwarder: &Arc<dyn TimeEntryForwarder>,
        batch_size: usize,
        metrics: &Arc<PerformanceMetrics>,
    ) -> Result<(), String> {
        // Dequeue pending entries (status = 'pending' and past retry window)
        let entries = outbox_repo
            .dequeue_batch(batch_size)
            .await
            .map_err(|e| format!("Failed to dequeue batch: {e}"))?;

        if entries.is_empty() {
            debug!("No pending entries to process");
            return Ok(());
        }

        info!(count = entries.len(), "Processing outbox batch");

        let mut fatal_errors: Vec<String> = Vec::new();
        let mut forwarded = 0_u32;
        let mut failures = 0_u32;
        let mut skipped = 0_u32;

        for entry in entries {
            if entry.target.eq_ignore_ascii_case("sap") {
                debug!(entry_id = %entry.id, "Skipping SAP-target outbox entry");
                skipped = skipped.saturating_add(1);
                continue;
            }

            let dto = match parse_time_entry(&entry) {
                Ok(dto) => dto,
                Err(err) => {
                    warn!(
                        entry_id = %entry.id,
                        error = %err,
                        "Failed to parse outbox payload"
                    );
                    if let Err(mark_err) =
                        outbox_repo.mark_failed(&entry.id, &truncate_reason(&err.to_string())).await
                    {
                        let msg = mark_err.to_string();
                        warn!(entry_id = %entry.id, error = %msg, "mark_failed failed");
                        fatal_errors.push(format!("mark_failed error for {}: {}", entry.id, msg));
                    }
                    failures = failures.saturating_add(1);
                    continue;
                }
            };

            match forwarder.forward_time_entry(&dto, &entry.idempotency_key).await {
                Ok(remote_id) => {
                    debug!(
                        entry_id = %entry.id,
                        remote_id = %remote_id,
                        "Forwarded outbox entry"
                    );
                    if let Err(err) = outbox_repo.mark_sent(&entry.id).await {
                        let msg = err.to_string();
                        warn!(entry_id = %entry.id, error = %msg, "mark_sent failed");
                        fatal_errors.push(format!("mark_sent error for {}: {}", entry.id, msg));
                    } else {
                        forwarded = forwarded.saturating_add(1);
                    }
                }
                Err(err) => {
                    warn!(
                        entry_id = %entry.id,
                        error = ?err,
                        "Forwarding outbox entry failed"
                    );
                    if let Err(mark_err) =
                        outbox_repo.mark_failed(&entry.id, &truncate_reason(&err.to_string())).await
                    {
                        let msg = mark_err.to_string();
                        warn!(entry_id = %entry.id, error = %msg, "mark_failed failed");
                        fatal_errors.push(format!("mark_failed error for {}: {}", entry.id, msg));
                    }
                    failures = failures.saturating_add(1);
                }
            }
        }

        log_metric(metrics.record_call(), "outbox_worker.batch.processed");
        debug!(
            forwarded = forwarded,
            failures = failures,
            skipped = skipped,
            "Outbox batch completed"
        );

        if failures > 0 {
            log_metric(metrics.record_fetch_error(), "outbox_worker.batch.failure_count");
        }

        if !fatal_errors.is_empty() {
            return Err(fatal_errors.join("; "));
        }

        Ok(())
    }
}

fn parse_time_entry(entry: &TimeEntryOutbox) -> Result<PrismaTimeEntryDto, serde_json::Error> {
    serde_json::from_str(&entry.payload_json)
}

fn truncate_reason(reason: &str) -> String {
    const MAX_LEN: usize = 256;
    if reason.len() <= MAX_LEN {
        return reason.to_string();
    }

    let mut truncated = reason.chars().take(MAX_LEN.saturating_sub(3)).collect::<String>();
    truncated.push_str("...");
    truncated
}

fn log_metric(result: MetricsResult<()>, metric: &'static str) {
    if let Err(err) = result {
        warn!(metric = metric, error = ?err, "Failed to record worker metric");
    }
}

impl Drop for OutboxWorker {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("OutboxWorker dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
