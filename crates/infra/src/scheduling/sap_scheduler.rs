//! SAP time entry scheduler for periodic outbox processing.
//!
//! Provides a cron-based scheduler that triggers SAP batch forwarding at fixed
//! intervals. The implementation follows the runtime rules captured in
//! `CLAUDE.md`: join handles are tracked, cancellation is explicit, and every
//! asynchronous operation is wrapped in a timeout.
//!
//! Feature-gated behind `sap` feature flag.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use pulsearc_infra::observability::metrics::PerformanceMetrics;
//! use pulsearc_infra::scheduling::{SapScheduler, SapSchedulerConfig, SchedulerResult};
//!
//! # async fn example() -> SchedulerResult<()> {
//! let metrics = Arc::new(PerformanceMetrics::new());
//! // ... create batch_forwarder and outbox_repo ...
//! # let batch_forwarder = todo!();
//! # let outbox_repo = todo!();
//! let mut scheduler = SapScheduler::with_config(
//!     SapSchedulerConfig {
//!         cron_expression: "0 */30 * * * *".into(), // every 30 minutes
//!         ..Default::default()
//!     },
//!     batch_forwarder,
//!     outbox_repo,
//!     metrics,
//! )?;
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use pulsearc_core::OutboxQueue as OutboxQueuePort;
use pulsearc_domain::PulseArcError;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::integrations::sap::BatchForwarder;
use crate::observability::metrics::PerformanceMetrics;
use crate::observability::MetricsResult;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the SAP scheduler.
#[derive(Debug, Clone)]
pub struct SapSchedulerConfig {
    /// Cron expression describing the execution schedule.
    pub cron_expression: String,
    /// Maximum number of entries to process per batch.
    pub batch_size: usize,
    /// Timeout applied to a single batch processing execution.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for SapSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: "0 */30 * * * *".into(), // every 30 minutes
            batch_size: 50,
            job_timeout: Duration::from_secs(300),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Error)]
enum SapBatchError {
    #[error("failed to dequeue SAP outbox batch")]
    Dequeue {
        #[source]
        source: PulseArcError,
    },
    #[error("SAP batch submission failed")]
    Submit {
        #[source]
        source: PulseArcError,
    },
}

impl SapBatchError {
    fn kind(&self) -> &'static str {
        match self {
            SapBatchError::Dequeue { .. } => "dequeue_failed",
            SapBatchError::Submit { .. } => "submit_failed",
        }
    }
}

/// SAP time entry scheduler with explicit lifecycle management.
pub struct SapScheduler {
    scheduler: Option<JobScheduler>,
    config: SapSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    metrics: Arc<PerformanceMetrics>,
    batch_forwarder: Arc<BatchForwarder>,
    outbox_repo: Arc<dyn OutboxQueuePort>,
}

impl SapScheduler {
    /// Create a scheduler with the default configuration.
    pub fn new<Q>(
        cron_expression: String,
        batch_forwarder: Arc<BatchForwarder>,
        outbox_repo: Arc<Q>,
        metrics: Arc<PerformanceMetrics>,
    ) -> SchedulerResult<Self>
    where
        Q: OutboxQueuePort + 'static,
    {
        let config = SapSchedulerConfig { cron_expression, ..Default::default() };
        Self::with_config(config, batch_forwarder, outbox_repo, metrics)
    }

    /// Create a scheduler with a custom configuration.
    pub fn with_config<Q>(
        config: SapSchedulerConfig,
        batch_forwarder: Arc<BatchForwarder>,
        outbox_repo: Arc<Q>,
        metrics: Arc<PerformanceMetrics>,
    ) -> SchedulerResult<Self>
    where
        Q: OutboxQueuePort + 'static,
    {
        let outbox_repo: Arc<dyn OutboxQueuePort> = outbox_repo;
        let scheduler = Self {
            scheduler: None,
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            metrics,
            batch_forwarder,
            outbox_repo,
        };
        Ok(scheduler)
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        let start_result = tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: start_timeout, source })?;

        start_result.map_err(|source| SchedulerError::StartFailed { source })?;

        self.scheduler = Some(scheduler_instance);

        let cancel = self.cancellation.clone();
        let metrics = self.metrics.clone();
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel, metrics).await;
        });

        self.monitor_handle = Some(handle);
        info!(scheduler = "sap", event = "start", "SAP scheduler started");
        log_metric(self.metrics.record_call(), "scheduler.sap.start");
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let mut scheduler = match self.scheduler.take() {
            Some(scheduler) => scheduler,
            None => return Err(SchedulerError::NotRunning),
        };

        let stop_timeout = self.config.stop_timeout;
        let stop_result =
            tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
                .await
                .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?;

        stop_result.map_err(|source| SchedulerError::StopFailed { source })?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??
        }

        info!(scheduler = "sap", event = "stop", "SAP scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|source| SchedulerError::CreationFailed { source })?;
        let cron_expr = self.config.cron_expression.clone();
        let metrics = self.metrics.clone();
        let batch_forwarder = self.batch_forwarder.clone();
        let outbox_repo = self.outbox_repo.clone();
        let job_timeout = self.config.job_timeout;
        let batch_size = self.config.batch_size;

        let job_definition = Job::new_async(cron_expr.as_str(), move |_id, _lock| {
            let metrics = metrics.clone();
            let batch_forwarder = batch_forwarder.clone();
            let outbox_repo = outbox_repo.clone();

            Box::pin(async move {
                log_metric(metrics.record_call(), "scheduler.sap.job.invoked");
                let started = Instant::now();

                match tokio::time::timeout(
                    job_timeout,
                    Self::process_sap_batch(batch_forwarder, outbox_repo, batch_size),
                )
                .await
                {
                    Ok(Ok(())) => {
                        log_metric(
                            metrics.record_fetch_time(started.elapsed()),
                            "scheduler.sap.job.duration",
                        );
                        debug!(
                            scheduler = "sap",
                            event = "job_complete",
                            "SAP batch processing finished successfully"
                        );
                    }
                    Ok(Err(err)) => {
                        log_metric(metrics.record_fetch_error(), "scheduler.sap.job.error");
                        log_metric(
                            metrics.record_fetch_time(started.elapsed()),
                            "scheduler.sap.job.duration",
                        );
                        error!(
                            scheduler = "sap",
                            error = ?err,
                            error_kind = err.kind(),
                            "SAP batch processing failed"
                        );
                    }
                    Err(elapsed) => {
                        log_metric(metrics.record_fetch_timeout(), "scheduler.sap.job.timeout");
                        warn!(
                            scheduler = "sap",
                            event = "job_timeout",
                            timeout_secs = job_timeout.as_secs(),
                            "SAP batch processing timed out"
                        );
                        debug!(
                            scheduler = "sap",
                            event = "job_timeout_details",
                            elapsed = ?elapsed,
                            "Timeout details"
                        );
                    }
                }
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        let job_id = job_definition.guid();
        scheduler
            .add(job_definition)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        debug!(cron = %self.config.cron_expression, job_id = %job_id, "Registered SAP batch processing job");
        Ok(scheduler)
    }

    async fn process_sap_batch(
        batch_forwarder: Arc<BatchForwarder>,
        outbox_repo: Arc<dyn OutboxQueuePort>,
        batch_size: usize,
    ) -> Result<(), SapBatchError> {
        // Dequeue pending SAP entries
        let entries = outbox_repo
            .dequeue_batch(batch_size)
            .await
            .map_err(|source| SapBatchError::Dequeue { source })?;

        if entries.is_empty() {
            debug!(
                scheduler = "sap",
                event = "no_pending_entries",
                "No pending SAP entries to process"
            );
            return Ok(());
        }

        info!(
            scheduler = "sap",
            event = "job_started",
            count = entries.len(),
            "Processing SAP batch"
        );

        // Submit batch via BatchForwarder
        let result = batch_forwarder
            .submit_batch(&entries)
            .await
            .map_err(|source| SapBatchError::Submit { source })?;

        info!(
            scheduler = "sap",
            event = "job_finished",
            successful = result.successful,
            failed = result.failed,
            "SAP batch submission completed"
        );

        // Mark entries as sent or failed based on results
        for entry_result in result.entry_results {
            match entry_result.status {
                crate::integrations::sap::EntrySubmissionStatus::Submitted { .. } => {
                    if let Err(e) = outbox_repo.mark_sent(&entry_result.outbox_id).await {
                        warn!(
                            scheduler = "sap",
                            id = %entry_result.outbox_id,
                            error = ?e,
                            "Failed to mark entry as sent"
                        );
                    }
                }
                crate::integrations::sap::EntrySubmissionStatus::Failed { error } => {
                    let error_message = error.to_string();
                    if let Err(e) =
                        outbox_repo.mark_failed(&entry_result.outbox_id, &error_message).await
                    {
                        warn!(
                            scheduler = "sap",
                            id = %entry_result.outbox_id,
                            sap_error = %error_message,
                            error = ?e,
                            "Failed to mark entry as failed"
                        );
                    }
                }
            }
        }

        Ok(())
    }

    async fn monitor_task(cancel: CancellationToken, metrics: Arc<PerformanceMetrics>) {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(
                    scheduler = "sap",
                    event = "monitor_cancelled",
                    "SAP scheduler monitor cancelled"
                );
            }
        }

        log_metric(metrics.record_call(), "scheduler.sap.monitor_exit");
    }
}

fn log_metric(result: MetricsResult<()>, metric: &'static str) {
    if let Err(err) = result {
        warn!(
            scheduler = "sap",
            metric = metric,
            error = ?err,
            "Failed to record scheduler metric"
        );
    }
}

impl Drop for SapScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!(
                scheduler = "sap",
                event = "drop_cancel",
                "SapScheduler dropped while running; cancelling tasks"
            );
            self.cancellation.cancel();
        }
    }
}
