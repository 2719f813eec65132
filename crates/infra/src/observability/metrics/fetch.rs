//! Fetch-related metrics for tracking data retrieval performance
//!
//! This module tracks metrics related to data fetching including timing,
//! errors, and timeouts.
//!
//! ## Design
//! - **SeqCst ordering** for atomics used in derived metrics (avg_fetch_time)
//! - **No locking needed** - simple atomic counters
//! - **MetricsResult returns** for future extensibility (currently always Ok)
//! - **Microsecond storage** - stores raw durations in Âµs, reporting helpers
//!   convert to ms

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::observability::MetricsResult;

/// Metrics for tracking data fetch performance
///
/// All record methods return `MetricsResult<()>` for future extensibility
/// (quotas, validation), but currently always succeed.
#[derive(Debug, Default)]
pub struct FetchMetrics {
    /// Total time spent fetching data in microseconds
    pub total_fetch_time_micros: AtomicU64,
    /// Last fetch time in microseconds
    pub last_fetch_time_micros: AtomicU64,
    /// Number of fetch operations recorded
    pub fetch_count: AtomicUsize,
    /// Number of errors encountered
    pub errors: AtomicUsize,
    /// Number of timeouts encountered
    pub timeouts: AtomicUsize,
}

impl FetchMetrics {
    /// Create new FetchMetrics instance
    pub fn new() -> Self {
        Self {
            total_fetch_time_micros: AtomicU64::new(0),
            last_fetch_time_micros: AtomicU64::new(0),
            fetch_count: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            timeouts: AtomicUsize::new(0),
        }
    }

    /// Record a fetch time
    ///
    /// Currently always succeeds. Future versions may enforce quotas.
    pub fn record_fetch_time(&self, duration: Duration) -> MetricsResult<()> {
        let micros = duration.as_micros() as u64;

        // SeqCst for consistency with avg_fetch_time calculation
        self.total_fetch_time_micros.fetch_add(micros, Ordering::SeqCst);
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        // Relaxed OK: last_fetch_time is not used in derived metrics
        self.last_fetch_time_micros.store(micros, Ordering::Relaxed);

        Ok(())
    }

    /// Record an error
    ///
    /// Currently always succeeds. Future versions may enforce quotas.
    pub fn record_error(&self) -> MetricsResult<()> {
        // Relaxed OK: independent counter
        self.errors.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Record a timeout
    ///
    /// Currently always succeeds. Future versions may enforce quotas.
    pub fn record_timeout(&self) -> MetricsResult<()> {
        // Relaxed OK: independent counter
        self.timeouts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Get the average fetch time in milliseconds
    ///
    /// Returns 0.0 if no fetch operations have been recorded.
    ///
    /// ## Memory Ordering
    /// Uses SeqCst to ensure consistent snapshot of total time and count.
    pub fn get_avg_fetch_time_ms(&self) -> f64 {
        // SeqCst for consistent snapshot
        let total_time = self.total_fetch_time_micros.load(Ordering::SeqCst);
        let count = self.fetch_count.load(Ordering::SeqCst);

        if count == 0 {
            return 0.0;
        }

        (total_time as f64 / count as f64) / 1_000.0
    }

    /// Get the last fetch time in milliseconds
    pub fn get_last_fetch_time_ms(&self) -> u64 {
        self.last_fetch_time_micros.load(Ordering::Relaxed) / 1_000
    }

    /// Get the total fetch time in milliseconds
    pub fn get_total_fetch_time_ms(&self) -> u64 {
        self.total_fetch_time_micros.load(Ordering::SeqCst) / 1_000
    }

    /// Get the fetch count
    pub fn get_fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Get the error count
    pub fn get_error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    /// Get the timeout count
    pub fn get_timeout_count(&self) -> usize {
        self.timeouts.load(Ordering::Relaxed)
    }

    /// Get the true average response time including cache hits
    ///
    /// Assumes cache hits take ~2ms on average.
    ///
    /// ## Parameters
    /// - `total_calls`: Total number of calls (hits + misses)
    /// - `cache_hits`: Number of cache hits
    ///
    /// ## Calculation
    /// ```text
    /// cache_misses = total_calls - cache_hits
    /// avg_fetch_time = total_fetch_time / cache_misses
    /// hit_rate = cache_hits / total_calls
    /// miss_rate = cache_misses / total_calls
    /// true_avg = (hit_rate * 2ms) + (miss_rate * avg_fetch_time)
    /// ```
    pub fn get_true_avg_response_time_ms(&self, total_calls: usize, cache_hits: usize) -> f64 {
        if total_calls == 0 {
            return 0.0;
        }

        let cache_misses = total_calls.saturating_sub(cache_hits);
        let avg_fetch_time = if cache_misses > 0 {
            let total_time = self.total_fetch_time_micros.load(Ordering::SeqCst);
            (total_time as f64 / cache_misses as f64) / 1_000.0
        } else {
            0.0
        };

        // Assume cache hits take ~2ms on average
        let cache_hit_time = 2.0;
        let hit_rate = cache_hits as f64 / total_calls as f64;
        let miss_rate = cache_misses as f64 / total_calls as f64;

        (hit_rate * cache_hit_time) + (miss_rate * avg_fetch_time)
    }
}
