//! Performance metrics aggregator with hierarchical structure
//!
//! This module provides the main `PerformanceMetrics` struct which organizes
//! metrics into logical categories for better maintainability and clarity.
//!
//! ## Design
//! - **Aggregation pattern** - Holds all individual metrics types
//! - **Convenience methods** - Delegates to underlying metrics for common operations
//! - **Thread-safe** - All underlying metrics use atomics/locks appropriately
//!
//! ## Usage
//!
//! ```rust
//! use pulsearc_infra::observability::metrics::PerformanceMetrics;
//! use std::time::Duration;
//!
//! let metrics = PerformanceMetrics::new();
//!
//! // Record API call
//! metrics.record_call().unwrap();
//!
//! // Record fetch timing
//! metrics.record_fetch_time(Duration::from_millis(123)).unwrap();
//!
//! // Record cache hit/miss
//! metrics.record_cache_hit().unwrap();
//! metrics.record_cache_miss().unwrap();
//!
//! // Get cache hit rate (0-100)
//! let hit_rate_pct = metrics.cache_hit_rate_pct();
//! ```

use std::time::Duration;

use super::{CacheMetrics, CallMetrics, DbMetrics, FetchMetrics, ObserverMetrics};
use crate::observability::MetricsResult;

/// Performance metrics for tracking infrastructure operations
///
/// Aggregates all individual metric types and provides convenience methods
/// for common operations.
#[derive(Debug)]
pub struct PerformanceMetrics {
    /// API call metrics (counts, TTFD, timing)
    pub call: CallMetrics,
    /// Cache performance metrics (hits, misses, hit rate)
    pub cache: CacheMetrics,
    /// Database connection pool metrics (connections, queries, pool utilization)
    pub db: DbMetrics,
    /// HTTP fetch metrics (timing, errors, timeouts)
    pub fetch: FetchMetrics,
    /// macOS Accessibility API observer metrics (notifications, registration)
    pub observer: ObserverMetrics,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMetrics {
    /// Create new PerformanceMetrics instance
    ///
    /// All individual metrics are initialized to zero/empty state.
    pub fn new() -> Self {
        Self {
            call: CallMetrics::new(),
            cache: CacheMetrics::new(),
            db: DbMetrics::new(),
            fetch: FetchMetrics::new(),
            observer: ObserverMetrics::new(),
        }
    }

    // ========================================================================
    // Convenience Methods - Call Metrics
    // ========================================================================

    /// Record an API call
    ///
    /// Updates total call count and start time for rate calculations.
    pub fn record_call(&self) -> MetricsResult<()> {
        self.call.record_call()
    }

    /// Get time to first data (TTFD) in milliseconds
    ///
    /// Returns 0 if no calls have been made yet.
    pub fn ttfd_ms(&self) -> u64 {
        self.call.get_ttfd_ms()
    }

    /// Get calls per minute rate
    ///
    /// Returns 0.0 if no time has elapsed since first call.
    pub fn calls_per_minute(&self) -> f64 {
        self.call.get_calls_per_minute()
    }

    /// Get P50 (median) fetch time in milliseconds
    ///
    /// Returns `Err(MetricsError::EmptyData)` if no fetch times recorded.
    pub fn p50_fetch_time_ms(&self) -> MetricsResult<u64> {
        self.call.get_p50_fetch_time_ms()
    }

    /// Get P95 fetch time in milliseconds
    ///
    /// Returns `Err(MetricsError::EmptyData)` if no fetch times recorded.
    pub fn p95_fetch_time_ms(&self) -> MetricsResult<u64> {
        self.call.get_p95_fetch_time_ms()
    }

    /// Get P99 fetch time in milliseconds
    ///
    /// Returns `Err(MetricsError::EmptyData)` if no fetch times recorded.
    pub fn p99_fetch_time_ms(&self) -> MetricsResult<u64> {
        self.call.get_p99_fetch_time_ms()
    }

    // ========================================================================
    // Convenience Methods - Cache Metrics
    // ========================================================================

    /// Record a cache hit
    pub fn record_cache_hit(&self) -> MetricsResult<()> {
        self.cache.record_hit()
    }

    /// Record a cache miss
    pub fn record_cache_miss(&self) -> MetricsResult<()> {
        self.cache.record_miss()
    }

    /// Get cache hit rate as percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no cache operations recorded.
    pub fn cache_hit_rate_pct(&self) -> f64 {
        self.cache.get_hit_rate()
    }

    // ========================================================================
    // Convenience Methods - Fetch Metrics
    // ========================================================================

    /// Record fetch timing
    ///
    /// Updates both FetchMetrics and CallMetrics (for percentile calculations).
    pub fn record_fetch_time(&self, duration: Duration) -> MetricsResult<()> {
        self.fetch.record_fetch_time(duration)?;
        self.call.record_fetch_time(duration)?;
        Ok(())
    }

    /// Record fetch error
    pub fn record_fetch_error(&self) -> MetricsResult<()> {
        self.fetch.record_error()
    }

    /// Record fetch timeout
    pub fn record_fetch_timeout(&self) -> MetricsResult<()> {
        self.fetch.record_timeout()
    }

    /// Get average fetch time in milliseconds
    ///
    /// Returns 0.0 if no fetches recorded.
    pub fn avg_fetch_time_ms(&self) -> f64 {
        self.fetch.get_avg_fetch_time_ms()
    }

    /// Get timeout count
    pub fn timeout_count(&self) -> usize {
        self.fetch.get_timeout_count()
    }

    // ========================================================================
    // Convenience Methods - Database Metrics
    // ========================================================================

    /// Record successful database connection acquisition
    pub fn record_db_connection_acquired(&self, duration_ms: u64) -> MetricsResult<()> {
        self.db.record_connection_acquired(duration_ms)
    }

    /// Record database connection timeout
    pub fn record_db_connection_timeout(&self) -> MetricsResult<()> {
        self.db.record_connection_timeout()
    }

    /// Record database connection error
    pub fn record_db_connection_error(&self) -> MetricsResult<()> {
        self.db.record_connection_error()
    }

    /// Record database query execution
    pub fn record_db_query_executed(&self, duration_ms: u64) -> MetricsResult<()> {
        self.db.record_query_executed(duration_ms)
    }

    /// Record database query error
    pub fn record_db_query_error(&self) -> MetricsResult<()> {
        self.db.record_query_error()
    }

    /// Set database pool size (call during initialization)
    pub fn set_db_pool_size(&self, size: u64) -> MetricsResult<()> {
        self.db.set_pool_size(size)
    }

    /// Update peak concurrent database connections
    pub fn update_db_peak_connections(&self, current: u64) -> MetricsResult<()> {
        self.db.update_peak_concurrent_connections(current)
    }

    /// Get database pool utilization (0.0 - 1.0)
    ///
    /// Returns 0.0 if pool size is 0.
    pub fn db_pool_utilization(&self) -> f64 {
        self.db.pool_utilization()
    }

    // ========================================================================
    // Convenience Methods - Observer Metrics
    // ========================================================================

    /// Record macOS Accessibility API observer notification
    pub fn record_observer_notification(&self) -> MetricsResult<()> {
        self.observer.record_notification()
    }

    /// Record observer registration time in milliseconds
    pub fn record_observer_registration_time(&self, ms: u64) -> MetricsResult<()> {
        self.observer.record_registration_time(ms)
    }

    /// Record observer cleanup time in milliseconds
    pub fn record_observer_cleanup_time(&self, ms: u64) -> MetricsResult<()> {
        self.observer.record_cleanup_time(ms)
    }

    /// Record Accessibility API permission status
    pub fn record_ax_permission_status(&self, granted: bool) -> MetricsResult<()> {
        self.observer.record_ax_permission_status(granted)
    }

    /// Record observer initialization failure
    pub fn record_observer_failure(&self, error: &str) -> MetricsResult<()> {
        self.observer.record_failure(error)
    }
}
