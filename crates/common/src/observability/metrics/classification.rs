//! Classification metrics tracking
//!
//! Tracks classification performance to measure ML classifier coverage and
//! performance. Ported from macos-production/src-tauri/src/inference/metrics.rs

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// Metrics for classification performance
///
/// Tracks which classifiers are used and performance metrics.
///
/// # Example
/// ```
/// use pulsearc_common::observability::metrics::classification::ClassificationMetrics;
///
/// let metrics = ClassificationMetrics::default();
/// println!("Linfa coverage: {}%", metrics.linfa_coverage_percent());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassificationMetrics {
    /// Number of blocks classified by linfa
    pub linfa_predictions: u64,
    /// Number of blocks that fell back to rules
    pub rules_fallbacks: u64,
    /// Average linfa prediction time in milliseconds
    pub avg_linfa_time_ms: f32,
    /// Total number of classifications
    pub total_predictions: u64,
}

impl ClassificationMetrics {
    /// Calculate linfa coverage percentage
    ///
    /// # Returns
    /// Percentage of blocks classified by linfa (0.0-100.0)
    pub fn linfa_coverage_percent(&self) -> f32 {
        if self.total_predictions == 0 {
            return 0.0;
        }
        (self.linfa_predictions as f32 / self.total_predictions as f32) * 100.0
    }

    /// Calculate rules fallback percentage
    pub fn rules_fallback_percent(&self) -> f32 {
        if self.total_predictions == 0 {
            return 0.0;
        }
        (self.rules_fallbacks as f32 / self.total_predictions as f32) * 100.0
    }
}

/// Thread-safe metrics tracker
///
/// Used by HybridClassifier to track classification performance.
///
/// # Example
/// ```no_run
/// use pulsearc_common::observability::metrics::classification::MetricsTracker;
///
/// let tracker = MetricsTracker::new();
/// tracker.record_linfa_prediction(0.5); // 0.5ms
/// let metrics = tracker.get_metrics();
/// println!("Linfa predictions: {}", metrics.linfa_predictions);
/// ```
#[derive(Debug)]
pub struct MetricsTracker {
    metrics: Arc<Mutex<ClassificationMetrics>>,
}

impl MetricsTracker {
    /// Create new metrics tracker with zero initial state
    pub fn new() -> Self {
        Self { metrics: Arc::new(Mutex::new(ClassificationMetrics::default())) }
    }

    /// Record a successful linfa prediction
    ///
    /// # Arguments
    /// * `time_ms` - Time taken for prediction in milliseconds
    pub fn record_linfa_prediction(&self, time_ms: f32) {
        let mut guard = self.lock_metrics();
        guard.linfa_predictions += 1;
        guard.total_predictions += 1;

        // Running average: avg_new = (avg_old * count_old + new_value) / count_new
        let count = guard.linfa_predictions as f32;
        guard.avg_linfa_time_ms = ((guard.avg_linfa_time_ms * (count - 1.0)) + time_ms) / count;
    }

    /// Record a fallback to rules classifier
    pub fn record_rules_fallback(&self) {
        let mut guard = self.lock_metrics();
        guard.rules_fallbacks += 1;
        guard.total_predictions += 1;
    }

    /// Get current metrics snapshot
    ///
    /// # Returns
    /// Copy of current metrics (safe for cross-thread access)
    pub fn get_metrics(&self) -> ClassificationMetrics {
        let guard = self.lock_metrics();
        guard.clone()
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        let mut guard = self.lock_metrics();
        *guard = ClassificationMetrics::default();
    }

    fn lock_metrics(&self) -> MutexGuard<'_, ClassificationMetrics> {
        self.metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MetricsTracker {
    fn clone(&self) -> Self {
        Self { metrics: Arc::clone(&self.metrics) }
    }
}
