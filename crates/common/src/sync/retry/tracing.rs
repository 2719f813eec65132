//! Distributed tracing support for retry operations
//!
//! This module provides tracing instrumentation for retry operations using
//! the standard `tracing` crate instead of OpenTelemetry to avoid external
//! dependencies.

use std::time::Duration;

use tracing::{info, warn};

/// Distributed tracing support for retry operations
pub struct RetryTracer;

impl RetryTracer {
    /// Create a new retry tracer
    pub fn new() -> Self {
        Self
    }

    /// Start a retry operation span
    pub fn start_retry_span(&self, operation_name: &str, max_attempts: u32) -> RetrySpan {
        info!(operation = operation_name, max_attempts = max_attempts, "Starting retry operation");

        RetrySpan { operation_name: operation_name.to_string(), max_attempts }
    }
}

impl Default for RetryTracer {
    fn default() -> Self {
        Self::new()
    }
}

/// A span representing a retry operation
pub struct RetrySpan {
    operation_name: String,
    max_attempts: u32,
}

impl RetrySpan {
    /// Record an attempt
    pub fn record_attempt(&mut self, attempt: u32, delay: Option<Duration>) {
        if let Some(delay) = delay {
            info!(
                operation = %self.operation_name,
                attempt = attempt,
                delay_ms = delay.as_millis(),
                "Retry attempt with delay"
            );
        } else {
            info!(
                operation = %self.operation_name,
                attempt = attempt,
                "Retry attempt"
            );
        }
    }

    /// Record a successful retry
    pub fn record_success(&mut self, attempts: u32, total_delay: Duration) {
        info!(
            operation = %self.operation_name,
            attempts = attempts,
            total_delay_ms = total_delay.as_millis(),
            "Retry operation succeeded"
        );
    }

    /// Record a failure
    pub fn record_failure(&mut self, attempt: u32, error: &str) {
        warn!(
            operation = %self.operation_name,
            attempt = attempt,
            error = %error,
            "Retry attempt failed"
        );
    }

    /// Record that all attempts have been exhausted
    pub fn record_exhausted(&mut self, total_delay: Duration) {
        warn!(
            operation = %self.operation_name,
            max_attempts = self.max_attempts,
            total_delay_ms = total_delay.as_millis(),
            "All retry attempts exhausted"
        );
    }

    /// Record timeout
    pub fn record_timeout(&mut self, elapsed: Duration) {
        warn!(
            operation = %self.operation_name,
            elapsed_ms = elapsed.as_millis(),
            "Retry operation timed out"
        );
    }

    /// Record circuit breaker open
    pub fn record_circuit_breaker_open(&mut self) {
        warn!(
            operation = %self.operation_name,
            "Circuit breaker is open, aborting retry"
        );
    }

    /// Record budget exhausted
    pub fn record_budget_exhausted(&mut self) {
        warn!(
            operation = %self.operation_name,
            "Retry budget exhausted, aborting retry"
        );
    }

    /// End the span
    pub fn end(self) {
        // Span will be dropped, which ends it in tracing
    }
}
