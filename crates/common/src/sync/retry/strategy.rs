// Retry strategy with exponential backoff and jitter
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, error, warn};

use crate::error::CommonError;
use crate::resilience::retry::{
    BackoffStrategy as CoreBackoffStrategy, Jitter as CoreJitter, RetryConfig,
    RetryDecision as CoreRetryDecision, RetryError as CoreRetryError,
    RetryExecutor as CoreRetryExecutor, RetryOutcome as CoreRetryOutcome,
    RetryPolicy as CoreRetryPolicy,
};
use crate::sync::retry::constants::*;
use crate::sync::retry::error::{RetryError, RetryResult};
use crate::sync::retry::metrics::RetryMetrics;
use crate::sync::retry::tracing::{RetrySpan, RetryTracer};

/// Type alias for retry result with metrics (clippy::type_complexity)
type RetryResultWithMetrics<T> = (Result<T, RetryError>, RetryMetrics);

/// Type alias for error predicate function to reduce complexity
type ErrorPredicate = Arc<dyn Fn(&dyn std::error::Error) -> bool + Send + Sync>;

/// Retry strategy with configurable exponential backoff and jitter
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter_factor: f64,
    timeout: Option<Duration>,
    retry_on: RetryCondition,
}

/// Condition for determining if an error is retryable
pub enum RetryCondition {
    /// Retry all errors
    Always,
    /// Retry specific error types
    Custom(ErrorPredicate),
}

impl Clone for RetryCondition {
    fn clone(&self) -> Self {
        match self {
            Self::Always => Self::Always,
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

impl std::fmt::Debug for RetryCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::Custom(_) => write!(f, "Custom(<function>)"),
        }
    }
}

impl Default for RetryCondition {
    fn default() -> Self {
        Self::Always
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter_factor: DEFAULT_JITTER_FACTOR,
            timeout: None,
            retry_on: RetryCondition::default(),
        }
    }
}

impl RetryStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a custom retry strategy with validation
    pub fn custom(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
    ) -> RetryResult<Self> {
        if !(MIN_MAX_ATTEMPTS..=MAX_MAX_ATTEMPTS).contains(&max_attempts) {
            return Err(CommonError::config(format!(
                "max_attempts must be between {} and {}, got {}",
                MIN_MAX_ATTEMPTS, MAX_MAX_ATTEMPTS, max_attempts
            ))
            .into());
        }

        if base_delay > max_delay {
            return Err(CommonError::config(format!(
                "base_delay ({:?}) cannot be greater than max_delay ({:?})",
                base_delay, max_delay
            ))
            .into());
        }

        Ok(Self {
            max_attempts,
            base_delay,
            max_delay,
            jitter_factor: DEFAULT_JITTER_FACTOR,
            timeout: None,
            retry_on: RetryCondition::default(),
        })
    }

    /// Set timeout for entire retry operation
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set custom retry condition
    pub fn with_retry_condition(mut self, condition: RetryCondition) -> Self {
        self.retry_on = condition;
        self
    }

    /// Set the maximum number of retry attempts with validation
    pub fn with_max_attempts(mut self, attempts: u32) -> RetryResult<Self> {
        if !(MIN_MAX_ATTEMPTS..=MAX_MAX_ATTEMPTS).contains(&attempts) {
            return Err(CommonError::config(format!(
                "max_attempts must be between {} and {}, got {}",
                MIN_MAX_ATTEMPTS, MAX_MAX_ATTEMPTS, attempts
            ))
            .into());
        }
        self.max_attempts = attempts;
        Ok(self)
    }

    /// Set the base delay for exponential backoff
    pub fn with_base_delay(mut self, delay: Duration) -> RetryResult<Self> {
        if delay > self.max_delay {
            return Err(CommonError::config(format!(
                "base_delay ({:?}) cannot be greater than max_delay ({:?})",
                delay, self.max_delay
            ))
            .into());
        }
        self.base_delay = delay;
        Ok(self)
    }

    /// Set the maximum delay cap
    pub fn with_max_delay(mut self, delay: Duration) -> RetryResult<Self> {
        if delay < self.base_delay {
            return Err(CommonError::config(format!(
                "max_delay ({:?}) cannot be less than base_delay ({:?})",
                delay, self.base_delay
            ))
            .into());
        }
        self.max_delay = delay;
        Ok(self)
    }

    /// Set the jitter factor (0.0 = no jitter, 1.0 = full jitter)
    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Calculate delay for a given attempt with exponential backoff and jitter
    pub fn get_delay(&self, attempt: u32) -> Duration {
        // Calculate base exponential delay
        let exponential_delay = self.calculate_exponential_delay(attempt);

        // Apply jitter
        self.apply_jitter(exponential_delay)
    }

    /// Calculate exponential delay without jitter
    fn calculate_exponential_delay(&self, attempt: u32) -> Duration {
        // Use checked multiplication to prevent overflow
        let base_millis = self.base_delay.as_millis() as u64;
        let max_millis = self.max_delay.as_millis() as u64;

        // Cap exponent to prevent overflow
        let exponent = attempt.min(MAX_BACKOFF_EXPONENT);
        let multiplier = 2_u64.saturating_pow(exponent);

        // Calculate delay with saturating multiplication
        let delay_millis = base_millis.saturating_mul(multiplier).min(max_millis);

        Duration::from_millis(delay_millis)
    }

    /// Apply jitter to prevent thundering herd
    fn apply_jitter(&self, delay: Duration) -> Duration {
        if self.jitter_factor == 0.0 {
            return delay;
        }

        let mut rng = rand::thread_rng();
        let delay_millis = delay.as_millis() as f64;
        let jitter_range = delay_millis * self.jitter_factor;

        // Add random jitter: -jitter_range/2 to +jitter_range/2
        let jitter = rng.gen_range(-jitter_range / 2.0..=jitter_range / 2.0);
        let final_millis = (delay_millis + jitter).max(0.0) as u64;

        Duration::from_millis(final_millis)
    }

    /// Check if retry should be attempted
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Get the maximum number of attempts
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Execute an operation with retry logic and metrics
    pub async fn execute_with_metrics<F, Fut, T, E>(
        &self,
        operation_name: &str,
        mut operation: F,
    ) -> RetryResultWithMetrics<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static + Clone,
    {
        let tracer = RetryTracer::new();
        let span = tracer.start_retry_span(operation_name, self.max_attempts);
        let instrumentation = Arc::new(Mutex::new(RetryInstrumentation::new(span)));

        let config = RetryConfig {
            max_attempts: self.max_attempts,
            max_total_time: self.timeout,
            backoff: CoreBackoffStrategy::Fixed(Duration::ZERO),
            jitter: CoreJitter::None,
            ..RetryConfig::default()
        };

        let policy = SyncRetryPolicy::new(self.clone(), instrumentation.clone());
        let executor = CoreRetryExecutor::new(config, policy);

        let attempt_counter = Arc::new(AtomicU32::new(0));
        let instrumentation_for_closure = instrumentation.clone();

        let outcome = executor
            .execute_with_outcome(|| {
                let attempt_index = attempt_counter.fetch_add(1, Ordering::SeqCst);
                let fut = operation();
                let instrumentation = instrumentation_for_closure.clone();
                async move {
                    if let Ok(mut guard) = instrumentation.lock() {
                        let previous_delay =
                            if attempt_index > 0 { guard.last_delay } else { None };
                        if let Some(span) = guard.span.as_mut() {
                            span.record_attempt(attempt_index + 1, previous_delay);
                        }
                    }
                    fut.await
                }
            })
            .await;

        self.process_outcome(outcome, instrumentation, operation_name)
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static + Clone,
    {
        let (result, _) = self.execute_with_metrics("unnamed", operation).await;
        result
    }

    fn process_outcome<T, E>(
        &self,
        outcome: CoreRetryOutcome<T, E>,
        instrumentation: Arc<Mutex<RetryInstrumentation>>,
        operation_name: &str,
    ) -> RetryResultWithMetrics<T>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut metrics = RetryMetrics {
            attempts: outcome.attempts,
            total_delay: outcome.total_delay,
            timed_out: outcome.timed_out,
            succeeded: outcome.result.is_ok(),
        };

        let result = match outcome.result {
            Ok(value) => {
                self.finish_span(&instrumentation, |span| {
                    span.record_success(metrics.attempts, metrics.total_delay);
                });
                Ok(value)
            }
            Err(core_err) => {
                let mapped = match core_err {
                    CoreRetryError::AttemptsExhausted { attempts } => {
                        self.finish_span(&instrumentation, |span| {
                            span.record_exhausted(metrics.total_delay);
                        });
                        RetryError::AttemptsExhausted { attempts }
                    }
                    CoreRetryError::TimeoutExceeded { elapsed } => {
                        metrics.timed_out = true;
                        self.finish_span(&instrumentation, |span| span.record_timeout(elapsed));
                        RetryError::Common(CommonError::timeout("retry_operation", elapsed))
                    }
                    CoreRetryError::InvalidConfiguration { message } => {
                        self.finish_span(&instrumentation, |_| {});
                        RetryError::Common(CommonError::config(message))
                    }
                    CoreRetryError::NonRetryable { source } => {
                        self.finish_span(&instrumentation, |_| {});
                        RetryError::operation_failed(source)
                    }
                };
                Err(mapped)
            }
        };

        if metrics.timed_out {
            warn!(
                operation = operation_name,
                attempts = metrics.attempts,
                total_delay = ?metrics.total_delay,
                "Retry operation timed out"
            );
        } else if matches!(result, Err(RetryError::AttemptsExhausted { .. })) {
            error!(
                operation = operation_name,
                attempts = metrics.attempts,
                total_delay = ?metrics.total_delay,
                "All retry attempts failed"
            );
        }

        (result, metrics)
    }

    fn finish_span<F>(&self, instrumentation: &Arc<Mutex<RetryInstrumentation>>, recorder: F)
    where
        F: FnOnce(&mut RetrySpan),
    {
        if let Ok(mut guard) = instrumentation.lock() {
            if let Some(mut span) = guard.span.take() {
                recorder(&mut span);
                span.end();
            }
        }
    }

    /// Execute a synchronous operation with retry logic
    ///
    /// WARNING: This uses std::thread::sleep for delays. Do not call this
    /// from within an async runtime as it will block the thread.
    pub fn execute_sync<F, T, E>(&self, operation: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Result<T, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.execute_sync_with_metrics("unnamed", operation).0
    }

    /// Execute a synchronous operation with retry logic and metrics
    ///
    /// WARNING: This uses std::thread::sleep for delays. Do not call this
    /// from within an async runtime as it will block the thread.
    pub fn execute_sync_with_metrics<F, T, E>(
        &self,
        operation_name: &str,
        mut operation: F,
    ) -> RetryResultWithMetrics<T>
    where
        F: FnMut() -> Result<T, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let start_time = Instant::now();
        let deadline = self.timeout.map(|t| start_time + t);
        let mut metrics = RetryMetrics::default();
        let mut last_error = None;
        let mut total_delay = Duration::ZERO;

        let mut retry_span = {
            use crate::sync::retry::tracing::RetryTracer;
            let tracer = RetryTracer::new();
            Some(tracer.start_retry_span(operation_name, self.max_attempts))
        };

        debug!(
            operation = operation_name,
            max_attempts = self.max_attempts,
            timeout = ?self.timeout,
            "Starting sync retry operation"
        );

        for attempt in 0..self.max_attempts {
            metrics.attempts = attempt + 1;

            // Check timeout
            if let Some(deadline) = deadline {
                if Instant::now() > deadline {
                    warn!(
                        operation = operation_name,
                        attempts = metrics.attempts,
                        elapsed = ?start_time.elapsed(),
                        "Sync retry operation timed out"
                    );
                    metrics.timed_out = true;
                    metrics.total_delay = total_delay;
                    return (
                        Err(CommonError::timeout("retry_operation", start_time.elapsed()).into()),
                        metrics,
                    );
                }
            }

            match operation() {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(
                            operation = operation_name,
                            attempts = metrics.attempts,
                            total_delay = ?total_delay,
                            "Sync retry operation succeeded"
                        );
                    }
                    metrics.succeeded = true;
                    metrics.total_delay = total_delay;
                    return (Ok(result), metrics);
                }
                Err(err) => {
                    // Check if error is retryable
                    let should_retry = match &self.retry_on {
                        RetryCondition::Always => true,
                        RetryCondition::Custom(f) => f(&err as &dyn std::error::Error),
                    };

                    if let Some(ref mut span) = retry_span {
                        span.record_failure(attempt + 1, &err.to_string());
                    }

                    if !should_retry {
                        debug!(
                            operation = operation_name,
                            error = %err,
                            "Error is not retryable"
                        );
                        return (Err(RetryError::operation_failed(err)), metrics);
                    }

                    last_error = Some(err);

                    if attempt < self.max_attempts - 1 {
                        let delay = self.get_delay(attempt);
                        total_delay += delay;

                        warn!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            max_attempts = self.max_attempts,
                            delay = ?delay,
                            error = %last_error.as_ref().unwrap(),
                            "Sync retry attempt failed, backing off"
                        );

                        // Check if delay would exceed deadline
                        if let Some(deadline) = deadline {
                            let time_until_deadline =
                                deadline.saturating_duration_since(Instant::now());
                            if delay > time_until_deadline {
                                warn!(
                                    operation = operation_name,
                                    "Next retry would exceed timeout, aborting"
                                );
                                metrics.timed_out = true;
                                metrics.total_delay = total_delay;
                                return (
                                    Err(CommonError::timeout(
                                        "retry_operation",
                                        start_time.elapsed(),
                                    )
                                    .into()),
                                    metrics,
                                );
                            }
                        }

                        // WARNING: Blocking sleep - should not be called from async runtime
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        error!(
            operation = operation_name,
            attempts = metrics.attempts,
            total_delay = ?total_delay,
            "All sync retry attempts failed"
        );

        metrics.total_delay = total_delay;
        let error = last_error
            .map(RetryError::operation_failed)
            .unwrap_or_else(|| RetryError::AttemptsExhausted { attempts: metrics.attempts });
        (Err(error), metrics)
    }
}

struct RetryInstrumentation {
    span: Option<RetrySpan>,
    last_delay: Option<Duration>,
}

impl RetryInstrumentation {
    fn new(span: RetrySpan) -> Self {
        Self { span: Some(span), last_delay: None }
    }
}

impl fmt::Debug for RetryInstrumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryInstrumentation")
            .field("span", &self.span.is_some())
            .field("last_delay", &self.last_delay)
            .finish()
    }
}

#[derive(Clone)]
struct SyncRetryPolicy {
    strategy: RetryStrategy,
    instrumentation: Arc<Mutex<RetryInstrumentation>>,
}

impl SyncRetryPolicy {
    fn new(strategy: RetryStrategy, instrumentation: Arc<Mutex<RetryInstrumentation>>) -> Self {
        Self { strategy, instrumentation }
    }
}

impl<E> CoreRetryPolicy<E> for SyncRetryPolicy
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn should_retry(&self, error: &E, attempt: u32) -> CoreRetryDecision {
        let err_ref = error as &dyn std::error::Error;
        let mut guard = self.instrumentation.lock().ok();

        if let Some(span) = guard.as_mut().and_then(|g| g.span.as_mut()) {
            span.record_failure(attempt + 1, &error.to_string());
        }

        if self.strategy.retry_on.allows_error(err_ref) {
            let delay = self.strategy.get_delay(attempt);
            if let Some(g) = guard.as_mut() {
                g.last_delay = Some(delay);
            }

            warn!(
                attempt = attempt + 1,
                max_attempts = self.strategy.max_attempts(),
                delay = ?delay,
                error = %error,
                "Retry attempt failed, backing off"
            );

            CoreRetryDecision::RetryAfter(delay)
        } else {
            CoreRetryDecision::Stop
        }
    }
}

impl RetryCondition {
    fn allows_error(&self, error: &dyn std::error::Error) -> bool {
        match self {
            RetryCondition::Always => true,
            RetryCondition::Custom(predicate) => predicate(error),
        }
    }
}
