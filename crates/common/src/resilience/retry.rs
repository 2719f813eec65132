//! Generic retry strategy implementation with proper error handling and
//! extensibility
//!
//! This module provides a flexible retry mechanism that can be used across the
//! application for any operation that might fail and needs retry logic. It
//! supports various backoff strategies, jitter, and customizable retry
//! conditions.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted
    #[error("All retry attempts exhausted after {attempts} tries")]
    AttemptsExhausted { attempts: u32 },

    /// The operation failed with a non-retryable error
    #[error("Operation failed with non-retryable error: {source}")]
    NonRetryable { source: E },

    /// The retry strategy configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A timeout occurred during retry operations
    #[error("Retry timeout exceeded after {elapsed:?}")]
    TimeoutExceeded { elapsed: Duration },
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Outcome of a retry execution including result and summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    pub attempts: u32,
    pub total_delay: Duration,
    pub timed_out: bool,
    pub first_attempt_time: Instant,
    /// Human-readable representation of the last error that occurred.
    pub last_error: Option<String>,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }

    /// Get the total elapsed time from first attempt to completion.
    pub fn total_elapsed(&self) -> Duration {
        self.first_attempt_time.elapsed()
    }

    /// Get the average delay between attempts (excludes operation execution
    /// time).
    pub fn average_delay(&self) -> Duration {
        if self.attempts <= 1 {
            return Duration::ZERO;
        }
        self.total_delay / (self.attempts - 1)
    }
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Determine if the error should be retried and optionally provide a custom
    /// delay
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry the operation with a custom delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone)]
#[allow(unpredictable_function_pointer_comparisons)]
#[derive(PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Linear backoff: initial_delay + (attempt * increment)
    Linear { initial_delay: Duration, increment: Duration },
    /// Exponential backoff: initial_delay * base^attempt
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
    /// Custom backoff function
    Custom(fn(u32) -> Duration),
}

impl BackoffStrategy {
    /// Calculate the next delay for the given attempt
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Linear { initial_delay, increment } => {
                *initial_delay + increment.saturating_mul(attempt)
            }
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let delay = initial_delay.as_millis() as f64 * base.powi(attempt as i32);
                let delay_ms = delay.min(max_delay.as_millis() as f64) as u64;
                Duration::from_millis(delay_ms)
            }
            BackoffStrategy::Custom(f) => f(attempt),
        }
    }
}

/// Jitter type for adding randomness to retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum Jitter {
    /// No jitter
    None,
    /// Full jitter: 0 to calculated_delay
    Full,
    /// Equal jitter: calculated_delay/2 to calculated_delay
    Equal,
    /// Decorrelated jitter: more sophisticated randomization
    Decorrelated { base: Duration },
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(&self, delay: Duration, attempt: u32) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => {
                let jitter_ms = self.random_value(delay.as_millis() as u64);
                Duration::from_millis(jitter_ms)
            }
            Jitter::Equal => {
                let half_delay = delay.as_millis() / 2;
                let jitter_ms = half_delay + self.random_value(half_delay as u64) as u128;
                Duration::from_millis(jitter_ms as u64)
            }
            Jitter::Decorrelated { base } => {
                let prev_delay = if attempt == 0 { *base } else { delay };
                let max_jitter = prev_delay.as_millis() * 3;
                let jitter_ms = base.as_millis() + self.random_value(max_jitter as u64) as u128;
                Duration::from_millis(jitter_ms as u64)
            }
        }
    }

    /// Generate a pseudo-random value using timing-based seed
    /// This provides good distribution for jitter without external dependencies
    fn random_value(&self, max: u64) -> u64 {
        if max == 0 {
            return 0;
        }

        // Use nanosecond precision from Instant for seed
        let nanos = Instant::now().elapsed().subsec_nanos() as u64;

        // Simple Linear Congruential Generator (LCG) for pseudo-randomness
        // Constants from Numerical Recipes
        let mut seed = nanos.wrapping_mul(1664525).wrapping_add(1013904223);
        seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
        seed % max
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
    /// Jitter type for randomizing delays
    pub jitter: Jitter,
    /// Maximum total time to spend retrying
    pub max_total_time: Option<Duration>,
    /// Whether to reset attempt count on certain conditions
    pub reset_on_success: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_millis(100),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
            jitter: Jitter::Equal,
            max_total_time: Some(Duration::from_secs(300)), // 5 minutes
            reset_on_success: false,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with validation
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Create a configuration builder (alias for `new()`)
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }

        match &self.backoff {
            BackoffStrategy::Exponential { base, .. } if *base <= 0.0 => {
                return Err(RetryError::InvalidConfiguration {
                    message: "exponential base must be greater than 0".to_string(),
                });
            }
            _ => {}
        }

        Ok(())
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn linear_backoff(mut self, initial_delay: Duration, increment: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Linear { initial_delay, increment };
        self
    }

    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    pub fn no_jitter(mut self) -> Self {
        self.config.jitter = Jitter::None;
        self
    }

    pub fn full_jitter(mut self) -> Self {
        self.config.jitter = Jitter::Full;
        self
    }

    pub fn equal_jitter(mut self) -> Self {
        self.config.jitter = Jitter::Equal;
        self
    }

    pub fn decorrelated_jitter(mut self, base: Duration) -> Self {
        self.config.jitter = Jitter::Decorrelated { base };
        self
    }

    pub fn max_total_time(mut self, duration: Duration) -> Self {
        self.config.max_total_time = Some(duration);
        self
    }

    pub fn unlimited_time(mut self) -> Self {
        self.config.max_total_time = None;
        self
    }

    pub fn reset_on_success(mut self, reset: bool) -> Self {
        self.config.reset_on_success = reset;
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryError<()>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Context for tracking retry state
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Current attempt number (0-based)
    pub attempt: u32,
    /// Total elapsed time
    pub elapsed: Duration,
    /// Start time of retry sequence
    pub start_time: Instant,
    /// Last delay used
    pub last_delay: Option<Duration>,
    /// Whether the last attempt succeeded
    pub last_success: bool,
    /// Total accumulated delay across attempts
    pub total_delay: Duration,
    /// Whether the executor terminated due to timeout
    pub timed_out: bool,
}

impl RetryContext {
    fn new() -> Self {
        Self {
            attempt: 0,
            elapsed: Duration::ZERO,
            start_time: Instant::now(),
            last_delay: None,
            last_success: false,
            total_delay: Duration::ZERO,
            timed_out: false,
        }
    }

    fn update(&mut self) {
        self.elapsed = self.start_time.elapsed();
        self.attempt += 1;
    }
}

/// The main retry executor
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Create with default configuration
    pub fn with_policy(policy: P) -> Self {
        Self::new(RetryConfig::default(), policy)
    }
}

impl<P> RetryExecutor<P> {
    /// Execute an operation with retry logic
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics.
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut context = RetryContext::new();
        let first_attempt_time = Instant::now();
        let mut last_error: Option<String> = None;

        loop {
            context.elapsed = context.start_time.elapsed();
            let attempt_number = context.attempt + 1;

            if let Some(max_time) = self.config.max_total_time {
                if context.elapsed >= max_time {
                    warn!(
                        "Retry timeout exceeded after {:?} (attempts: {})",
                        context.elapsed, context.attempt
                    );
                    context.timed_out = true;
                    return RetryOutcome {
                        result: Err(RetryError::TimeoutExceeded { elapsed: context.elapsed }),
                        attempts: attempt_number,
                        total_delay: context.total_delay,
                        timed_out: true,
                        first_attempt_time,
                        last_error: last_error.clone(),
                    };
                }
            }

            debug!("Executing operation (attempt {}/{})", attempt_number, self.config.max_attempts);

            let result = operation().await;

            match result {
                Ok(value) => {
                    if context.attempt > 0 {
                        debug!("Operation succeeded after {} retries", context.attempt);
                    }
                    return RetryOutcome {
                        result: Ok(value),
                        attempts: attempt_number,
                        total_delay: context.total_delay,
                        timed_out: false,
                        first_attempt_time,
                        last_error: last_error.clone(),
                    };
                }
                Err(error) => {
                    let error_description = format!("{error:?}");

                    if context.attempt >= self.config.max_attempts - 1 {
                        warn!(
                            "All retry attempts exhausted after {} tries, last error: {:?}",
                            attempt_number, error
                        );
                        last_error = Some(error_description);
                        return RetryOutcome {
                            result: Err(RetryError::AttemptsExhausted { attempts: attempt_number }),
                            attempts: attempt_number,
                            total_delay: context.total_delay,
                            timed_out: false,
                            first_attempt_time,
                            last_error: last_error.clone(),
                        };
                    }

                    let decision = self.policy.should_retry(&error, context.attempt);
                    match decision {
                        RetryDecision::Stop => {
                            debug!("Retry policy determined not to retry: {:?}", error);
                            last_error = Some(error_description);
                            return RetryOutcome {
                                result: Err(RetryError::NonRetryable { source: error }),
                                attempts: attempt_number,
                                total_delay: context.total_delay,
                                timed_out: false,
                                first_attempt_time,
                                last_error: last_error.clone(),
                            };
                        }
                        RetryDecision::Retry => {
                            let delay = self.config.backoff.calculate_delay(context.attempt);
                            let jittered_delay = self.config.jitter.apply(delay, context.attempt);
                            last_error = Some(error_description);
                            self.sleep_and_update(&mut context, jittered_delay).await;
                        }
                        RetryDecision::RetryAfter(custom_delay) => {
                            last_error = Some(error_description);
                            self.sleep_and_update(&mut context, custom_delay).await;
                        }
                    }
                }
            }
        }
    }

    async fn sleep_and_update(&self, context: &mut RetryContext, delay: Duration) {
        warn!("Operation failed (attempt {}), retrying after {:?}", context.attempt + 1, delay);

        context.last_delay = Some(delay);
        tokio::time::sleep(delay).await;
        context.total_delay += delay;
        context.update();
    }
}

/// Convenience function to create a retry executor and execute an operation
pub async fn retry_with_policy<F, Fut, T, E, P>(
    config: RetryConfig,
    policy: P,
    operation: F,
) -> RetryResult<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPolicy<E>,
    E: fmt::Debug,
{
    let executor = RetryExecutor::new(config, policy);
    executor.execute(operation).await
}

/// Convenience function to retry with default configuration
pub async fn retry<F, Fut, T, E, P>(policy: P, operation: F) -> RetryResult<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPolicy<E>,
    E: fmt::Debug,
{
    retry_with_policy(RetryConfig::default(), policy, operation).await
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::*;

    /// Always retry policy - retries on any error
    #[derive(Debug, Clone)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Never retry policy - never retries
    #[derive(Debug, Clone)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Predicate-based retry policy
    #[derive(Debug)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
            if (self.predicate)(error, attempt) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}
