//! Resilience patterns for building fault-tolerant systems
//!
//! This module provides generic implementations of common resilience patterns
//! including circuit breakers, bulkheads, timeouts, and rate limiting.
//! These patterns help prevent cascading failures and improve system
//! reliability.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

//==============================================================================
// Time Abstraction for Testability
//==============================================================================

/// Trait for time operations to enable deterministic testing
///
/// This trait allows circuit breakers to use real system time in production
/// and controlled mock time in tests, enabling deterministic testing of
/// timeout-based behavior without actual time delays.
pub trait Clock: Send + Sync + 'static {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;

    /// Get current system time (wall clock)
    fn system_time(&self) -> SystemTime;

    /// Get milliseconds since UNIX epoch
    fn millis_since_epoch(&self) -> u64 {
        self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient cloning
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn system_time(&self) -> SystemTime {
        (**self).system_time()
    }
}

/// Mock clock for deterministic testing
///
/// Allows tests to control time progression without actual delays,
/// enabling fast and reliable testing of timeout-based behavior.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current instant
    pub fn new() -> Self {
        Self { start: Instant::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Create a new mock clock with a specific start time
    ///
    /// This is useful for tests that need deterministic start times.
    pub fn with_current_time(start: Instant) -> Self {
        Self { start, elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Advance the mock clock by a duration
    ///
    /// This simulates the passage of time without actual delays,
    /// useful for testing timeout behavior.
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    /// Advance the mock clock by milliseconds (convenience method)
    ///
    /// Equivalent to `advance(Duration::from_millis(millis))`.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Set the mock clock to a specific elapsed time
    pub fn set_elapsed(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed = duration;
        }
    }

    /// Get the current elapsed time
    pub fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        let elapsed = self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO);
        self.start + elapsed
    }

    fn system_time(&self) -> SystemTime {
        let elapsed = self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO);
        SystemTime::UNIX_EPOCH + elapsed
    }
}

//==============================================================================
// Error Types
//==============================================================================

/// Simple configuration error for validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Errors that can occur in resilience operations
///
/// This error type is generic over the underlying operation error type `E`,
/// allowing it to wrap and preserve the original error information while
/// providing resilience-specific error variants.
#[derive(Debug, Error)]
pub enum ResilienceError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Circuit breaker is open, rejecting calls
    #[error("Circuit breaker is open, rejecting calls")]
    CircuitOpen,

    /// Operation timed out
    #[error("Operation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {requests} requests in {window:?}")]
    RateLimitExceeded { requests: u64, window: Duration },

    /// Bulkhead capacity exceeded
    #[error("Bulkhead capacity exceeded: {capacity} concurrent operations")]
    BulkheadFull { capacity: usize },

    /// The underlying operation failed
    #[error("Operation failed")]
    OperationFailed {
        #[source]
        source: E,
    },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Boxed error type for configuration and simple errors
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for resilience operations
pub type ResilienceResult<T, E> = Result<T, ResilienceError<E>>;

/// Configuration result type using simple config errors
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, allowing requests
    Closed,
    /// Circuit is open, rejecting requests
    Open,
    /// Circuit is half-open, allowing limited requests to test recovery
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of failures before opening the circuit
    pub failure_threshold: u64,
    /// Number of successes needed to close the circuit from half-open
    pub success_threshold: u64,
    /// Time to wait before transitioning from open to half-open
    pub timeout: Duration,
    /// Maximum number of calls allowed in half-open state
    pub half_open_max_calls: u64,
    /// Whether to reset failure count on success in closed state
    pub reset_on_success: bool,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            timeout: Duration::from_secs(60),
            half_open_max_calls: 3,
            reset_on_success: true,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a new configuration with validation
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Create a configuration builder (alias for `new()`)
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::Invalid {
                message: "failure_threshold must be greater than 0".to_string(),
            });
        }

        if self.success_threshold == 0 {
            return Err(ConfigError::Invalid {
                message: "success_threshold must be greater than 0".to_string(),
            });
        }

        if self.half_open_max_calls == 0 {
            return Err(ConfigError::Invalid {
                message: "half_open_max_calls must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for CircuitBreakerConfig
#[derive(Debug)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreakerConfigBuilder {
    pub fn new() -> Self {
        Self { config: CircuitBreakerConfig::default() }
    }

    pub fn failure_threshold(mut self, threshold: u64) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    pub fn success_threshold(mut self, threshold: u64) -> Self {
        self.config.success_threshold = threshold;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn half_open_max_calls(mut self, max_calls: u64) -> Self {
        self.config.half_open_max_calls = max_calls;
        self
    }

    pub fn reset_on_success(mut self, reset: bool) -> Self {
        self.config.reset_on_success = reset;
        self
    }

    /// Set a custom clock for the circuit breaker (useful for testing)
    pub fn clock<C: Clock>(self, clock: C) -> CircuitBreakerBuilderWithClock<C> {
        CircuitBreakerBuilderWithClock { config: self.config, clock }
    }

    pub fn build(self) -> ConfigResult<CircuitBreakerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Builder with custom clock that builds a CircuitBreaker directly
pub struct CircuitBreakerBuilderWithClock<C: Clock> {
    config: CircuitBreakerConfig,
    clock: C,
}

impl<C: Clock> CircuitBreakerBuilderWithClock<C> {
    pub fn failure_threshold(mut self, threshold: u64) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    pub fn success_threshold(mut self, threshold: u64) -> Self {
        self.config.success_threshold = threshold;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn half_open_max_calls(mut self, max_calls: u64) -> Self {
        self.config.half_open_max_calls = max_calls;
        self
    }

    pub fn reset_on_success(mut self, reset: bool) -> Self {
        self.config.reset_on_success = reset;
        self
    }

    pub fn build(self) -> ConfigResult<CircuitBreaker<C>> {
        CircuitBreaker::with_clock(self.config, self.clock)
    }
}

/// Circuit breaker metrics for monitoring
#[derive(Debug, Clone)]
pub struct CircuitBreakerMetrics {
    pub state: CircuitState,
    pub failure_count: u64,
    pub success_count: u64,
    pub half_open_calls: u64,
    pub total_calls: u64,
    pub last_failure_time: Option<Instant>,
    pub state_change_time: Instant,
}

/// Generic circuit breaker implementation
///
/// The circuit breaker prevents cascading failures by monitoring operation
/// failures and temporarily blocking calls when a failure threshold is reached.
///
/// Supports both async and sync operations, with configurable Clock for
/// testing.
pub struct CircuitBreaker<C: Clock = SystemClock> {
    config: CircuitBreakerConfig,
    state: Arc<RwLock<CircuitState>>,
    failure_count: Arc<AtomicU64>,
    success_count: Arc<AtomicU64>,
    half_open_calls: Arc<AtomicU64>,
    total_calls: Arc<AtomicU64>,
    last_failure_time: Arc<RwLock<Option<Instant>>>,
    state_change_time: Arc<RwLock<Instant>>,
    clock: Arc<C>,
}

impl<C: Clock> fmt::Debug for CircuitBreaker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &self.get_state())
            .field("failure_count", &self.failure_count.load(Ordering::Acquire))
            .field("success_count", &self.success_count.load(Ordering::Acquire))
            .finish()
    }
}

impl<C: Clock> Clone for CircuitBreaker<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            failure_count: Arc::clone(&self.failure_count),
            success_count: Arc::clone(&self.success_count),
            half_open_calls: Arc::clone(&self.half_open_calls),
            total_calls: Arc::clone(&self.total_calls),
            last_failure_time: Arc::clone(&self.last_failure_time),
            state_change_time: Arc::clone(&self.state_change_time),
            clock: Arc::clone(&self.clock),
        }
    }
}

// Type aliases for common use cases
pub type SyncCircuitBreaker = CircuitBreaker<SystemClock>;

impl CircuitBreaker<SystemClock> {
    /// Create a new circuit breaker with the given configuration using system
    /// clock
    pub fn new(config: CircuitBreakerConfig) -> ConfigResult<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// Create a circuit breaker with default configuration (convenience method)
    pub fn with_defaults() -> Self {
        Self::new(CircuitBreakerConfig::default()).expect("Default config should be valid")
    }

    /// Create a circuit breaker using the builder pattern
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }
}

impl<C: Clock> CircuitBreaker<C> {
    /// Create a new circuit breaker with a custom clock (useful for testing)
    pub fn with_clock(config: CircuitBreakerConfig, clock: C) -> ConfigResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            state: Arc::new(RwLock::new(CircuitState::Closed)),
            failure_count: Arc::new(AtomicU64::new(0)),
            success_count: Arc::new(AtomicU64::new(0)),
            half_open_calls: Arc::new(AtomicU64::new(0)),
            total_calls: Arc::new(AtomicU64::new(0)),
            last_failure_time: Arc::new(RwLock::new(None)),
            state_change_time: Arc::new(RwLock::new(clock.now())),
            clock: Arc::new(clock),
        })
    }

    /// Fast check if circuit is available (lock-free when possible)
    ///
    /// This is a lightweight check useful for high-frequency polling scenarios.
    /// For complete state transition logic, use `can_execute()`.
    pub fn is_available(&self) -> bool {
        match self.state.read() {
            Ok(guard) => *guard != CircuitState::Open,
            Err(poisoned) => {
                warn!("Circuit breaker state lock poisoned in is_available");
                *poisoned.into_inner() != CircuitState::Open
            }
        }
    }

    /// Check if the circuit breaker allows execution
    ///
    /// Returns `false` if the circuit is open and the timeout hasn't elapsed,
    /// or if we're in half-open state and have reached the maximum calls.
    /// Returns `true` otherwise, potentially transitioning from open to
    /// half-open.
    pub fn can_execute(&self) -> bool {
        let state = match self.state.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                // If the lock is poisoned, we still want to try to recover
                warn!("Circuit breaker state lock poisoned: {}", poisoned);
                // Clear the poison and return the data
                *poisoned.into_inner()
            }
        };

        match state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                // Check if timeout has elapsed to potentially transition to half-open
                if let Ok(last_failure_guard) = self.last_failure_time.read() {
                    if let Some(failure_time) = *last_failure_guard {
                        let now = self.clock.now();
                        if now.duration_since(failure_time) >= self.config.timeout {
                            drop(last_failure_guard); // Release lock before state transition
                                                      // Transition to half-open
                            if let Ok(mut state) = self.state.write() {
                                *state = CircuitState::HalfOpen;
                                self.half_open_calls.store(0, Ordering::Release);
                            }
                            return true;
                        }
                    }
                }
                false
            }
            CircuitState::HalfOpen => {
                let current_calls = self.half_open_calls.load(Ordering::Acquire);
                current_calls < self.config.half_open_max_calls
            }
        }
    }

    /// Execute an operation with circuit breaker protection
    ///
    /// This method checks if the circuit allows execution, runs the operation
    /// if allowed, and records the result to update the circuit state.
    #[instrument(skip(self, operation), fields(state = %self.get_state()))]
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> ResilienceResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        if !self.can_execute() {
            debug!("Circuit breaker rejecting call - state: {}", self.get_state());
            return Err(ResilienceError::CircuitOpen);
        }

        self.total_calls.fetch_add(1, Ordering::Relaxed);

        let current_state = self.get_state();
        if current_state == CircuitState::HalfOpen {
            self.half_open_calls.fetch_add(1, Ordering::Relaxed);
        }

        match operation().await {
            Ok(result) => {
                self.record_success();
                debug!("Circuit breaker: operation succeeded");
                Ok(result)
            }
            Err(error) => {
                self.record_failure();
                warn!("Circuit breaker: operation failed - {:?}", error);
                Err(ResilienceError::OperationFailed { source: error })
            }
        }
    }

    /// Execute a synchronous operation with circuit breaker protection
    ///
    /// This method provides a synchronous alternative to `execute()`, useful
    /// for non-async contexts or when wrapping sync operations.
    #[instrument(skip(self, operation), fields(state = %self.get_state()))]
    pub fn call<F, T, E>(&self, operation: F) -> ResilienceResult<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        if !self.can_execute() {
            debug!("Circuit breaker rejecting call - state: {}", self.get_state());
            return Err(ResilienceError::CircuitOpen);
        }

        self.total_calls.fetch_add(1, Ordering::Relaxed);

        let current_state = self.get_state();
        if current_state == CircuitState::HalfOpen {
            self.half_open_calls.fetch_add(1, Ordering::Relaxed);
        }

        match operation() {
            Ok(result) => {
                self.record_success();
                debug!("Circuit breaker: operation succeeded");
                Ok(result)
            }
            Err(error) => {
                self.record_failure();
                warn!("Circuit breaker: operation failed");
                Err(ResilienceError::OperationFailed { source: error })
            }
        }
    }

    /// Record a successful operation
    pub fn record_success(&self) {
        let current_state = self.get_state();
        self.success_count.fetch_add(1, Ordering::Relaxed);

        match current_state {
            CircuitState::Closed => {
                if self.config.reset_on_success {
                    self.failure_count.store(0, Ordering::Relaxed);
                }
            }
            CircuitState::HalfOpen => {
                let success_count = self.success_count.load(Ordering::Acquire);
                if success_count >= self.config.success_threshold {
                    // Transition to closed
                    if let Ok(mut state_guard) = self.state.write() {
                        *state_guard = CircuitState::Closed;
                        self.failure_count.store(0, Ordering::Release);
                    }
                    info!("Circuit breaker closed after {} successes", success_count);
                }
            }
            CircuitState::Open => {
                // This shouldn't happen, but handle it gracefully
                warn!("Received success while circuit is open");
            }
        }
    }

    /// Record a failed operation
    pub fn record_failure(&self) {
        let failure_count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        let now = self.clock.now();

        // Update last failure time
        if let Ok(mut last_failure) = self.last_failure_time.write() {
            *last_failure = Some(now);
        }

        let current_state = self.get_state();

        match current_state {
            CircuitState::Closed => {
                if failure_count >= self.config.failure_threshold {
                    // Transition to open
                    if let Ok(mut state_guard) = self.state.write() {
                        *state_guard = CircuitState::Open;
                        if let Ok(mut last_failure) = self.last_failure_time.write() {
                            *last_failure = Some(now);
                        }
                    }
                    warn!("Circuit breaker opened after {} failures", failure_count);
                }
            }
            CircuitState::HalfOpen => {
                // Any failure in half-open state immediately opens the circuit
                // Transition to open
                if let Ok(mut state_guard) = self.state.write() {
                    *state_guard = CircuitState::Open;
                    if let Ok(mut last_failure) = self.last_failure_time.write() {
                        *last_failure = Some(now);
                    }
                }
                warn!("Circuit breaker opened due to failure in half-open state");
            }
            CircuitState::Open => {
                // Already open, just update metrics
            }
        }
    }

    /// Get the current state of the circuit breaker
    ///
    /// Returns the current circuit state, handling poisoned locks gracefully
    /// by returning the state from the poisoned data (fail-safe behavior).
    pub fn get_state(&self) -> CircuitState {
        match self.state.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn!("Circuit breaker state lock poisoned during get_state");
                *poisoned.into_inner()
            }
        }
    }

    /// Get circuit breaker metrics
    pub fn get_metrics(&self) -> CircuitBreakerMetrics {
        CircuitBreakerMetrics {
            state: self.get_state(),
            failure_count: self.failure_count.load(Ordering::Acquire),
            success_count: self.success_count.load(Ordering::Acquire),
            half_open_calls: self.half_open_calls.load(Ordering::Acquire),
            total_calls: self.total_calls.load(Ordering::Acquire),
            last_failure_time: self.last_failure_time.read().ok().and_then(|guard| *guard),
            state_change_time: self
                .state_change_time
                .read()
                .ok()
                .map(|guard| *guard)
                .unwrap_or_else(Instant::now),
        }
    }

    /// Get the current circuit state (alias for `get_state()`)
    ///
    /// Convenience method that returns the current state of the circuit
    /// breaker.
    pub fn state(&self) -> CircuitState {
        self.get_state()
    }

    /// Get current metrics snapshot (alias for `get_metrics()`)
    ///
    /// Convenience method that returns a snapshot of current circuit breaker
    /// metrics.
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        self.get_metrics()
    }

    /// Reset the circuit breaker to closed state
    pub fn reset(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        self.success_count.store(0, Ordering::Relaxed);
        self.half_open_calls.store(0, Ordering::Relaxed);

        if let Ok(mut last_failure) = self.last_failure_time.write() {
            *last_failure = None;
        }

        // Reset to closed state
        if let Ok(mut state_guard) = self.state.write() {
            *state_guard = CircuitState::Closed;
            self.failure_count.store(0, Ordering::Release);
            self.success_count.store(0, Ordering::Release);
        }
        info!("Circuit breaker manually reset to closed state");
    }
}

impl Default for CircuitBreaker<SystemClock> {
    fn default() -> Self {
        Self::with_defaults()
    }
}
