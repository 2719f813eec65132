//! Cache configuration types and builder patterns
//!
//! This module provides configuration types for customizing cache behavior,
//! including eviction policies, TTL settings, and size limits.

use std::time::Duration;

/// Eviction policy for cache entries when capacity is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Least Recently Used - evicts the least recently accessed entry
    #[default]
    LRU,
    /// Least Frequently Used - evicts the least frequently accessed entry
    LFU,
    /// First In First Out - evicts the oldest entry by insertion time
    FIFO,
    /// Random eviction
    Random,
    /// No automatic eviction (manual only)
    None,
}

/// Configuration for cache behavior
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries (None = unlimited)
    pub max_size: Option<usize>,

    /// Time-to-live for entries (None = no expiration)
    pub ttl: Option<Duration>,

    /// Eviction policy when max_size is reached
    pub eviction_policy: EvictionPolicy,

    /// Whether to collect detailed access metrics
    pub track_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: None,
            ttl: None,
            eviction_policy: EvictionPolicy::LRU,
            track_metrics: false,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset for TTL-based cache
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use pulsearc_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::ttl(Duration::from_secs(3600));
    /// ```
    pub fn ttl(duration: Duration) -> Self {
        Self {
            max_size: None,
            ttl: Some(duration),
            eviction_policy: EvictionPolicy::None,
            track_metrics: false,
        }
    }

    /// Quick preset for LRU cache
    ///
    /// # Example
    /// ```
    /// use pulsearc_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::lru(1000);
    /// ```
    pub fn lru(max_size: usize) -> Self {
        Self {
            max_size: Some(max_size),
            ttl: None,
            eviction_policy: EvictionPolicy::LRU,
            track_metrics: false,
        }
    }

    /// Combined TTL + LRU cache
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use pulsearc_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::ttl_lru(Duration::from_secs(3600), 1000);
    /// ```
    pub fn ttl_lru(ttl: Duration, max_size: usize) -> Self {
        Self {
            max_size: Some(max_size),
            ttl: Some(ttl),
            eviction_policy: EvictionPolicy::LRU,
            track_metrics: false,
        }
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum number of entries
    pub fn max_size(mut self, size: usize) -> Self {
        self.config.max_size = Some(size);
        self
    }

    /// Set time-to-live for entries
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.config.ttl = Some(duration);
        self
    }

    /// Set eviction policy
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.eviction_policy = policy;
        self
    }

    /// Enable or disable metrics tracking
    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
