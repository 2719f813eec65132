//! Core cache implementation with configurable eviction policies
//!
//! This module provides a generic, thread-safe cache with support for
//! multiple eviction policies (LRU, LFU, FIFO, Random, None) and TTL
//! expiration.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::config::{CacheConfig, EvictionPolicy};
use super::stats::{CacheStats, MetricsCollector};
use crate::resilience::{Clock, SystemClock};

/// Entry stored in the cache with metadata for eviction policies
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    last_accessed: Instant,
    access_count: u64,
}

/// Internal storage for cache entries
#[derive(Debug)]
struct CacheStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    entries: HashMap<K, CacheEntry<V>>,
    /// Tracks order for LRU/FIFO eviction
    access_order: Vec<K>,
}

impl<K, V> CacheStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self { entries: HashMap::new(), access_order: Vec::new() }
    }
}

/// Generic thread-safe cache with configurable eviction policies
///
/// # Type Parameters
/// - `K`: Key type (must be `Eq + Hash + Clone`)
/// - `V`: Value type (must be `Clone`)
/// - `C`: Clock type for time-based operations (defaults to `SystemClock`)
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use pulsearc_common::cache::{Cache, CacheConfig};
///
/// // Create a simple LRU cache
/// let cache: Cache<String, i32> = Cache::new(CacheConfig::lru(100));
/// cache.insert("key".to_string(), 42);
/// assert_eq!(cache.get(&"key".to_string()), Some(42));
/// ```
#[allow(clippy::type_complexity)]
pub struct Cache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    storage: Arc<RwLock<CacheStorage<K, V>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new cache with the given configuration using system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            storage: Arc::new(RwLock::new(CacheStorage::new())),
            config,
            metrics: MetricsCollector::new(),
            clock,
        }
    }

    /// Insert a value into the cache
    ///
    /// If the cache is at capacity, an entry will be evicted according to the
    /// configured eviction policy before inserting the new entry.
    pub fn insert(&self, key: K, value: V) {
        let mut storage = self.storage.write().unwrap();

        // Check if eviction is needed
        if let Some(max_size) = self.config.max_size {
            if storage.entries.len() >= max_size && !storage.entries.contains_key(&key) {
                self.evict_one(&mut storage);
            }
        }

        let now = self.clock.now();
        let entry = CacheEntry { value, inserted_at: now, last_accessed: now, access_count: 0 };

        storage.entries.insert(key.clone(), entry);

        // Update access order for LRU/FIFO policies
        if matches!(self.config.eviction_policy, EvictionPolicy::LRU | EvictionPolicy::FIFO) {
            storage.access_order.retain(|k| k != &key);
            storage.access_order.push(key);
        }

        if self.config.track_metrics {
            self.metrics.record_insert();
        }
    }

    /// Get a value from the cache
    ///
    /// Returns `None` if the key doesn't exist or if the entry has expired.
    /// Updates access metadata for eviction policies.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut storage = self.storage.write().unwrap();

        // Check if key exists and isn't expired
        let entry_exists = storage.entries.contains_key(key);
        if !entry_exists {
            if self.config.track_metrics {
                self.metrics.record_miss();
            }
            return None;
        }

        // Check TTL expiration
        if let Some(ttl) = self.config.ttl {
            if let Some(entry) = storage.entries.get(key) {
                let now = self.clock.now();
                let elapsed = now.duration_since(entry.inserted_at);
                if elapsed >= ttl {
                    // Entry expired, remove it
                    storage.entries.remove(key);
                    storage.access_order.retain(|k| k != key);

                    if self.config.track_metrics {
                        self.metrics.record_miss();
                        self.metrics.record_expiration();
                    }
                    return None;
                }
            }
        }

        // Update access metadata and get value
        if let Some(entry) = storage.entries.get_mut(key) {
            entry.last_accessed = self.clock.now();
            entry.access_count += 1;
            let value = entry.value.clone();

            // Update LRU order (after releasing mutable borrow of entry)
            let _ = entry;
            if self.config.eviction_policy == EvictionPolicy::LRU {
                storage.access_order.retain(|k| k != key);
                storage.access_order.push(key.clone());
            }

            if self.config.track_metrics {
                self.metrics.record_hit();
            }

            Some(value)
        } else {
            if self.config.track_metrics {
                self.metrics.record_miss();
            }
            None
        }
    }

    /// Get or insert with a generator function
    ///
    /// If the key exists and hasn't expired, returns the cached value.
    /// Otherwise, generates a new value using the provided function.
    ///
    /// # Example
    /// ```
    /// use pulsearc_common::cache::{Cache, CacheConfig};
    ///
    /// let cache: Cache<String, i32> = Cache::new(CacheConfig::lru(100));
    /// let value = cache.get_or_insert_with("key".to_string(), || 42);
    /// assert_eq!(value, 42);
    /// ```
    pub fn get_or_insert_with<F>(&self, key: K, f: F) -> V
    where
        F: FnOnce() -> V,
    {
        // Try to get existing value
        if let Some(value) = self.get(&key) {
            return value;
        }

        // Generate new value
        let value = f();
        self.insert(key, value.clone());
        value
    }

    /// Remove a value from the cache
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut storage = self.storage.write().unwrap();
        storage.access_order.retain(|k| k != key);
        storage.entries.remove(key).map(|e| e.value)
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        let mut storage = self.storage.write().unwrap();
        storage.entries.clear();
        storage.access_order.clear();

        if self.config.track_metrics {
            self.metrics.reset();
        }
    }

    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.storage.read().unwrap().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove expired entries
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        if self.config.ttl.is_none() {
            return 0;
        }

        let ttl = self.config.ttl.unwrap();
        let now = self.clock.now();
        let mut storage = self.storage.write().unwrap();

        // Collect keys to remove (avoid borrow conflict)
        let keys_to_remove: Vec<K> = storage
            .entries
            .iter()
            .filter(|(_, entry)| {
                let elapsed = now.duration_since(entry.inserted_at);
                elapsed >= ttl
            })
            .map(|(k, _)| k.clone())
            .collect();

        // Remove expired entries
        for key in &keys_to_remove {
            storage.entries.remove(key);
            storage.access_order.retain(|k| k != key);

            if self.config.track_metrics {
                self.metrics.record_expiration();
            }
        }

        keys_to_remove.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let size = self.len();
        self.metrics.snapshot(size, self.config.max_size)
    }

    /// Evict one entry based on the configured policy
    fn evict_one(&self, storage: &mut CacheStorage<K, V>) {
        let key_to_evict = match self.config.eviction_policy {
            EvictionPolicy::LRU => {
                // Least recently used (first in access order)
                storage.access_order.first().cloned()
            }

            EvictionPolicy::LFU => {
                // Least frequently used (lowest access count)
                storage
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.access_count)
                    .map(|(k, _)| k.clone())
            }

            EvictionPolicy::FIFO => {
                // First in first out (oldest insertion, first in access order)
                storage.access_order.first().cloned()
            }

            EvictionPolicy::Random => {
                // Random eviction
                use rand::seq::IteratorRandom;
                let mut rng = rand::thread_rng();
                storage.entries.keys().choose(&mut rng).cloned()
            }

            EvictionPolicy::None => None,
        };

        if let Some(key) = key_to_evict {
            storage.entries.remove(&key);
            storage.access_order.retain(|k| k != &key);

            if self.config.track_metrics {
                self.metrics.record_eviction();
            }
        }
    }
}

impl<K, V, C> Clone for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            clock: self.clock.clone(),
        }
    }
}
