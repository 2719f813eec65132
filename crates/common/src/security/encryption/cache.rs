//! Key caching for performance optimization
//!
//! Provides thread-safe caching of encryption keys to avoid repeated
//! keychain access or environment variable lookups.

use std::sync::OnceLock;

use tracing::{info, warn};

use crate::security::encryption::SecureString;
use crate::storage::config::KeySource;
use crate::storage::error::StorageResult;

/// Thread-safe cached key storage
///
/// Uses `OnceLock` to ensure the key is retrieved only once per process
/// lifetime, reducing keychain access overhead.
static CACHED_KEY: OnceLock<SecureString> = OnceLock::new();

/// Get or create encryption key with caching
///
/// On first call, retrieves/generates the key from the specified source
/// and caches it. Subsequent calls return the cached key instantly.
///
/// # Performance
/// - First call: Normal keychain/env lookup time
/// - Subsequent calls: ~0ms (memory access only)
///
/// # Arguments
/// * `key_source` - Source to retrieve the key from (only used on first call)
///
/// # Returns
/// A static reference to the cached `SecureString`
///
/// # Example
/// ```no_run
/// use pulsearc_common::security::encryption::cache::get_or_create_key_cached;
/// use pulsearc_common::storage::config::KeySource;
///
/// let key_source = KeySource::Keychain {
///     service: "PulseArc".to_string(),
///     username: "db_encryption_key".to_string(),
/// };
///
/// // First call - retrieves from keychain
/// let key1 = get_or_create_key_cached(&key_source).unwrap();
///
/// // Second call - instant (cached)
/// let key2 = get_or_create_key_cached(&key_source).unwrap();
///
/// // Both are the same reference
/// assert!(std::ptr::eq(key1, key2));
/// ```
///
/// # Thread Safety
/// Safe to call from multiple threads concurrently. The `OnceLock`
/// ensures only one thread performs the initialization.
pub fn get_or_create_key_cached(key_source: &KeySource) -> StorageResult<&'static SecureString> {
    // Check if already initialized
    if let Some(key) = CACHED_KEY.get() {
        return Ok(key);
    }

    // Initialize the key
    info!("Initializing encryption key (will be cached for process lifetime)");
    let key = crate::security::encryption::get_or_create_key(key_source)?;

    // Try to cache it - if another thread already cached, use theirs
    Ok(CACHED_KEY.get_or_init(|| key))
}

/// Check if a key is currently cached
///
/// Returns `true` if a key has been cached, `false` otherwise.
/// Useful for testing or diagnostics.
pub fn is_cached() -> bool {
    CACHED_KEY.get().is_some()
}

/// Clear the cached key
///
/// # Security Note
/// This function is intended for use during security events (e.g., suspected
/// compromise, policy changes) or key rotation procedures.
///
/// # Current Limitation
/// `OnceLock` doesn't support clearing in stable Rust (as of Rust 1.77).
/// This function logs the clear request for audit purposes, but the actual
/// cache clearing requires a **process restart**.
///
/// # Recommended Procedure for Key Rotation
/// 1. Call `clear_cache()` to log the security event
/// 2. Generate or retrieve new key from key source
/// 3. Restart the application process
/// 4. New process will load the new key on first access
///
/// # Future Enhancement
/// When `OnceLock::take()` or similar becomes available in stable Rust,
/// this will properly clear the cache without requiring process restart.
///
/// # Example
/// ```
/// use pulsearc_common::security::encryption::cache::clear_cache;
///
/// // On security event or key rotation
/// clear_cache(); // Logs event, requires restart for effect
/// ```
pub fn clear_cache() {
    if is_cached() {
        warn!("Key cache clear requested - this is a security-sensitive operation");
        warn!(
            "IMPORTANT: Process restart required for cache clear to take effect (OnceLock limitation)"
        );
        info!(
            "Key rotation procedure: (1) Clear cache, (2) Update key source, (3) Restart process"
        );
    } else {
        info!("Cache clear requested but no key is currently cached");
    }
}

/// Force clear cache on security event
///
/// Similar to `clear_cache()` but includes additional security event logging.
/// Use this when clearing the cache due to a security incident.
///
/// # Security Event Logging
/// This function logs the cache clear as a security event for audit trails.
///
/// # Arguments
/// * `reason` - Reason for the security event (e.g., "suspected_compromise",
///   "key_rotation")
///
/// # Example
/// ```
/// use pulsearc_common::security::encryption::cache::clear_cache_on_security_event;
///
/// // On suspected compromise
/// clear_cache_on_security_event("suspected_key_compromise");
/// ```
pub fn clear_cache_on_security_event(reason: &str) {
    warn!(
        reason = %reason,
        "SECURITY EVENT: Key cache clear requested"
    );
    clear_cache();
}

/// Get statistics about cache usage
#[derive(Debug)]
pub struct CacheStats {
    pub is_cached: bool,
    pub key_length: Option<usize>,
}

/// Get cache statistics
///
/// Useful for monitoring and diagnostics.
pub fn get_cache_stats() -> CacheStats {
    let key = CACHED_KEY.get();
    CacheStats { is_cached: key.is_some(), key_length: key.map(|k| k.len()) }
}
