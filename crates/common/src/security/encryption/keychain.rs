//! Generic keychain provider for secure credential storage
//!
//! This module exposes a thin wrapper over the platform keychain for storing
//! arbitrary secrets and encryption keys across macOS (Keychain Access),
//! Windows (Credential Manager), and Linux (Secret Service API).
//!
//! ## Features
//!
//! - **Secret Storage**: Persist arbitrary strings in the platform keychain
//! - **Encryption Keys**: Manage encryption keys with automatic generation
//! - **Cross-platform**: Works on macOS, Windows, and Linux
//! - **Backward Compatible**: Maintains existing keychain entry structure
//!
//! ## Module Relationships
//!
//! This module provides the **generic** keychain provider. Domain-specific
//! helpers are built on top:
//!
//! - This module (`security::encryption::keychain`): Generic secret storage
//! - `auth::keychain`: OAuth token-specific storage helpers
//! - `security::keychain`: Convenience re-export of this module
//!
//! ## Usage
//!
//! ```no_run
//! use pulsearc_common::security::keychain::KeychainProvider;
//!
//! let keychain = KeychainProvider::new("PulseArc.encryption");
//! keychain.set_secret("service_account", "super-secret")?;
//! let secret = keychain.get_secret("service_account")?;
//! assert_eq!(secret, "super-secret");
//! # Ok::<(), pulsearc_common::security::KeychainError>(())
//! ```

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Generic keychain provider for secure credential storage
///
/// Maintains compatibility with existing key naming conventions while
/// allowing callers to persist arbitrary secrets and encryption keys.
pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    /// Create a new keychain provider for a specific service
    ///
    /// # Arguments
    /// * `service_name` - Service identifier (e.g., "PulseArc.calendar",
    ///   "PulseArc.sap")
    ///
    /// # Examples
    /// ```
    /// use pulsearc_common::security::keychain::KeychainProvider;
    ///
    /// let keychain = KeychainProvider::new("PulseArc.calendar");
    /// ```
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    /// Store a secret value in the platform keychain
    ///
    /// # Arguments
    /// * `key` - Logical key (e.g., "access.user@example.com")
    /// * `value` - Secret value to persist
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if keychain access fails
    pub fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        debug!(
            service = %self.service_name,
            key = %key,
            "Storing secret in keychain"
        );

        let entry = self.create_entry(key)?;
        entry.set_password(value).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to store secret for {}: {}", key, e))
        })?;

        debug!(service = %self.service_name, key = %key, "Secret stored successfully");

        Ok(())
    }

    /// Retrieve a secret value from the platform keychain
    ///
    /// # Errors
    /// Returns `KeychainError::NotFound` if secret doesn't exist
    /// Returns `KeychainError::AccessFailed` if keychain access fails
    pub fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        debug!(
            service = %self.service_name,
            key = %key,
            "Retrieving secret from keychain"
        );

        let entry = self.create_entry(key)?;
        let secret = entry.get_password().map_err(|e| {
            if matches!(e, keyring::Error::NoEntry) {
                KeychainError::NotFound
            } else {
                KeychainError::AccessFailed(format!("Failed to retrieve secret for {}: {}", key, e))
            }
        })?;

        debug!(service = %self.service_name, key = %key, "Secret retrieved successfully");

        Ok(secret)
    }

    /// Delete a secret from the platform keychain (idempotent)
    pub fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        debug!(
            service = %self.service_name,
            key = %key,
            "Deleting secret from keychain"
        );

        match self.create_entry(key) {
            Ok(entry) => {
                if let Err(e) = entry.delete_credential() {
                    if !matches!(e, keyring::Error::NoEntry) {
                        return Err(KeychainError::AccessFailed(format!(
                            "Failed to delete secret for {}: {}",
                            key, e
                        )));
                    }
                }
            }
            Err(e) => return Err(e),
        }

        debug!(service = %self.service_name, key = %key, "Secret deleted successfully");

        Ok(())
    }

    /// Check if a secret exists in the keychain
    #[must_use]
    pub fn secret_exists(&self, key: &str) -> bool {
        match self.create_entry(key) {
            Ok(entry) => entry.get_password().is_ok(),
            Err(_) => false,
        }
    }

    /// Store an encryption key in the keychain
    ///
    /// # Arguments
    /// * `key_id` - Key identifier (e.g., "db_encryption_key")
    /// * `key` - Encryption key string
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if keychain access fails
    pub fn store_key(&self, key_id: &str, key: &str) -> Result<(), KeychainError> {
        debug!(
            service = %self.service_name,
            key_id = %key_id,
            "Storing encryption key in keychain"
        );

        self.set_secret(key_id, key)
    }

    /// Retrieve an encryption key from the keychain
    ///
    /// # Arguments
    /// * `key_id` - Key identifier
    ///
    /// # Returns
    /// The encryption key string
    ///
    /// # Errors
    /// Returns `KeychainError::NotFound` if key doesn't exist
    /// Returns `KeychainError::AccessFailed` if keychain access fails
    pub fn retrieve_key(&self, key_id: &str) -> Result<String, KeychainError> {
        debug!(
            service = %self.service_name,
            key_id = %key_id,
            "Retrieving encryption key from keychain"
        );

        self.get_secret(key_id)
    }

    /// Get or create an encryption key
    ///
    /// If the key exists in the keychain, it is returned.
    /// If the key doesn't exist, a new random key of the specified size is
    /// generated, stored in the keychain, and returned.
    ///
    /// # Arguments
    /// * `key_id` - Key identifier (e.g., "db_encryption_key")
    /// * `key_size` - Size of the key to generate (in characters) if it doesn't
    ///   exist
    ///
    /// # Returns
    /// The encryption key string
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if keychain access fails
    pub fn get_or_create_key(
        &self,
        key_id: &str,
        key_size: usize,
    ) -> Result<String, KeychainError> {
        debug!(
            service = %self.service_name,
            key_id = %key_id,
            key_size = %key_size,
            "Getting or creating encryption key"
        );

        match self.retrieve_key(key_id) {
            Ok(key) => {
                debug!(
                    service = %self.service_name,
                    key_id = %key_id,
                    "Existing encryption key found"
                );
                Ok(key)
            }
            Err(KeychainError::NotFound) => {
                debug!(
                    service = %self.service_name,
                    key_id = %key_id,
                    "No existing key found, generating new key"
                );

                // Generate new random key
                use rand::distributions::{Alphanumeric, DistString};
                let key = Alphanumeric.sample_string(&mut rand::thread_rng(), key_size);

                // Store in keychain
                self.store_key(key_id, &key)?;

                debug!(
                    service = %self.service_name,
                    key_id = %key_id,
                    "New encryption key generated and stored"
                );

                Ok(key)
            }
            Err(e) => Err(e),
        }
    }

    /// Create a keyring entry
    ///
    /// # Arguments
    /// * `account` - Account/key identifier
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if entry creation fails
    fn create_entry(&self, account: &str) -> Result<Entry, KeychainError> {
        Entry::new(&self.service_name, account).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to create keychain entry: {}", e))
        })
    }
}

/// Keychain error types
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Keychain access failed (permission denied, not available, etc.)
    #[error("Keychain access failed: {0}")]
    AccessFailed(String),

    /// Entry not found in keychain
    #[error("Entry not found")]
    NotFound,

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying keyring library error
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

// Note: Error conversions (From<KeychainError>) have been moved to consuming
// modules:
// - integrations/calendar/error.rs for CalendarError
// - integrations/sap/error.rs for SapError
// - storage/error.rs for StorageError
// This prevents common/keychain from depending on integration-specific modules.
