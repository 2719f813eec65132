//! WBS code validation logic
//!
//! Validates WBS codes using three layers:
//! 1. **Format validation** (static) - Regex, length, special chars
//! 2. **Existence validation** (cached) - Via WbsCache
//! 3. **Status validation** - REL, CLSD, TECO
//!
//! # Architecture
//!
//! Returns structured `WbsValidationResult` with `WbsValidationCode` enum
//! for API stability. Consumers match on enum variants, not message strings.
//!
//! # Example
//!
//! ```rust,ignore
//! use pulsearc_infra::integrations::sap::validation::{WbsValidator, WbsValidationResult};
//!
//! let validator = WbsValidator::new(cache);
//!
//! match validator.validate("USC0063201.1.1")? {
//!     WbsValidationResult::Valid => println!("Valid!"),
//!     WbsValidationResult::Warning { code, message } => {
//!         println!("Warning ({}): {}", code.as_str(), message);
//!     }
//!     WbsValidationResult::Error { code, message } => {
//!         println!("Error ({}): {}", code.as_str(), message);
//!     }
//! }
//! ```

use std::sync::{Arc, OnceLock};

use pulsearc_common::time::{Clock, SystemClock};
use pulsearc_core::classification::ports::WbsRepository;
use pulsearc_domain::Result;
use regex::Regex;

use super::cache::WbsCache;

/// Static validation codes for API stability
///
/// These codes can be matched on by API consumers without
/// needing to parse error messages. Use `as_str()` for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WbsValidationCode {
    /// WBS code is valid and active
    Valid,

    /// WBS code format is invalid (regex check failed)
    FormatInvalid,

    /// WBS code is empty
    Empty,

    /// WBS code exceeds max length (50 chars)
    TooLong,

    /// WBS code contains invalid special characters
    InvalidChars,

    /// WBS element status is CLSD (closed, no new entries)
    StatusClosed,

    /// WBS element status is TECO (technically complete, restricted)
    StatusTechnicallyComplete,

    /// WBS element status is unknown
    StatusUnknown,

    /// WBS code not found in cache
    NotFoundInCache,

    /// Cache entry is stale (>24 hours old)
    CacheStale,
}

impl WbsValidationCode {
    /// Get static string code for API responses
    ///
    /// These codes are stable across versions and can be
    /// used by clients for conditional logic.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::FormatInvalid => "FORMAT_INVALID",
            Self::Empty => "EMPTY",
            Self::TooLong => "TOO_LONG",
            Self::InvalidChars => "INVALID_CHARS",
            Self::StatusClosed => "STATUS_CLOSED",
            Self::StatusTechnicallyComplete => "STATUS_TECHNICALLY_COMPLETE",
            Self::StatusUnknown => "STATUS_UNKNOWN",
            Self::NotFoundInCache => "NOT_FOUND_IN_CACHE",
            Self::CacheStale => "CACHE_STALE",
        }
    }
}

/// Validation result for WBS code validation
///
/// Structured with enum codes for API stability. Consumers should
/// match on the `code()` variant, not parse `message` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WbsValidationResult {
    /// WBS code is valid and active
    Valid,

    /// WBS code has issues but may still be usable
    Warning { code: WbsValidationCode, message: String },

    /// WBS code is invalid and cannot be used
    Error { code: WbsValidationCode, message: String },
}

impl WbsValidationResult {
    /// Check if validation passed (Valid or Warning)
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// Check if validation failed
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Get the validation code
    pub fn code(&self) -> WbsValidationCode {
        match self {
            Self::Valid => WbsValidationCode::Valid,
            Self::Warning { code, .. } | Self::Error { code, .. } => *code,
        }
    }

    /// Get the message (if any)
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Warning { message, .. } | Self::Error { message, .. } => Some(message),
        }
    }
}

/// WBS code validator
///
/// Validates WBS codes using three layers:
/// 1. Format validation (static, no database)
/// 2. Existence validation (via cache)
/// 3. Status validation (REL/CLSD/TECO)
pub struct WbsValidator<C: Clock = SystemClock> {
    cache: Arc<WbsCache>,
    repository: Arc<dyn WbsRepository>,
    clock: Arc<C>,
}

/// Get cached regex pattern for WBS format validation
fn wbs_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        // Match: USC0063201.1.1, P-12345-01-001, WBS-001-002
        // Must start and end with alphanumeric, can contain dots/hyphens
        Regex::new(r"^[A-Z0-9][A-Z0-9.\-]*[A-Z0-9]$").unwrap()
    })
}

/// Normalize WBS code (uppercase, trim)
pub fn normalize_wbs_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validate WBS code format (static, no database)
///
/// Checks:
/// - Not empty
/// - Max length 50 characters
/// - No invalid special characters (%, $, @)
/// - Must contain at least one letter
/// - Matches regex pattern
pub fn validate_wbs_format(code: &str) -> WbsValidationResult {
    let normalized = normalize_wbs_code(code);

    // Check empty
    if normalized.is_empty() {
        return WbsValidationResult::Error {
            code: WbsValidationCode::Empty,
            message: "WBS code cannot be empty".to_string(),
        };
    }

    // Check max length
    if normalized.len() > 50 {
        return WbsValidationResult::Error {
            code: WbsValidationCode::TooLong,
            message: format!(
                "WBS code exceeds maximum length of 50 characters (got {})",
                normalized.len()
            ),
        };
    }

    // Check special characters
    if normalized.contains(['%', '$', '@']) {
        return WbsValidationResult::Error {
            code: WbsValidationCode::InvalidChars,
            message: "WBS code contains invalid special characters (%, $, or @)".to_string(),
        };
    }

    // Must contain at least one letter
    if !normalized.chars().any(|c| c.is_alphabetic()) {
        return WbsValidationResult::Error {
            code: WbsValidationCode::FormatInvalid,
            message: "WBS code must contain at least one letter".to_string(),
        };
    }

    // Check regex pattern
    if !wbs_regex().is_match(&normalized) {
        return WbsValidationResult::Error {
            code: WbsValidationCode::FormatInvalid,
            message: "Invalid WBS code format. Expected format: USC0063201.1.1 or P-12345-01-001"
                .to_string(),
        };
    }

    WbsValidationResult::Valid
}

/// Validate WBS status
///
/// Status codes:
/// - REL (Released) → Valid
/// - CLSD (Closed) → Error
/// - TECO (Technically Complete) → Warning
/// - Other → Warning
pub fn validate_wbs_status(status: &str) -> WbsValidationResult {
    match status.to_uppercase().as_str() {
        "REL" => WbsValidationResult::Valid,
        "CLSD" => WbsValidationResult::Error {
            code: WbsValidationCode::StatusClosed,
            message: "This project is closed and cannot accept new time entries".to_string(),
        },
        "TECO" => WbsValidationResult::Warning {
            code: WbsValidationCode::StatusTechnicallyComplete,
            message: "This project is technically complete. Time entries may be restricted"
                .to_string(),
        },
        other => WbsValidationResult::Warning {
            code: WbsValidationCode::StatusUnknown,
            message: format!("Unknown project status: {}", other),
        },
    }
}

impl WbsValidator<SystemClock> {
    /// Create a new validator
    pub fn new(cache: Arc<WbsCache>, repository: Arc<dyn WbsRepository>) -> Self {
        Self::with_clock(cache, repository, Arc::new(SystemClock))
    }
}

impl<C: Clock> WbsValidator<C> {
    /// Create a new validator with a custom clock (useful for deterministic
    /// tests)
    pub fn with_clock(
        cache: Arc<WbsCache>,
        repository: Arc<dyn WbsRepository>,
        clock: Arc<C>,
    ) -> Self {
        Self { cache, repository, clock }
    }

    /// Helper to get current timestamp from clock (seconds since UNIX epoch)
    fn now_timestamp(&self) -> i64 {
        (self.clock.millis_since_epoch() / 1000) as i64
    }

    /// Validate WBS code existence (uses cache)
    pub fn validate_existence(&self, code: &str) -> Result<WbsValidationResult> {
        let normalized = normalize_wbs_code(code);

        match self.cache.get_or_fetch(&normalized, &*self.repository)? {
            Some(wbs) => {
                // Check if cache entry is stale (>24 hours old)
                let now = self.now_timestamp();
                let age_hours = (now - wbs.cached_at) / 3600;

                if age_hours > 24 {
                    Ok(WbsValidationResult::Warning {
                        code: WbsValidationCode::CacheStale,
                        message: format!(
                            "WBS code found but cache is {} hours old. Consider syncing.",
                            age_hours
                        ),
                    })
                } else {
                    Ok(WbsValidationResult::Valid)
                }
            }
            None => Ok(WbsValidationResult::Error {
                code: WbsValidationCode::NotFoundInCache,
                message: "WBS code not found in cache. Please sync to get the latest codes"
                    .to_string(),
            }),
        }
    }

    /// Validate a WBS code (format + existence + status)
    ///
    /// Performs all three validation layers:
    /// 1. Format validation (fails fast on format errors)
    /// 2. Existence validation (queries cache/repository)
    /// 3. Status validation (checks REL/CLSD/TECO)
    ///
    /// Returns the first error encountered, or the highest severity result.
    pub fn validate(&self, code: &str) -> Result<WbsValidationResult> {
        // Step 1: Validate format (fail fast)
        let format_result = validate_wbs_format(code);
        if format_result.is_err() {
            return Ok(format_result);
        }

        let normalized = normalize_wbs_code(code);

        // Step 2: Check existence (via cache)
        match self.cache.get_or_fetch(&normalized, &*self.repository)? {
            Some(wbs) => {
                // Step 3: Validate status
                let status_result = validate_wbs_status(&wbs.status);
                if status_result.is_err() {
                    return Ok(status_result);
                }

                // Step 4: Check cache freshness
                let now = self.now_timestamp();
                let age_hours = (now - wbs.cached_at) / 3600;

                if age_hours > 24 {
                    // Return staleness warning if no other warnings
                    if status_result == WbsValidationResult::Valid {
                        Ok(WbsValidationResult::Warning {
                            code: WbsValidationCode::CacheStale,
                            message: format!(
                                "WBS code is valid but cache is {} hours old",
                                age_hours
                            ),
                        })
                    } else {
                        // Return status warning (e.g., TECO)
                        Ok(status_result)
                    }
                } else {
                    // All checks passed or non-blocking warning
                    Ok(status_result)
                }
            }
            None => Ok(WbsValidationResult::Error {
                code: WbsValidationCode::NotFoundInCache,
                message: "WBS code not found in cache. Please sync.".to_string(),
            }),
        }
    }

    /// Validate multiple WBS codes in batch
    ///
    /// Returns a vector of tuples with normalized code and validation result.
    /// Continues validation even if some codes fail.
    #[allow(clippy::type_complexity)] // Return type is clear: list of (code, validation result)
    pub fn validate_batch(&self, codes: Vec<String>) -> Vec<(String, Result<WbsValidationResult>)> {
        codes
            .into_iter()
            .map(|code| {
                let normalized = normalize_wbs_code(&code);
                let result = self.validate(&code);
                (normalized, result)
            })
            .collect()
    }
}
