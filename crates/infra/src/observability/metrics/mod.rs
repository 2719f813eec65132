//! Metrics collection modules
//!
//! Thread-safe metrics for various subsystems.

pub mod cache;
pub mod call;
pub mod db;
pub mod fetch;

// Re-export metric types for convenience
pub use cache::CacheMetrics;
pub use call::CallMetrics;
pub use db::{DbMetrics, DbStats};
pub use fetch::FetchMetrics;
