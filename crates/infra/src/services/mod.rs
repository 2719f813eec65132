//! Service layer implementations.
//!
//! Services provide high-level business logic and caching on top of
//! repositories.

pub mod feature_flag_service;

pub use feature_flag_service::FeatureFlagService;
