//! Common manager patterns and utilities for the Tauri agent
//!
//! This module provides standardized manager infrastructure that can be used
//! across all modules in the application. It includes lifecycle management,
//! Arc<RwLock<T>> utilities, and async accessor patterns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::timeout;

use crate::error::{CommonError, CommonResult};

/// Standard lifecycle trait for all manager types
///
/// This trait provides a common interface for manager initialization,
/// health checking, and graceful shutdown.
#[async_trait::async_trait]
pub trait AsyncManager: Send + Sync + 'static {
    /// Error type for this manager
    type Error: std::error::Error + Send + Sync + 'static;

    /// Configuration type for this manager
    type Config: Clone + Send + Sync + 'static;

    /// Create a new manager instance with default configuration
    async fn new() -> Result<Self, Self::Error>
    where
        Self: Sized;

    /// Create a new manager instance with custom configuration
    async fn with_config(config: Self::Config) -> Result<Self, Self::Error>
    where
        Self: Sized;

    /// Initialize the manager and any required resources
    async fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Check if the manager is healthy and operational
    async fn health_check(&self) -> Result<ManagerHealth, Self::Error>;

    /// Gracefully shutdown the manager and release resources
    async fn shutdown(&mut self) -> Result<(), Self::Error>;

    /// Get the manager's current status
    fn status(&self) -> ManagerStatus;

    /// Get manager metadata for monitoring/debugging
    fn metadata(&self) -> ManagerMetadata {
        ManagerMetadata {
            type_name: std::any::type_name::<Self>().to_string(),
            status: self.status(),
            health: None, // Async method, can't call here
        }
    }
}

/// Manager lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerStatus {
    /// Manager has been created but not initialized
    Created,
    /// Manager is initializing
    Initializing,
    /// Manager is running and operational
    Running,
    /// Manager is shutting down
    ShuttingDown,
    /// Manager has been shut down
    Shutdown,
    /// Manager encountered an error
    Error,
}

impl std::fmt::Display for ManagerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Initializing => write!(f, "Initializing"),
            Self::Running => write!(f, "Running"),
            Self::ShuttingDown => write!(f, "Shutting Down"),
            Self::Shutdown => write!(f, "Shutdown"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Manager health status
#[derive(Debug, Clone)]
pub struct ManagerHealth {
    /// Overall health status
    pub is_healthy: bool,
    /// Health score from 0.0 (unhealthy) to 1.0 (perfectly healthy)
    pub score: f64,
    /// Optional health message
    pub message: Option<String>,
    /// Individual component health checks
    pub components: Vec<ComponentHealth>,
    /// Timestamp of health check
    pub timestamp: std::time::SystemTime,
}

impl ManagerHealth {
    /// Create a healthy status
    pub fn healthy() -> Self {
        Self {
            is_healthy: true,
            score: 1.0,
            message: None,
            components: Vec::new(),
            timestamp: std::time::SystemTime::now(),
        }
    }

    /// Create an unhealthy status with a message
    pub fn unhealthy<S: Into<String>>(message: S) -> Self {
        Self {
            is_healthy: false,
            score: 0.0,
            message: Some(message.into()),
            components: Vec::new(),
            timestamp: std::time::SystemTime::now(),
        }
    }

    /// Create a degraded status with a score
    pub fn degraded<S: Into<String>>(score: f64, message: S) -> Self {
        Self {
            is_healthy: score > 0.5,
            score: score.clamp(0.0, 1.0),
            message: Some(message.into()),
            components: Vec::new(),
            timestamp: std::time::SystemTime::now(),
        }
    }

    /// Add a component health check
    pub fn with_component(mut self, component: ComponentHealth) -> Self {
        self.components.push(component);
        self
    }
}

/// Individual component health within a manager
#[derive(Debug, Clone)]
pub struct ComponentHealth {
    pub name: String,
    pub is_healthy: bool,
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy<S: Into<String>>(name: S) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    pub fn unhealthy<S: Into<String>, M: Into<String>>(name: S, message: M) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }
}

/// Manager metadata for monitoring
#[derive(Debug, Clone)]
pub struct ManagerMetadata {
    pub type_name: String,
    pub status: ManagerStatus,
    pub health: Option<ManagerHealth>,
}

/// Shared state container with async RwLock
///
/// This provides a standard pattern for managing shared state in managers
/// with helper methods for common operations.
#[derive(Debug)]
pub struct SharedState<T> {
    inner: Arc<RwLock<T>>,
    name: String,
}

impl<T> Clone for SharedState<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner), name: self.name.clone() }
    }
}

impl<T> SharedState<T> {
    /// Create a new shared state container
    pub fn new<S: Into<String>>(value: T, name: S) -> Self {
        Self { inner: Arc::new(RwLock::new(value)), name: name.into() }
    }

    /// Get a read lock on the state
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, T> {
        self.inner.read().await
    }

    /// Get a write lock on the state
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, T> {
        self.inner.write().await
    }

    /// Try to get a read lock without blocking
    pub fn try_read(
        &self,
    ) -> Result<tokio::sync::RwLockReadGuard<'_, T>, tokio::sync::TryLockError> {
        self.inner.try_read()
    }

    /// Try to get a write lock without blocking
    pub fn try_write(
        &self,
    ) -> Result<tokio::sync::RwLockWriteGuard<'_, T>, tokio::sync::TryLockError> {
        self.inner.try_write()
    }

    /// Get a read lock with timeout
    pub async fn read_timeout(
        &self,
        duration: Duration,
    ) -> CommonResult<tokio::sync::RwLockReadGuard<'_, T>> {
        timeout(duration, self.inner.read())
            .await
            .map_err(|_| CommonError::timeout(format!("read_lock_{}", self.name), duration))
    }

    /// Get a write lock with timeout
    pub async fn write_timeout(
        &self,
        duration: Duration,
    ) -> CommonResult<tokio::sync::RwLockWriteGuard<'_, T>> {
        timeout(duration, self.inner.write())
            .await
            .map_err(|_| CommonError::timeout(format!("write_lock_{}", self.name), duration))
    }

    /// Update the state using a closure
    pub async fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.write().await;
        f(&mut *guard)
    }

    /// Update the state with timeout
    pub async fn update_timeout<F, R>(&self, duration: Duration, f: F) -> CommonResult<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.write_timeout(duration).await?;
        Ok(f(&mut *guard))
    }

    /// Read the state using a closure
    pub async fn read_with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self.read().await;
        f(&*guard)
    }

    /// Read the state with timeout
    pub async fn read_with_timeout<F, R>(&self, duration: Duration, f: F) -> CommonResult<R>
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self.read_timeout(duration).await?;
        Ok(f(&*guard))
    }

    /// Replace the entire state
    pub async fn replace(&self, new_value: T) -> T {
        let mut guard = self.write().await;
        std::mem::replace(&mut *guard, new_value)
    }

    /// Get the state name for debugging
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: Clone> SharedState<T> {
    /// Get a clone of the current state
    pub async fn get(&self) -> T {
        self.read().await.clone()
    }

    /// Get a clone of the current state with timeout
    pub async fn get_timeout(&self, duration: Duration) -> CommonResult<T> {
        let guard = self.read_timeout(duration).await?;
        Ok(guard.clone())
    }
}

impl<T: Default> Default for SharedState<T> {
    fn default() -> Self {
        Self::new(T::default(), "default")
    }
}

/// Manager lifecycle controller
///
/// Helps manage the lifecycle of multiple managers with proper startup/shutdown
/// ordering.
pub struct ManagerController {
    managers: Vec<Box<dyn ManagerLifecycle>>,
    status: SharedState<ManagerStatus>,
}

/// Simplified lifecycle trait for the controller
#[async_trait::async_trait]
pub trait ManagerLifecycle: Send + Sync {
    async fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn name(&self) -> &str;
    fn status(&self) -> ManagerStatus;
}

impl ManagerController {
    /// Create a new manager controller
    pub fn new() -> Self {
        Self {
            managers: Vec::new(),
            status: SharedState::new(ManagerStatus::Created, "controller"),
        }
    }

    /// Add a manager to the controller
    pub fn add_manager<M: ManagerLifecycle + 'static>(&mut self, manager: M) {
        self.managers.push(Box::new(manager));
    }

    /// Initialize all managers in order
    pub async fn initialize_all(&mut self) -> CommonResult<()> {
        self.status.replace(ManagerStatus::Initializing).await;

        for (i, manager) in self.managers.iter_mut().enumerate() {
            tracing::info!("Initializing manager {}: {}", i, manager.name());

            if let Err(e) = manager.initialize().await {
                tracing::error!("Failed to initialize manager {}: {}", manager.name(), e);
                self.status.replace(ManagerStatus::Error).await;
                return Err(CommonError::internal_with_context(
                    e.to_string(),
                    format!("manager_init_{}", manager.name()),
                ));
            }
        }

        self.status.replace(ManagerStatus::Running).await;
        Ok(())
    }

    /// Shutdown all managers in reverse order
    pub async fn shutdown_all(&mut self) -> CommonResult<()> {
        self.status.replace(ManagerStatus::ShuttingDown).await;

        // Shutdown in reverse order
        for (i, manager) in self.managers.iter_mut().enumerate().rev() {
            tracing::info!("Shutting down manager {}: {}", i, manager.name());

            if let Err(e) = manager.shutdown().await {
                tracing::error!("Failed to shutdown manager {}: {}", manager.name(), e);
                // Continue shutting down other managers even if one fails
            }
        }

        self.status.replace(ManagerStatus::Shutdown).await;
        Ok(())
    }

    /// Get controller status
    pub async fn status(&self) -> ManagerStatus {
        self.status.get().await
    }

    /// Get status of all managers
    pub fn manager_statuses(&self) -> Vec<(String, ManagerStatus)> {
        self.managers.iter().map(|m| (m.name().to_string(), m.status())).collect()
    }
}

impl Default for ManagerController {
    fn default() -> Self {
        Self::new()
    }
}

/// Utility macros for common manager patterns
#[macro_export]
macro_rules! impl_manager_lifecycle {
    ($manager_type:ty, $error_type:ty) => {
        #[async_trait::async_trait]
        impl $crate::manager::ManagerLifecycle for $manager_type {
            async fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                <Self as $crate::manager::AsyncManager>::initialize(self)
                    .await
                    .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
            }

            async fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                <Self as $crate::manager::AsyncManager>::shutdown(self)
                    .await
                    .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
            }

            fn name(&self) -> &str {
                std::any::type_name::<Self>()
            }

            fn status(&self) -> $crate::manager::ManagerStatus {
                <Self as $crate::manager::AsyncManager>::status(self)
            }
        }
    };
}
