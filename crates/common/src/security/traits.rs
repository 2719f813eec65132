//! Trait abstractions for security components
//!
//! This module defines traits for Role-Based Access Control (RBAC)
//! and other security primitives, allowing components to use security
//! features without depending on specific implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// RBAC Traits
// ============================================================================

/// Generic user context for authorization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub roles: Vec<String>,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub attributes: HashMap<String, String>,
}

/// Generic permission definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub resource: String,
    pub action: String,
    pub description: String,
    pub requires_approval: bool,
}

/// Trait for Role-Based Access Control implementations
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Check if a user has permission to perform an action
    async fn check_permission(&self, user: &UserContext, permission: &Permission) -> bool;

    /// Check if a user has a specific role
    async fn has_role(&self, user: &UserContext, role: &str) -> bool {
        user.roles.iter().any(|r| r == role)
    }

    /// Get all permissions for a user
    async fn get_user_permissions(&self, user: &UserContext) -> Vec<Permission>;

    /// Check multiple permissions at once
    async fn check_permissions(
        &self,
        user: &UserContext,
        permissions: &[Permission],
    ) -> HashMap<String, bool> {
        let mut results = HashMap::new();
        for permission in permissions {
            let granted = self.check_permission(user, permission).await;
            results.insert(permission.id.clone(), granted);
        }
        results
    }
}

// ============================================================================
// Validation Traits
// ============================================================================

/// Generic validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: Option<String>,
}

/// Generic validation result
pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

/// Trait for validation implementations
pub trait Validator: Send + Sync {
    /// Validate a value and return errors if invalid
    fn validate<T>(&self, value: &T, field: &str) -> ValidationResult<()>
    where
        T: ?Sized;

    /// Check if a value is valid without returning errors
    fn is_valid<T>(&self, value: &T) -> bool
    where
        T: ?Sized,
    {
        self.validate(value, "value").is_ok()
    }
}

// ============================================================================
// No-Op Implementations
// ============================================================================

/// No-op access control that allows everything (for testing)
#[derive(Debug, Clone)]
pub struct NoOpAccessControl;

#[async_trait]
impl AccessControl for NoOpAccessControl {
    async fn check_permission(&self, _user: &UserContext, _permission: &Permission) -> bool {
        true // Allow everything
    }

    async fn get_user_permissions(&self, _user: &UserContext) -> Vec<Permission> {
        vec![]
    }
}

/// No-op validator that accepts everything (for testing)
#[derive(Debug, Clone)]
pub struct NoOpValidator;

impl Validator for NoOpValidator {
    fn validate<T>(&self, _value: &T, _field: &str) -> ValidationResult<()>
    where
        T: ?Sized,
    {
        Ok(())
    }
}

// ============================================================================
// Strict Implementations (for testing edge cases)
// ============================================================================

/// Strict access control that denies everything (for testing)
#[derive(Debug, Clone)]
pub struct DenyAllAccessControl;

#[async_trait]
impl AccessControl for DenyAllAccessControl {
    async fn check_permission(&self, _user: &UserContext, _permission: &Permission) -> bool {
        false // Deny everything
    }

    async fn get_user_permissions(&self, _user: &UserContext) -> Vec<Permission> {
        vec![]
    }
}

// ============================================================================
// Helper Builders
// ============================================================================

impl UserContext {
    /// Create a new user context
    pub fn new(user_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles,
            session_id: None,
            ip_address: None,
            user_agent: None,
            attributes: HashMap::new(),
        }
    }

    /// Create an admin user context
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, vec!["admin".to_string()])
    }

    /// Create a guest user context
    pub fn guest() -> Self {
        Self::new("guest", vec!["guest".to_string()])
    }

    /// Add a role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Set session ID
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set IP address
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Add attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl Permission {
    /// Create a new permission
    pub fn new(
        id: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        let id_str = id.into();
        Self {
            id: id_str.clone(),
            resource: resource.into(),
            action: action.into(),
            description: format!("Permission: {}", id_str),
            requires_approval: false,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Require approval
    pub fn requires_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into(), code: None }
    }

    /// Set error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}
