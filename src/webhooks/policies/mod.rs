//! Validation policies for BatchJob admission webhooks.
//!
//! Policies are organized into tiers:
//! - Tier 1 (Critical): Always enforced (task layout, lifecycle policies,
//!   volumes)
//! - Tier 2 (Update): Only enforced on UPDATE operations (immutability)

pub mod immutability;
pub mod lifecycle;
pub mod tasks;
pub mod volumes;

use crate::crd::BatchJob;

/// Result of a validation check
#[derive(Debug)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub allowed: bool,
    /// Reason for denial (if not allowed)
    pub reason: Option<String>,
    /// Detailed message (if not allowed)
    pub message: Option<String>,
}

impl ValidationResult {
    /// Create an allowed result
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            message: None,
        }
    }

    /// Create a denied result
    pub fn denied(reason: &str, message: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
            message: Some(message.to_string()),
        }
    }
}

/// Context for validation
pub struct ValidationContext<'a> {
    /// The resource being validated
    pub resource: &'a BatchJob,
    /// The old resource (for UPDATE operations)
    pub old_resource: Option<&'a BatchJob>,
    /// Whether this is a dry-run request
    pub dry_run: bool,
    /// The namespace of the resource
    pub namespace: Option<&'a str>,
}

impl<'a> ValidationContext<'a> {
    /// Check if this is an UPDATE operation
    pub fn is_update(&self) -> bool {
        self.old_resource.is_some()
    }
}

/// Run all validation policies
pub fn validate_all(ctx: &ValidationContext<'_>) -> ValidationResult {
    // Tier 1: Critical validations (always enforced)
    let result = tasks::validate(ctx);
    if !result.allowed {
        return result;
    }

    let spec = &ctx.resource.spec;

    if let Err(e) = lifecycle::validate(&spec.policies, "spec.policies") {
        return ValidationResult::denied("InvalidPolicies", &e.to_string());
    }
    for (i, task) in spec.tasks.iter().enumerate() {
        let path = format!("spec.tasks[{}].policies", i);
        if let Err(e) = lifecycle::validate(&task.policies, &path) {
            return ValidationResult::denied("InvalidPolicies", &e.to_string());
        }
    }

    if let Err(e) = volumes::validate(&spec.volumes) {
        return ValidationResult::denied("InvalidVolumes", &e.to_string());
    }

    // Tier 2: Update validations (only for UPDATE operations)
    if ctx.is_update() {
        let result = immutability::validate(ctx);
        if !result.allowed {
            return result;
        }
    }

    ValidationResult::allowed()
}
