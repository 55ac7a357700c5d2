//! Task structure validation.
//!
//! Tier 1 (Critical): Always enforced
//!
//! Validates:
//! - Task names are present and unique within the job
//! - Replica counts are non-negative
//! - minAvailable is non-negative and achievable by the declared replicas

use std::collections::HashSet;

use super::{ValidationContext, ValidationResult};

/// Validate the job's task layout
pub fn validate(ctx: &ValidationContext<'_>) -> ValidationResult {
    let spec = &ctx.resource.spec;

    if spec.min_available < 0 {
        return ValidationResult::denied(
            "InvalidMinAvailable",
            "spec.minAvailable cannot be negative",
        );
    }

    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut total_replicas: i64 = 0;

    for (i, task) in spec.tasks.iter().enumerate() {
        if task.name.is_empty() {
            return ValidationResult::denied(
                "InvalidTaskName",
                &format!("spec.tasks[{}].name is required", i),
            );
        }
        if !seen_names.insert(task.name.as_str()) {
            return ValidationResult::denied(
                "DuplicateTaskName",
                &format!("duplicated task name: {}", task.name),
            );
        }
        if task.replicas < 0 {
            return ValidationResult::denied(
                "InvalidReplicas",
                &format!("spec.tasks[{}].replicas cannot be negative", i),
            );
        }
        total_replicas += i64::from(task.replicas);
    }

    // A job may omit tasks entirely (policies and volumes are still
    // validated); the replica bound only applies to a declared layout.
    if !spec.tasks.is_empty() && i64::from(spec.min_available) > total_replicas {
        return ValidationResult::denied(
            "InvalidMinAvailable",
            &format!(
                "spec.minAvailable ({}) exceeds the total declared replicas ({})",
                spec.min_available, total_replicas
            ),
        );
    }

    ValidationResult::allowed()
}
