//! Immutability validation policy.
//!
//! Tier 2 (Update): Only enforced on UPDATE operations
//!
//! Validates:
//! - The queue a job was submitted to cannot change
//! - The set of task names cannot change (tasks cannot be added, removed,
//!   or renamed after creation)

use std::collections::BTreeSet;

use super::{ValidationContext, ValidationResult};

/// Validate immutability constraints on UPDATE operations
pub fn validate(ctx: &ValidationContext<'_>) -> ValidationResult {
    let old = match ctx.old_resource {
        Some(r) => r,
        None => return ValidationResult::allowed(), // Not an UPDATE
    };

    let new = ctx.resource;

    if old.spec.queue != new.spec.queue {
        return ValidationResult::denied(
            "ImmutableQueue",
            &format!(
                "spec.queue is immutable (was '{}', got '{}')",
                old.spec.queue, new.spec.queue
            ),
        );
    }

    let old_tasks: BTreeSet<&str> = old.spec.tasks.iter().map(|t| t.name.as_str()).collect();
    let new_tasks: BTreeSet<&str> = new.spec.tasks.iter().map(|t| t.name.as_str()).collect();
    if old_tasks != new_tasks {
        return ValidationResult::denied(
            "ImmutableTasks",
            "tasks cannot be added, removed, or renamed after creation",
        );
    }

    ValidationResult::allowed()
}
