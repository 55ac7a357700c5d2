//! Lifecycle policy validation.
//!
//! Tier 1 (Critical): Always enforced
//!
//! Validates a list of lifecycle policies (job-level or task-level):
//! - Exactly one of event(s) or exitCode is set per policy
//! - Events and actions are externally permitted values
//! - No event or exitCode is claimed by two policies
//! - The wildcard event does not co-exist with other event rules
//!
//! Violations are collected into [`PolicyErrors`], which holds every
//! recorded [`PolicyViolation`]. Most checks stop the scan at the first
//! violation, so a single call usually records one entry, plus possibly the
//! wildcard check which always runs after the scan.

use std::collections::HashSet;

use thiserror::Error;

use crate::crd::{Action, Event, LifecyclePolicy};

/// A single lifecycle-policy violation.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("must not specify event and exitCode simultaneously")]
    EventAndExitCode,

    #[error("either event and exitCode should be specified")]
    NeitherEventNorExitCode,

    #[error("{path}: invalid policy event: {event}")]
    InvalidEvent { path: String, event: Event },

    #[error("{path}: invalid policy action: {action}")]
    InvalidAction { path: String, action: Action },

    #[error("duplicate event {event} across different policy")]
    DuplicateEvent { event: Event },

    #[error("0 is not a valid error code")]
    ZeroExitCode,

    #[error("duplicate exitCode {code}")]
    DuplicateExitCode { code: i32 },

    #[error("if there's a wildcard, no other policy should be present")]
    WildcardWithOthers,
}

/// All violations recorded while validating one policy list.
///
/// Permanent rejection of the submitted spec; never retryable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyErrors {
    violations: Vec<PolicyViolation>,
}

impl PolicyErrors {
    /// The individual violations, in the order they were recorded.
    pub fn violations(&self) -> &[PolicyViolation] {
        &self.violations
    }
}

impl std::fmt::Display for PolicyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for violation in &self.violations {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for PolicyErrors {}

/// Validate a list of lifecycle policies.
///
/// `field_path` locates the list within the job spec (e.g. `spec.policies`
/// or `spec.tasks[0].policies`) and is used only to annotate invalid
/// event/action violations.
///
/// The scan stops at the first violation, matching the admission behavior
/// users see: one actionable error per request. The wildcard cross-check
/// runs after the scan regardless, against whatever events were recorded up
/// to that point.
pub fn validate(policies: &[LifecyclePolicy], field_path: &str) -> Result<(), PolicyErrors> {
    let mut violations = Vec::new();
    let mut seen_events: HashSet<Event> = HashSet::new();
    let mut seen_exit_codes: HashSet<i32> = HashSet::new();

    for policy in policies {
        let has_event = policy.event.is_some() || !policy.events.is_empty();

        if has_event && policy.exit_code.is_some() {
            violations.push(PolicyViolation::EventAndExitCode);
            break;
        }

        if !has_event && policy.exit_code.is_none() {
            violations.push(PolicyViolation::NeitherEventNorExitCode);
            break;
        }

        if has_event {
            let mut failed = false;
            for event in event_list(policy) {
                if !event.allowed_in_spec() {
                    violations.push(PolicyViolation::InvalidEvent {
                        path: field_path.to_string(),
                        event,
                    });
                    failed = true;
                    break;
                }

                if !policy.action.allowed_in_spec() {
                    violations.push(PolicyViolation::InvalidAction {
                        path: field_path.to_string(),
                        action: policy.action,
                    });
                    failed = true;
                    break;
                }

                if !seen_events.insert(event) {
                    violations.push(PolicyViolation::DuplicateEvent { event });
                    failed = true;
                    break;
                }
            }
            if failed {
                break;
            }
        } else if let Some(code) = policy.exit_code {
            if code == 0 {
                violations.push(PolicyViolation::ZeroExitCode);
                break;
            }
            if !seen_exit_codes.insert(code) {
                violations.push(PolicyViolation::DuplicateExitCode { code });
                break;
            }
        }
    }

    // The wildcard check inspects only the recorded events, so it also fires
    // when the scan above stopped early.
    if seen_events.contains(&Event::Any) && seen_events.len() > 1 {
        violations.push(PolicyViolation::WildcardWithOthers);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(PolicyErrors { violations })
    }
}

/// Merge a policy's single-event and event-list fields into one unique
/// ordered list: list entries first, then the single entry, first occurrence
/// wins.
pub fn event_list(policy: &LifecyclePolicy) -> Vec<Event> {
    let mut seen = HashSet::new();
    let mut list = Vec::new();
    for event in policy.events.iter().copied().chain(policy.event) {
        if seen.insert(event) {
            list.push(event);
        }
    }
    list
}

/// Events accepted in user-submitted policies, in declaration order.
pub fn valid_events() -> Vec<Event> {
    Event::ALL
        .into_iter()
        .filter(|e| e.allowed_in_spec())
        .collect()
}

/// Actions accepted in user-submitted policies, in declaration order.
pub fn valid_actions() -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|a| a.allowed_in_spec())
        .collect()
}
