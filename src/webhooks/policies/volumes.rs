//! Volume mount validation.
//!
//! Tier 1 (Critical): Always enforced
//!
//! Validates the job's volume declarations:
//! - Mount path is present and unique across the list
//! - Exactly one of volumeClaim (inline template) or volumeClaimName
//!   (existing PVC reference) is set
//! - A claim-name reference is a valid DNS-1123 subdomain
//!
//! Unlike lifecycle validation, this stops at the first violation and
//! returns it as a single error.

use std::collections::HashSet;
use std::sync::LazyLock;

use thiserror::Error;

use crate::crd::VolumeSpec;

/// Maximum length of a PersistentVolumeClaim name (DNS-1123 subdomain).
const MAX_CLAIM_NAME_LEN: usize = 253;

/// A volume declaration violation.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum VolumeError {
    #[error("mountPath is required")]
    MountPathRequired,

    #[error("duplicated mountPath: {0}")]
    DuplicateMountPath(String),

    #[error("either volumeClaim or volumeClaimName must be specified")]
    MissingClaim,

    #[error(
        "volumeClaim and volumeClaimName are mutually exclusive: \
         reference an existing PVC with volumeClaimName, or create a new one \
         with volumeClaim, not both"
    )]
    ConflictingClaim,

    #[error("invalid volumeClaimName '{name}': {reason}")]
    InvalidClaimName { name: String, reason: String },
}

/// Validate a list of volume declarations, returning the first violation.
pub fn validate(volumes: &[VolumeSpec]) -> Result<(), VolumeError> {
    let mut seen_paths: HashSet<&str> = HashSet::new();

    for volume in volumes {
        if volume.mount_path.is_empty() {
            return Err(VolumeError::MountPathRequired);
        }
        if seen_paths.contains(volume.mount_path.as_str()) {
            return Err(VolumeError::DuplicateMountPath(volume.mount_path.clone()));
        }
        if volume.volume_claim.is_none() && volume.volume_claim_name.is_none() {
            return Err(VolumeError::MissingClaim);
        }
        if let Some(name) = &volume.volume_claim_name {
            if volume.volume_claim.is_some() {
                return Err(VolumeError::ConflictingClaim);
            }
            if let Some(reason) = claim_name_error(name) {
                return Err(VolumeError::InvalidClaimName {
                    name: name.clone(),
                    reason,
                });
            }
        }

        seen_paths.insert(volume.mount_path.as_str());
    }

    Ok(())
}

/// Check a PVC name against DNS-1123 subdomain rules, returning a
/// description of the first problem found.
fn claim_name_error(name: &str) -> Option<String> {
    // Pattern: ^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$
    static SUBDOMAIN_RE: LazyLock<Option<regex::Regex>> = LazyLock::new(|| {
        regex::Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
            .ok()
    });

    if name.is_empty() {
        return Some("must not be empty".to_string());
    }
    if name.len() > MAX_CLAIM_NAME_LEN {
        return Some(format!(
            "must be no more than {} characters",
            MAX_CLAIM_NAME_LEN
        ));
    }
    if !SUBDOMAIN_RE.as_ref().is_some_and(|re| re.is_match(name)) {
        return Some(
            "must be a lowercase RFC 1123 subdomain consisting of alphanumeric \
             characters, '-' or '.', starting and ending with an alphanumeric \
             character"
                .to_string(),
        );
    }
    None
}
