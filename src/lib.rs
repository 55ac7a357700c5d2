//! batchjob-operator library crate
//!
//! This module exports the CRD definitions, the admission webhook server,
//! and the health/metrics server.

pub mod crd;
pub mod health;
pub mod webhooks;

pub use health::HealthState;
pub use webhooks::{
    WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookError, run_webhook_server,
};
