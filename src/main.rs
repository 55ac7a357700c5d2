//! batchjob-operator - Admission webhook for BatchJob custom resources.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Starts the health server for probes and metrics
//! - Starts the TLS webhook server that validates BatchJob submissions

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info};

use batchjob_operator::health::{HealthState, run_health_server};
use batchjob_operator::{WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, run_webhook_server};

/// Grace period for in-flight admission reviews to complete during shutdown
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("batchjob_operator=info".parse()?)
                .add_directive("axum=info".parse()?),
        )
        .json()
        .init();

    info!("Starting batchjob-operator admission webhook");

    // Certificate paths can be overridden for local development
    let cert_path =
        std::env::var("WEBHOOK_CERT_FILE").unwrap_or_else(|_| WEBHOOK_CERT_PATH.to_string());
    let key_path =
        std::env::var("WEBHOOK_KEY_FILE").unwrap_or_else(|_| WEBHOOK_KEY_PATH.to_string());

    if !Path::new(&cert_path).exists() || !Path::new(&key_path).exists() {
        error!(
            cert_path = %cert_path,
            key_path = %key_path,
            "TLS certificate or key not found; mount the webhook certificate secret"
        );
        return Err("missing webhook TLS certificates".into());
    }

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    // Start health server immediately (probes should work before TLS is up)
    let health_handle = {
        let health_state = health_state.clone();
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state).await {
                error!("Health server error: {}", e);
            }
        })
    };

    // Start the webhook server; every replica serves, no leader election
    let webhook_handle = {
        let health_state = health_state.clone();
        tokio::spawn(async move {
            health_state.set_ready(true).await;
            if let Err(e) = run_webhook_server(health_state, &cert_path, &key_path).await {
                error!("Webhook server error: {}", e);
            }
        })
    };

    // Wait for shutdown signal
    signal::ctrl_c().await?;
    info!("Received shutdown signal");

    // Fail readiness so the API server stops routing reviews here, then give
    // in-flight requests a moment to drain
    health_state.set_ready(false).await;
    tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;

    webhook_handle.abort();
    health_handle.abort();

    info!("Shutdown complete");
    Ok(())
}
