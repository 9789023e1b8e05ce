//! NetBox Controller
//!
//! Declarative controller that keeps NetBox in line with a manifest:
//! - tags, cluster types, regions and webhooks are created, updated and deleted
//! - objects deleted in NetBox behind the controller's back are recreated
//! - state is persisted locally between passes
//!
//! Configuration comes from environment variables (see [`config::Config`]).

mod backoff;
mod config;
mod controller;
mod driver;
mod error;
mod manifest;
mod state;

use crate::config::Config;
use controller::Controller;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting NetBox Controller");

    let config = Config::from_env()?;
    info!("Configuration:");
    info!("  NetBox URL: {}", config.netbox_url);
    info!("  Manifest: {}", config.manifest_path.display());
    info!("  State file: {}", config.state_path.display());
    info!(
        "  Mode: {}",
        if config.oneshot {
            "one-shot".to_string()
        } else {
            format!("every {}s", config.interval.as_secs())
        }
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Received Ctrl-C, cancelling in-flight operations");
                cancel.cancel();
            }
        });
    }

    // Initialize and run controller
    let controller = Controller::new(config).await?;
    controller.run(cancel).await?;

    Ok(())
}
