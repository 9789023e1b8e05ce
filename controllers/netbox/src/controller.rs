//! Main controller implementation.
//!
//! This module contains the `Controller` struct that loads the manifest and
//! state file, runs reconciliation passes, and waits between them.

use crate::backoff::FibonacciBackoff;
use crate::config::Config;
use crate::driver::{Driver, PassReport};
use crate::error::ControllerError;
use crate::manifest::Manifest;
use crate::state::StateFile;
use netbox_client::{ClientConfig, NetBoxClient, NetBoxGateway};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Retry delay bounds after a failing pass, in seconds
const BACKOFF_MIN_SECS: u64 = 30;
const BACKOFF_MAX_SECS: u64 = 600;

/// Main controller for declarative NetBox management.
#[derive(Debug)]
pub struct Controller {
    config: Config,
    driver: Driver,
}

impl Controller {
    /// Creates a controller connected to NetBox and validates the token.
    pub async fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Initializing NetBox Controller");

        let netbox_client = NetBoxClient::with_config(
            ClientConfig::new(config.netbox_url.clone(), config.netbox_token.clone()).with_timeout(config.timeout),
        )?;

        // Validate token and connectivity before proceeding
        info!("Validating NetBox token and connectivity...");
        netbox_client.validate_token().await.map_err(|e| {
            error!("Failed to validate NetBox token: {}", e);
            error!("Please ensure:");
            error!("  1. NETBOX_TOKEN environment variable is set correctly");
            error!("  2. The token is valid in NetBox");
            error!("  3. NetBox is reachable at {}", config.netbox_url);
            ControllerError::NetBox(e)
        })?;
        info!("NetBox token validated and connectivity established");

        Ok(Self::with_gateway(config, Arc::new(netbox_client)))
    }

    /// Creates a controller over an existing gateway
    pub fn with_gateway(config: Config, gateway: Arc<dyn NetBoxGateway>) -> Self {
        let driver = Driver::new(gateway, config.max_concurrent);
        Self { config, driver }
    }

    /// Load the manifest and state, run one pass, and save the state
    pub async fn run_once(&self, state: &mut StateFile, cancel: &CancellationToken) -> Result<PassReport, ControllerError> {
        let manifest = Manifest::load(&self.config.manifest_path).await?;
        let report = self.driver.run_pass(&manifest, state, cancel).await;
        state.save(&self.config.state_path).await?;
        Ok(report)
    }

    /// Run passes until cancelled (or once in one-shot mode)
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), ControllerError> {
        let mut state = StateFile::load(&self.config.state_path).await?;
        info!("Loaded {} tracked object(s) from {}", state.len(), self.config.state_path.display());

        let mut backoff = FibonacciBackoff::new(BACKOFF_MIN_SECS, BACKOFF_MAX_SECS);
        loop {
            let wait = match self.run_once(&mut state, &cancel).await {
                Ok(report) if report.is_success() => {
                    backoff.reset();
                    if self.config.oneshot {
                        return Ok(());
                    }
                    self.config.interval
                }
                Ok(report) => {
                    if self.config.oneshot {
                        return Err(ControllerError::PassFailed(report.failures.len()));
                    }
                    let wait = self.retry_wait(&mut backoff);
                    warn!(
                        "{} object(s) failed to reconcile ({}), retrying in {}s",
                        report.failures.len(),
                        if report.is_retryable() { "transient" } else { "needs attention" },
                        wait.as_secs()
                    );
                    wait
                }
                Err(e) => {
                    if self.config.oneshot {
                        return Err(e);
                    }
                    let wait = self.retry_wait(&mut backoff);
                    error!("Reconciliation pass failed: {}, retrying in {}s", e, wait.as_secs());
                    wait
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutdown requested, stopping controller");
                    return Ok(());
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Backoff never waits longer than the regular interval
    fn retry_wait(&self, backoff: &mut FibonacciBackoff) -> Duration {
        std::cmp::min(backoff.next_backoff(), self.config.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netbox_client::{MockNetBoxClient, ObjectKind};

    fn config(dir: &std::path::Path, oneshot: bool) -> Config {
        Config {
            netbox_url: "http://test-netbox".to_string(),
            netbox_token: "token".to_string(),
            timeout: Duration::from_secs(1),
            manifest_path: dir.join("netbox.yaml"),
            state_path: dir.join("state.json"),
            interval: Duration::from_secs(300),
            max_concurrent: 2,
            oneshot,
        }
    }

    #[tokio::test]
    async fn test_oneshot_applies_manifest_and_saves_state() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("netbox.yaml"), "tags:\n  net:\n    name: net\n")
            .await
            .unwrap();
        let mock = MockNetBoxClient::new("http://test-netbox");
        let controller = Controller::with_gateway(config(dir.path(), true), Arc::new(mock.clone()));

        controller.run(CancellationToken::new()).await.unwrap();

        assert_eq!(mock.count(ObjectKind::Tag), 1);
        let state = StateFile::load(&dir.path().join("state.json")).await.unwrap();
        assert!(state.tags.contains_key("net"));
    }

    #[tokio::test]
    async fn test_oneshot_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("netbox.yaml"), "regions:\n  core:\n    name: core\n    tags: [missing]\n")
            .await
            .unwrap();
        let mock = MockNetBoxClient::new("http://test-netbox");
        let controller = Controller::with_gateway(config(dir.path(), true), Arc::new(mock.clone()));

        let err = controller.run(CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, ControllerError::PassFailed(1)));
        assert_eq!(mock.count(ObjectKind::Region), 0);
    }

    #[tokio::test]
    async fn test_missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let controller = Controller::with_gateway(
            config(dir.path(), true),
            Arc::new(MockNetBoxClient::new("http://test-netbox")),
        );

        let err = controller.run(CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, ControllerError::Io { .. }));
    }

    #[tokio::test]
    async fn test_continuous_mode_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("netbox.yaml"), "{}").await.unwrap();
        let controller = Controller::with_gateway(
            config(dir.path(), false),
            Arc::new(MockNetBoxClient::new("http://test-netbox")),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        controller.run(cancel).await.unwrap();

        assert!(dir.path().join("state.json").exists());
    }
}
