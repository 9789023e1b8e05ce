//! Controller configuration from environment variables

use crate::error::ControllerError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// NetBox URL used when `NETBOX_URL` is unset
pub const DEFAULT_NETBOX_URL: &str = "http://netbox.netbox:80";

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NetBox base URL
    pub netbox_url: String,
    /// API token
    pub netbox_token: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// YAML manifest to apply
    pub manifest_path: PathBuf,
    /// JSON state file
    pub state_path: PathBuf,
    /// Wait between passes in continuous mode
    pub interval: Duration,
    /// Objects of one kind reconciled at the same time
    pub max_concurrent: usize,
    /// Run one pass and exit
    pub oneshot: bool,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let netbox_url = lookup("NETBOX_URL").unwrap_or_else(|| DEFAULT_NETBOX_URL.to_string());
        let netbox_token = lookup("NETBOX_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                ControllerError::InvalidConfig("NETBOX_TOKEN environment variable is required".to_string())
            })?;

        let timeout_secs: u64 = parse_var(&lookup, "NETBOX_TIMEOUT_SECS", 10)?;
        let interval_secs: u64 = parse_var(&lookup, "RECONCILE_INTERVAL_SECS", 300)?;
        let max_concurrent: usize = parse_var(&lookup, "MAX_CONCURRENT", 4)?;
        if timeout_secs == 0 || interval_secs == 0 || max_concurrent == 0 {
            return Err(ControllerError::InvalidConfig(
                "NETBOX_TIMEOUT_SECS, RECONCILE_INTERVAL_SECS and MAX_CONCURRENT must be positive".to_string(),
            ));
        }

        Ok(Self {
            netbox_url,
            netbox_token,
            timeout: Duration::from_secs(timeout_secs),
            manifest_path: lookup("MANIFEST_PATH").unwrap_or_else(|| "netbox.yaml".to_string()).into(),
            state_path: lookup("STATE_PATH").unwrap_or_else(|| "netbox-state.json".to_string()).into(),
            interval: Duration::from_secs(interval_secs),
            max_concurrent,
            oneshot: parse_var(&lookup, "ONESHOT", false)?,
        })
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ControllerError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            ControllerError::InvalidConfig(format!("{} has invalid value {:?}", key, raw))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ControllerError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("NETBOX_TOKEN", "secret")]).unwrap();
        assert_eq!(config.netbox_url, DEFAULT_NETBOX_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.manifest_path, PathBuf::from("netbox.yaml"));
        assert_eq!(config.state_path, PathBuf::from("netbox-state.json"));
        assert_eq!(config.interval, Duration::from_secs(300));
        assert_eq!(config.max_concurrent, 4);
        assert!(!config.oneshot);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("NETBOX_TOKEN", "secret"),
            ("NETBOX_URL", "https://netbox.example.net"),
            ("MAX_CONCURRENT", "16"),
            ("ONESHOT", "true"),
        ])
        .unwrap();
        assert_eq!(config.netbox_url, "https://netbox.example.net");
        assert_eq!(config.max_concurrent, 16);
        assert!(config.oneshot);
    }

    #[test]
    fn test_token_is_required() {
        assert!(matches!(config(&[]), Err(ControllerError::InvalidConfig(_))));
        assert!(matches!(config(&[("NETBOX_TOKEN", " ")]), Err(ControllerError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = config(&[("NETBOX_TOKEN", "secret"), ("MAX_CONCURRENT", "many")]).unwrap_err();
        assert!(err.to_string().contains("MAX_CONCURRENT"));
        assert!(config(&[("NETBOX_TOKEN", "secret"), ("RECONCILE_INTERVAL_SECS", "0")]).is_err());
    }
}
