//! Controller-specific error types.
//!
//! This module defines error types specific to the declarative NetBox
//! controller that are not covered by the gateway and reconciler errors.

use netbox_client::{NetBoxError, ObjectKind};
use netbox_reconciler::Diagnostics;
use netbox_reconciler::lifecycle::TransitionError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the NetBox Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// NetBox API error
    #[error("NetBox error: {0}")]
    NetBox(#[from] NetBoxError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Manifest could not be parsed
    #[error("Invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// State file could not be parsed or encoded
    #[error("Invalid state file {path}: {source}")]
    State {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Reading or writing a local file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reconciliation of one object failed
    #[error("Reconciliation of {kind} {address} failed: {diagnostics}")]
    Reconciliation {
        kind: ObjectKind,
        address: String,
        diagnostics: Diagnostics,
    },

    /// Lifecycle state machine rejected an operation
    #[error("Invalid lifecycle transition: {0}")]
    Transition(#[from] TransitionError),

    /// A one-shot pass finished with failures
    #[error("Reconciliation pass finished with {0} failure(s)")]
    PassFailed(usize),
}

impl ControllerError {
    /// Transient failures are retried on the next pass with backoff
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Reconciliation { diagnostics, .. } => diagnostics.is_retryable(),
            Self::NetBox(NetBoxError::Http(_)) => true,
            _ => false,
        }
    }
}
