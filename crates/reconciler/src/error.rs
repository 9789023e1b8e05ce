//! Reconciliation errors.

use netbox_client::{NetBoxError, ObjectKind};
use thiserror::Error;

/// A single problem found while reconciling one object.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A required attribute is unknown or null at write time
    #[error("attribute {attribute} is required but not set")]
    MissingRequired { attribute: String },

    /// An attribute has a value NetBox would reject
    #[error("attribute {attribute} is invalid: {reason}")]
    Invalid { attribute: String, reason: String },

    /// Update addressed an object that no longer exists in NetBox
    #[error("{kind} {id} no longer exists in NetBox")]
    ResourceGone { kind: ObjectKind, id: u64 },

    /// A lookup matched nothing
    #[error("no {kind} found matching {filter}: no result")]
    NoResult { kind: ObjectKind, filter: String },

    /// A lookup that must be unique matched several objects
    #[error("{count} {kind} objects match {filter}; specify a more narrow filter")]
    Ambiguous {
        kind: ObjectKind,
        filter: String,
        count: usize,
    },

    /// Transport or API failure reported by the gateway
    #[error("NetBox error: {0}")]
    Gateway(#[from] NetBoxError),

    /// NetBox answered with a payload that does not match the expected shape
    #[error("failed to decode {kind} from NetBox: {reason}")]
    Decode { kind: ObjectKind, reason: String },

    /// Create succeeded in NetBox but its answer could not be decoded
    #[error("{kind} {id} was created but NetBox's answer could not be decoded")]
    CreatedUndecoded { kind: ObjectKind, id: u64 },

    /// The caller cancelled the operation before NetBox answered
    #[error("operation cancelled")]
    Cancelled,
}

impl ReconcileError {
    /// Safe to retry the whole operation unchanged
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Gateway(e) => match e {
                NetBoxError::Http(_) => true,
                NetBoxError::Api { status, .. } => *status >= 500 || *status == 429,
                _ => false,
            },
            _ => false,
        }
    }

    pub(crate) fn missing(attribute: &str) -> Self {
        Self::MissingRequired {
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn invalid(attribute: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }
}
