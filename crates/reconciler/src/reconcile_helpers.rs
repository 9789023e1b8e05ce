//! Helper functions for common reconciliation patterns
//!
//! Every gateway call goes through [`cancellable`]. The three 404 policies
//! (read, update, delete) live here so each resource kind applies them the
//! same way.

use crate::error::ReconcileError;
use netbox_client::{NetBoxError, ObjectKind};
use serde_json::Value;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Await a gateway call unless the token is cancelled first
pub async fn cancellable<T, F>(cancel: &CancellationToken, call: F) -> Result<T, ReconcileError>
where
    F: Future<Output = Result<T, NetBoxError>> + Send,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReconcileError::Cancelled),
        result = call => result.map_err(ReconcileError::from),
    }
}

fn is_not_found(err: &ReconcileError) -> bool {
    matches!(err, ReconcileError::Gateway(e) if e.is_not_found())
}

/// Simple drift detection for Read.
///
/// Returns:
/// - `Ok(Some(object))` if the object exists
/// - `Ok(None)` if it was deleted in NetBox (drift detected)
/// - `Err(e)` for anything else (auth, network), which should be retried
pub async fn check_existing<F>(
    cancel: &CancellationToken,
    kind: ObjectKind,
    netbox_id: u64,
    get_fn: F,
) -> Result<Option<Value>, ReconcileError>
where
    F: Future<Output = Result<Value, NetBoxError>> + Send,
{
    match cancellable(cancel, get_fn).await {
        Ok(existing) => {
            debug!("{} (ID: {}) exists in NetBox", kind, netbox_id);
            Ok(Some(existing))
        }
        Err(e) if is_not_found(&e) => {
            warn!("{} (ID: {}) was deleted in NetBox (drift detected), will recreate", kind, netbox_id);
            Ok(None)
        }
        Err(e) => {
            error!("Failed to verify {} (ID: {}) exists: {}, will retry", kind, netbox_id, e);
            Err(e)
        }
    }
}

/// Update of an object that must still exist; 404 is terminal
pub async fn update_existing<F>(
    cancel: &CancellationToken,
    kind: ObjectKind,
    netbox_id: u64,
    update_fn: F,
) -> Result<Value, ReconcileError>
where
    F: Future<Output = Result<Value, NetBoxError>> + Send,
{
    match cancellable(cancel, update_fn).await {
        Ok(updated) => Ok(updated),
        Err(e) if is_not_found(&e) => {
            error!("{} (ID: {}) no longer exists in NetBox, cannot update", kind, netbox_id);
            Err(ReconcileError::ResourceGone { kind, id: netbox_id })
        }
        Err(e) => Err(e),
    }
}

/// Delete that treats an already-missing object as deleted
pub async fn delete_idempotent<F>(
    cancel: &CancellationToken,
    kind: ObjectKind,
    netbox_id: u64,
    delete_fn: F,
) -> Result<(), ReconcileError>
where
    F: Future<Output = Result<(), NetBoxError>> + Send,
{
    match cancellable(cancel, delete_fn).await {
        Ok(()) => Ok(()),
        Err(e) if is_not_found(&e) => {
            debug!("{} (ID: {}) already absent from NetBox", kind, netbox_id);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "reconcile_helpers_test.rs"]
mod reconcile_helpers_test;
