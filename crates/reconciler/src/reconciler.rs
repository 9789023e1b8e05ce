//! Generic CRUD lifecycle over one resource kind
//!
//! Every operation works on borrowed inputs and returns a fresh state, so a
//! failed or cancelled operation never leaves a half-merged object behind.

use crate::codec::{decode_remote, payload_covers};
use crate::diagnostics::Diagnostics;
use crate::error::ReconcileError;
use crate::kind::{ResourceKind, WriteMode};
use crate::reconcile_helpers::{cancellable, check_existing, delete_idempotent, update_existing};
use crate::resolve::{resolve_references, Resolved};
use async_trait::async_trait;
use netbox_client::NetBoxGateway;
use netbox_resources::Attr;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of a Read
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<S> {
    /// The object exists; carries the refreshed observed state
    Present(S),
    /// The object no longer exists and should be forgotten
    Absent,
}

/// Create/Read/Update/Delete for one kind of NetBox object
#[async_trait]
pub trait ResourceLifecycle: Send + Sync {
    type State: Send + Sync;

    async fn create(&self, desired: &Self::State, cancel: &CancellationToken) -> Result<Self::State, Diagnostics>;

    async fn read(
        &self,
        observed: &Self::State,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome<Self::State>, Diagnostics>;

    async fn update(
        &self,
        desired: &Self::State,
        observed: &Self::State,
        cancel: &CancellationToken,
    ) -> Result<Self::State, Diagnostics>;

    async fn delete(&self, observed: &Self::State, cancel: &CancellationToken) -> Result<(), Diagnostics>;
}

/// Reconciler for the resource kind `K`, backed by any gateway.
///
/// Holds no per-object state; one instance may serve many concurrent
/// operations.
pub struct Reconciler<K: ResourceKind> {
    gateway: Arc<dyn NetBoxGateway>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> Reconciler<K> {
    /// Reconciler issuing its calls through `gateway`
    pub fn new(gateway: Arc<dyn NetBoxGateway>) -> Self {
        Self {
            gateway,
            _kind: PhantomData,
        }
    }

    fn label(state: &K::State) -> String {
        match (K::name(state), K::id(state)) {
            (Attr::Value(name), Attr::Value(id)) => format!("{} {} (ID: {})", K::OBJECT_KIND, name, id),
            (Attr::Value(name), _) => format!("{} {}", K::OBJECT_KIND, name),
            (_, Attr::Value(id)) => format!("{} (ID: {})", K::OBJECT_KIND, id),
            _ => K::OBJECT_KIND.to_string(),
        }
    }

    fn require_id(state: &K::State) -> Result<u64, Diagnostics> {
        match K::id(state) {
            Attr::Value(id) => Ok(*id),
            _ => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.push_at("id", ReconcileError::missing("id"));
                Err(diagnostics)
            }
        }
    }

    /// Validate, resolve references and encode, collecting every problem
    async fn prepare(&self, desired: &K::State, mode: WriteMode, cancel: &CancellationToken) -> Result<Value, Diagnostics> {
        let validation = K::validate(desired, mode);
        if !validation.is_empty() {
            return Err(validation);
        }

        let mut diagnostics = Diagnostics::new();
        let resolved = match resolve_references(self.gateway.as_ref(), &K::references(desired), cancel).await {
            Ok(resolved) => resolved,
            Err(errors) => {
                if errors.any(|e| matches!(e, ReconcileError::Cancelled)) {
                    return Err(errors);
                }
                diagnostics.extend(errors);
                Resolved::default()
            }
        };

        match K::encode(desired, &resolved, mode) {
            Ok(payload) => diagnostics.into_result(payload),
            Err(errors) => {
                diagnostics.extend(errors);
                Err(diagnostics)
            }
        }
    }

    fn decode(local: &K::State, value: Value) -> Result<K::State, Diagnostics> {
        let remote: K::Remote = decode_remote(K::OBJECT_KIND, value)?;
        K::merge(local, remote)
    }

    /// Whether `observed` differs from `desired` on any attribute `desired` declares.
    ///
    /// Both sides are compared as write payloads, so name references are
    /// resolved to ids first and unknown attributes are ignored.
    pub async fn has_drifted(
        &self,
        desired: &K::State,
        observed: &K::State,
        cancel: &CancellationToken,
    ) -> Result<bool, Diagnostics> {
        let wanted = self.prepare(desired, WriteMode::Update, cancel).await?;
        let resolved = resolve_references(self.gateway.as_ref(), &K::references(observed), cancel).await?;
        match K::encode(observed, &resolved, WriteMode::Update) {
            Ok(current) => Ok(!payload_covers(&wanted, &current)),
            // A remote value the codec refuses cannot equal a valid desired one
            Err(_) => Ok(true),
        }
    }
}

impl<K: ResourceKind> Clone for Reconciler<K> {
    fn clone(&self) -> Self {
        Self::new(self.gateway.clone())
    }
}

impl<K: ResourceKind> fmt::Debug for Reconciler<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("kind", &K::OBJECT_KIND)
            .field("base_url", &self.gateway.base_url())
            .finish()
    }
}

#[async_trait]
impl<K: ResourceKind> ResourceLifecycle for Reconciler<K> {
    type State = K::State;

    async fn create(&self, desired: &K::State, cancel: &CancellationToken) -> Result<K::State, Diagnostics> {
        let payload = self.prepare(desired, WriteMode::Create, cancel).await?;
        debug!("Creating {} in NetBox", Self::label(desired));

        let created = cancellable(cancel, self.gateway.create(K::OBJECT_KIND, &payload)).await?;
        let created_id = created.get("id").and_then(Value::as_u64);
        match Self::decode(desired, created) {
            Ok(observed) => {
                info!("Created {} in NetBox", Self::label(&observed));
                Ok(observed)
            }
            Err(mut diagnostics) => {
                if let Some(id) = created_id {
                    warn!("Created {} (ID: {}) but could not decode the response", Self::label(desired), id);
                    diagnostics.push(ReconcileError::CreatedUndecoded { kind: K::OBJECT_KIND, id });
                }
                Err(diagnostics)
            }
        }
    }

    async fn read(&self, observed: &K::State, cancel: &CancellationToken) -> Result<ReadOutcome<K::State>, Diagnostics> {
        let id = Self::require_id(observed)?;
        let existing = check_existing(cancel, K::OBJECT_KIND, id, self.gateway.retrieve(K::OBJECT_KIND, id)).await?;
        match existing {
            Some(value) => Ok(ReadOutcome::Present(Self::decode(observed, value)?)),
            None => Ok(ReadOutcome::Absent),
        }
    }

    async fn update(
        &self,
        desired: &K::State,
        observed: &K::State,
        cancel: &CancellationToken,
    ) -> Result<K::State, Diagnostics> {
        let id = Self::require_id(observed)?;
        let payload = self.prepare(desired, WriteMode::Update, cancel).await?;
        info!("Updating {} in NetBox", Self::label(observed));

        let updated = update_existing(cancel, K::OBJECT_KIND, id, self.gateway.update(K::OBJECT_KIND, id, &payload)).await?;
        let observed = Self::decode(desired, updated)?;
        info!("Updated {} in NetBox", Self::label(&observed));
        Ok(observed)
    }

    async fn delete(&self, observed: &K::State, cancel: &CancellationToken) -> Result<(), Diagnostics> {
        let id = match K::id(observed) {
            Attr::Value(id) => *id,
            _ => {
                warn!("{} was never created, nothing to delete", Self::label(observed));
                return Ok(());
            }
        };
        delete_idempotent(cancel, K::OBJECT_KIND, id, self.gateway.destroy(K::OBJECT_KIND, id)).await?;
        info!("Deleted {} from NetBox", Self::label(observed));
        Ok(())
    }
}

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod reconciler_test;
