//! One reconciliation pass over the manifest
//!
//! Kinds are processed in dependency order so that names referenced by later
//! kinds (tags on regions) already exist in NetBox. Within a kind, entries
//! referencing another declared entry of the same kind by name (a region's
//! parent) run in a later wave than it. The entries of one wave are reconciled
//! concurrently.

use crate::error::ControllerError;
use crate::manifest::Manifest;
use crate::state::{Record, Records, StateFile};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use netbox_client::{NetBoxGateway, ObjectKind};
use netbox_reconciler::kinds::{ClusterTypeKind, RegionKind, TagKind, WebhookKind};
use netbox_reconciler::{
    Diagnostics, Operation, Outcome, Phase, ReadOutcome, ReconcileError, Reconciler, ResourceKind, ResourceLifecycle,
};
use netbox_resources::{Attr, Reference};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Summary of one pass
#[derive(Debug, Default)]
pub struct PassReport {
    /// Objects created in NetBox
    pub created: usize,
    /// Objects patched, either for a declared change or to revert an edit
    pub updated: usize,
    /// Objects removed because they are no longer declared
    pub deleted: usize,
    /// Objects already matching their declaration
    pub unchanged: usize,
    /// Tracked objects found deleted in NetBox
    pub drifted: usize,
    /// Tracked objects edited in NetBox and patched back
    pub reverted: usize,
    /// Every object that failed, with its diagnostics
    pub failures: Vec<ControllerError>,
}

impl PassReport {
    /// No object failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every failure is transient
    pub fn is_retryable(&self) -> bool {
        self.failures.iter().all(ControllerError::is_retryable)
    }
}

/// What happened to one object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Created,
    Updated,
    Deleted,
    Unchanged,
    Failed,
}

struct EntryResult<S> {
    address: String,
    record: Option<Record<S>>,
    change: Change,
    drifted: bool,
    reverted: bool,
    error: Option<ControllerError>,
}

fn outcome_of<T>(result: &Result<T, Diagnostics>) -> Outcome {
    match result {
        Ok(_) => Outcome::Succeeded,
        Err(d) if d.any(|e| matches!(e, ReconcileError::ResourceGone { .. })) => Outcome::NotFound,
        Err(_) => Outcome::Failed,
    }
}

fn observed_id<K: ResourceKind>(observed: &K::State) -> Result<u64, Diagnostics> {
    match K::id(observed) {
        Attr::Value(id) => Ok(*id),
        _ => Err(ReconcileError::Decode {
            kind: K::OBJECT_KIND,
            reason: "NetBox returned no id".to_string(),
        }
        .into()),
    }
}

/// Drives every declared object towards its desired state
#[derive(Clone)]
pub struct Driver {
    gateway: Arc<dyn NetBoxGateway>,
    max_concurrent: usize,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("base_url", &self.gateway.base_url())
            .field("max_concurrent", &self.max_concurrent)
            .finish()
    }
}

impl Driver {
    /// Driver running at most `max_concurrent` operations of one kind at a time
    pub fn new(gateway: Arc<dyn NetBoxGateway>, max_concurrent: usize) -> Self {
        Self {
            gateway,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Reconcile every kind in dependency order, updating `state` in place
    pub async fn run_pass(&self, manifest: &Manifest, state: &mut StateFile, cancel: &CancellationToken) -> PassReport {
        let mut report = PassReport::default();
        info!("Starting reconciliation pass: {} declared, {} tracked", manifest.len(), state.len());

        for kind in ObjectKind::ALL {
            if cancel.is_cancelled() {
                warn!("Reconciliation pass cancelled before {} objects", kind);
                break;
            }
            match kind {
                ObjectKind::Tag => self.sync_kind::<TagKind>(&manifest.tags, &mut state.tags, cancel, &mut report).await,
                ObjectKind::ClusterType => {
                    self.sync_kind::<ClusterTypeKind>(&manifest.cluster_types, &mut state.cluster_types, cancel, &mut report)
                        .await
                }
                ObjectKind::Region => {
                    self.sync_kind::<RegionKind>(&manifest.regions, &mut state.regions, cancel, &mut report).await
                }
                ObjectKind::Webhook => {
                    self.sync_kind::<WebhookKind>(&manifest.webhooks, &mut state.webhooks, cancel, &mut report).await
                }
            }
        }

        info!(
            "Reconciliation pass finished: {} created, {} updated, {} deleted, {} unchanged, {} drifted, {} failed",
            report.created,
            report.updated,
            report.deleted,
            report.unchanged,
            report.drifted,
            report.failures.len()
        );
        if report.reverted > 0 {
            info!("Reverted {} object(s) edited in NetBox", report.reverted);
        }
        report
    }

    async fn sync_kind<K: ResourceKind>(
        &self,
        desired: &BTreeMap<String, K::State>,
        records: &mut Records<K::State>,
        cancel: &CancellationToken,
        report: &mut PassReport,
    ) {
        let reconciler = Reconciler::<K>::new(self.gateway.clone());
        let addresses: BTreeSet<String> = desired.keys().chain(records.keys()).cloned().collect();
        debug!("Reconciling {} {} object(s)", addresses.len(), K::OBJECT_KIND);

        for (number, wave) in dependency_waves::<K>(desired, addresses).into_iter().enumerate() {
            if number > 0 {
                debug!("Reconciling {} objects, wave {}", K::OBJECT_KIND, number + 1);
            }
            let entries: Vec<_> = wave
                .into_iter()
                .map(|address| {
                    let wanted = desired.get(&address).cloned();
                    let record = records.remove(&address);
                    (address, wanted, record)
                })
                .collect();

            let results: Vec<EntryResult<K::State>> = stream::iter(entries)
                .map(|(address, wanted, record)| reconcile_entry(&reconciler, address, wanted, record, cancel))
                .buffer_unordered(self.max_concurrent)
                .collect()
                .await;

            for result in results {
                match result.change {
                    Change::Created => report.created += 1,
                    Change::Updated => report.updated += 1,
                    Change::Deleted => report.deleted += 1,
                    Change::Unchanged => report.unchanged += 1,
                    Change::Failed => {}
                }
                if result.drifted {
                    report.drifted += 1;
                }
                if result.reverted {
                    report.reverted += 1;
                }
                if let Some(error) = result.error {
                    error!("{}", error);
                    report.failures.push(error);
                }
                if let Some(record) = result.record {
                    records.insert(result.address, record);
                }
            }
        }
    }
}

/// Group addresses into waves so that every entry runs after the declared
/// entries of the same kind it references by name.
///
/// Entries caught in a reference cycle share the last wave and fail resolution.
fn dependency_waves<K: ResourceKind>(desired: &BTreeMap<String, K::State>, addresses: BTreeSet<String>) -> Vec<Vec<String>> {
    let by_name: HashMap<&str, &str> = desired
        .iter()
        .filter_map(|(address, state)| K::name(state).value().map(|name| (name.as_str(), address.as_str())))
        .collect();
    let depends_on = |address: &str| -> Vec<String> {
        let Some(state) = desired.get(address) else {
            return Vec::new();
        };
        K::references(state)
            .into_iter()
            .filter(|set| set.kind == K::OBJECT_KIND)
            .flat_map(|set| set.refs)
            .filter_map(|reference| match reference {
                Reference::Name(name) => by_name.get(name.as_str()).map(|a| a.to_string()),
                Reference::Id(_) => None,
            })
            .filter(|dependency| dependency != address)
            .collect()
    };

    let mut pending: BTreeMap<String, Vec<String>> = addresses
        .into_iter()
        .map(|address| {
            let dependencies = depends_on(&address);
            (address, dependencies)
        })
        .collect();
    let mut waves = Vec::new();
    while !pending.is_empty() {
        let ready: Vec<String> = pending
            .iter()
            .filter(|(_, dependencies)| dependencies.iter().all(|d| !pending.contains_key(d)))
            .map(|(address, _)| address.clone())
            .collect();
        if ready.is_empty() {
            warn!("Reference cycle among {} objects: {:?}", K::OBJECT_KIND, pending.keys().collect::<Vec<_>>());
            waves.push(std::mem::take(&mut pending).into_keys().collect());
            break;
        }
        for address in &ready {
            pending.remove(address);
        }
        waves.push(ready);
    }
    waves
}

/// Read, then create, update or delete one object.
///
/// The returned record is `None` when the object is no longer tracked.
async fn reconcile_entry<K: ResourceKind>(
    reconciler: &Reconciler<K>,
    address: String,
    desired: Option<K::State>,
    record: Option<Record<K::State>>,
    cancel: &CancellationToken,
) -> EntryResult<K::State> {
    let mut result = EntryResult {
        address,
        record: None,
        change: Change::Unchanged,
        drifted: false,
        reverted: false,
        error: None,
    };
    match step::<K>(reconciler, &mut result, desired, record, cancel).await {
        Ok(()) => {}
        Err(error) => {
            result.change = Change::Failed;
            result.error = Some(error);
        }
    }
    result
}

async fn step<K: ResourceKind>(
    reconciler: &Reconciler<K>,
    result: &mut EntryResult<K::State>,
    desired: Option<K::State>,
    record: Option<Record<K::State>>,
    cancel: &CancellationToken,
) -> Result<(), ControllerError> {
    let failed = |address: &str, diagnostics: Diagnostics| ControllerError::Reconciliation {
        kind: K::OBJECT_KIND,
        address: address.to_string(),
        diagnostics,
    };

    // Refresh what is tracked
    let mut phase = Phase::Absent;
    let mut tracked = None;
    if let Some(mut record) = record {
        phase = Phase::Present.begin(Operation::Read)?;
        let read = reconciler.read(&record.observed, cancel).await;
        match read {
            Ok(ReadOutcome::Present(observed)) => {
                record.observed = observed;
                record.last_reconciled = Utc::now();
                tracked = Some(record);
            }
            Ok(ReadOutcome::Absent) => {
                phase = phase.finish(Outcome::NotFound);
                result.drifted = true;
            }
            Err(diagnostics) => {
                result.record = Some(record);
                return Err(failed(&result.address, diagnostics));
            }
        }
    }

    match (tracked, desired) {
        (None, Some(desired)) => {
            let creating = phase.begin(Operation::Create)?;
            let created = reconciler.create(&desired, cancel).await;
            let next = creating.finish(outcome_of(&created));
            let observed = match created {
                Ok(observed) => observed,
                Err(diagnostics) => {
                    // The object exists in NetBox; the next pass reads it
                    if let Some(id) = diagnostics.created_id() {
                        let mut observed = desired.clone();
                        *K::id_mut(&mut observed) = Attr::Value(id);
                        result.record = Some(Record::new(id, desired, observed));
                    }
                    return Err(failed(&result.address, diagnostics));
                }
            };
            let id = observed_id::<K>(&observed).map_err(|d| failed(&result.address, d))?;
            debug!("{} {} is now {:?}", K::OBJECT_KIND, result.address, next);
            result.record = Some(Record::new(id, desired, observed));
            result.change = Change::Created;
        }
        (Some(mut record), Some(desired)) => {
            let changed = desired != record.applied;
            let edited = if changed {
                false
            } else {
                let drift = reconciler.has_drifted(&desired, &record.observed, cancel).await;
                match drift {
                    Ok(edited) => edited,
                    Err(diagnostics) => {
                        result.record = Some(record);
                        return Err(failed(&result.address, diagnostics));
                    }
                }
            };
            if !changed && !edited {
                result.record = Some(record);
                return Ok(());
            }
            if edited {
                warn!(
                    "{} {} was edited outside of the manifest, reverting",
                    K::OBJECT_KIND,
                    result.address
                );
            }

            let updating = phase.begin(Operation::Update)?;
            let updated = reconciler.update(&desired, &record.observed, cancel).await;
            let next = updating.finish(outcome_of(&updated));
            match updated {
                Ok(observed) => {
                    record.applied = desired;
                    record.observed = observed;
                    record.last_reconciled = Utc::now();
                    result.change = Change::Updated;
                    result.reverted = edited;
                    result.record = Some(record);
                }
                Err(diagnostics) => {
                    if next.is_tracked() {
                        result.record = Some(record);
                    }
                    return Err(failed(&result.address, diagnostics));
                }
            }
        }
        (Some(record), None) => {
            let deleting = phase.begin(Operation::Delete)?;
            let deleted = reconciler.delete(&record.observed, cancel).await;
            let next = deleting.finish(outcome_of(&deleted));
            match deleted {
                Ok(()) => {
                    info!("{} {} is no longer declared and was removed", K::OBJECT_KIND, result.address);
                    result.change = Change::Deleted;
                }
                Err(diagnostics) => {
                    if next.is_tracked() {
                        result.record = Some(record);
                    }
                    return Err(failed(&result.address, diagnostics));
                }
            }
        }
        (None, None) => {}
    }
    Ok(())
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod driver_test;
