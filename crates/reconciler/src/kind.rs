//! Per-kind behaviour plugged into the generic reconciler

use crate::diagnostics::Diagnostics;
use crate::resolve::{ReferenceSet, Resolved};
use netbox_client::ObjectKind;
use netbox_resources::Attr;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// Which write a payload is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// POST of a new object; derived defaults such as the slug are filled in
    Create,
    /// PATCH of an existing object; only declared attributes are sent
    Update,
}

/// A NetBox object kind the reconciler can manage.
///
/// `State` is the local attribute state, used both as the desired object and
/// as the observed object. `Remote` is the typed NetBox model it is decoded
/// from.
pub trait ResourceKind: Send + Sync + 'static {
    /// Desired and observed attribute state
    type State: Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync;
    /// Typed NetBox model returned by the API
    type Remote: DeserializeOwned + Send;

    /// Endpoint the kind is stored under
    const OBJECT_KIND: ObjectKind;

    /// NetBox id; unknown until the object is created
    fn id(state: &Self::State) -> &Attr<u64>;

    /// Mutable access to the id, used to track objects NetBox answered for badly
    fn id_mut(state: &mut Self::State) -> &mut Attr<u64>;

    /// Display name, used for logs and same-kind ordering
    fn name(state: &Self::State) -> &Attr<String>;

    /// Required-attribute checks that must pass before any network call
    fn validate(desired: &Self::State, mode: WriteMode) -> Diagnostics;

    /// References the payload needs resolved to ids
    fn references(_desired: &Self::State) -> Vec<ReferenceSet> {
        Vec::new()
    }

    /// Build the write payload; every problem found is reported
    fn encode(desired: &Self::State, resolved: &Resolved, mode: WriteMode) -> Result<serde_json::Value, Diagnostics>;

    /// Decode the remote object on top of `local`, which supplies the intent
    /// needed to interpret ambiguous remote values
    fn merge(local: &Self::State, remote: Self::Remote) -> Result<Self::State, Diagnostics>;
}

/// Shared required-name check
pub(crate) fn require_string(diagnostics: &mut Diagnostics, attribute: &str, attr: &Attr<String>) {
    let present = attr.value().is_some_and(|s| !s.trim().is_empty());
    if !present {
        diagnostics.push_at(attribute, crate::error::ReconcileError::missing(attribute));
    }
}
