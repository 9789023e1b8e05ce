//! Mock NetBox gateway for unit testing
//!
//! This module provides a mock implementation of [`NetBoxGateway`] that can be used
//! in unit tests without requiring a running NetBox instance.
//!
//! The mock behaves like NetBox where the reconciler depends on it:
//! - ids are assigned sequentially on create and never reused
//! - tag ids in payloads are expanded into nested tag objects on output
//! - region parent ids are expanded into nested regions on output
//! - custom fields declared with [`MockNetBoxClient::define_custom_field`] are always returned
//! - repeated filter keys are ORed
//!
//! Failures can be injected with [`MockNetBoxClient::fail_next`], server-side
//! defaults changed with [`MockNetBoxClient::set_default`], and every call is
//! recorded so tests can assert on batching.

mod helpers;

use crate::error::NetBoxError;
use crate::kind::ObjectKind;
use crate::netbox_trait::NetBoxGateway;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    /// `POST`, `GET`, `PATCH`, `DELETE` or `LIST`
    pub method: &'static str,
    /// Kind addressed
    pub kind: ObjectKind,
    /// Object id for single-object calls
    pub id: Option<u64>,
    /// Filters of a `LIST` call
    pub filters: Vec<(String, String)>,
}

/// Mock NetBox gateway for testing
///
/// This mock stores objects in memory and can be configured to return
/// specific responses for testing different scenarios.
#[derive(Debug, Clone)]
pub struct MockNetBoxClient {
    pub(crate) base_url: String,
    // Stored objects keep raw references (tag ids, parent id); nesting happens on output
    pub(crate) objects: Arc<Mutex<HashMap<ObjectKind, BTreeMap<u64, Value>>>>,
    pub(crate) custom_fields: Arc<Mutex<HashMap<ObjectKind, Vec<String>>>>,
    // Server-side defaults layered over the built-in ones on create
    pub(crate) defaults: Arc<Mutex<HashMap<ObjectKind, Value>>>,
    // (method filter, status, message); `None` matches any call
    pub(crate) failures: Arc<Mutex<VecDeque<(Option<&'static str>, u16, String)>>>,
    pub(crate) calls: Arc<Mutex<Vec<MockCall>>>,
    pub(crate) latency: Arc<Mutex<Option<Duration>>>,
    // Counter for generating IDs
    pub(crate) next_id: Arc<Mutex<u64>>,
}

impl MockNetBoxClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Arc::new(Mutex::new(HashMap::new())),
            custom_fields: Arc::new(Mutex::new(HashMap::new())),
            defaults: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            latency: Arc::new(Mutex::new(None)),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    /// Add a tag to the mock store (for test setup)
    pub fn add_tag(&self, id: u64, name: &str) {
        self.insert(
            ObjectKind::Tag,
            id,
            serde_json::json!({
                "name": name,
                "slug": helpers::slugify(name),
                "color": "9e9e9e",
                "description": "",
            }),
        );
    }

    /// Add a region to the mock store (for test setup)
    pub fn add_region(&self, id: u64, name: &str, parent: Option<u64>) {
        self.insert(
            ObjectKind::Region,
            id,
            serde_json::json!({
                "name": name,
                "slug": helpers::slugify(name),
                "parent": parent,
            }),
        );
    }

    /// Store an arbitrary object under a fixed id (for test setup)
    pub fn insert(&self, kind: ObjectKind, id: u64, fields: Value) {
        let mut object = helpers::defaults(kind);
        helpers::apply_payload(&mut object, &fields);
        self.objects.lock().unwrap().entry(kind).or_default().insert(id, object);
        let mut next = self.next_id.lock().unwrap();
        if *next <= id {
            *next = id + 1;
        }
    }

    /// Remove an object behind the reconciler's back (out-of-band deletion)
    pub fn remove(&self, kind: ObjectKind, id: u64) -> bool {
        self.objects
            .lock()
            .unwrap()
            .get_mut(&kind)
            .and_then(|objects| objects.remove(&id))
            .is_some()
    }

    /// Rendered object as the API would return it
    pub fn object(&self, kind: ObjectKind, id: u64) -> Option<Value> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(&kind)
            .and_then(|o| o.get(&id))
            .map(|raw| self.render(&objects, kind, id, raw))
    }

    /// Number of stored objects of one kind
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.objects.lock().unwrap().get(&kind).map_or(0, BTreeMap::len)
    }

    /// Make the API report a custom field for every object of `kind`
    pub fn define_custom_field(&self, kind: ObjectKind, name: &str) {
        self.custom_fields.lock().unwrap().entry(kind).or_default().push(name.to_string());
    }

    /// Override the value NetBox assigns to `field` when a create omits it
    pub fn set_default(&self, kind: ObjectKind, field: &str, value: Value) {
        let mut defaults = self.defaults.lock().unwrap();
        let entry = defaults.entry(kind).or_insert_with(|| serde_json::json!({}));
        if let Some(fields) = entry.as_object_mut() {
            fields.insert(field.to_string(), value);
        }
    }

    /// Set the id the next create will assign
    pub fn set_next_id(&self, id: u64) {
        *self.next_id.lock().unwrap() = id;
    }

    /// Fail the next gateway call with the given status
    pub fn fail_next(&self, status: u16, message: &str) {
        self.failures.lock().unwrap().push_back((None, status, message.to_string()));
    }

    /// Fail the next call with the given method ("POST", "GET", "PATCH", "DELETE", "LIST")
    pub fn fail_next_on(&self, method: &'static str, status: u16, message: &str) {
        self.failures.lock().unwrap().push_back((Some(method), status, message.to_string()));
    }

    /// Delay every gateway call (for cancellation tests)
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made so far with the given method ("POST", "GET", "PATCH", "DELETE", "LIST")
    pub fn calls_to(&self, method: &str) -> Vec<MockCall> {
        self.calls().into_iter().filter(|c| c.method == method).collect()
    }

    /// Generate next ID
    pub(crate) fn next_id(&self) -> u64 {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }

    fn render(&self, objects: &HashMap<ObjectKind, BTreeMap<u64, Value>>, kind: ObjectKind, id: u64, raw: &Value) -> Value {
        let custom_fields = self.custom_fields.lock().unwrap();
        let defined = custom_fields.get(&kind).map(Vec::as_slice).unwrap_or(&[]);
        helpers::render(&self.base_url, objects, kind, id, raw, defined)
    }

    /// Record a call, apply latency, and pop an injected failure
    async fn enter(&self, method: &'static str, kind: ObjectKind, id: Option<u64>, filters: &[(&str, &str)]) -> Result<(), NetBoxError> {
        self.calls.lock().unwrap().push(MockCall {
            method,
            kind,
            id,
            filters: filters.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        });
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let failure = {
            let mut failures = self.failures.lock().unwrap();
            failures
                .iter()
                .position(|(only, _, _)| only.is_none_or(|m| m == method))
                .and_then(|index| failures.remove(index))
        };
        match failure {
            Some((_, status, message)) => Err(NetBoxError::from_status(status, method, message)),
            None => Ok(()),
        }
    }

    fn not_found(kind: ObjectKind, id: u64) -> NetBoxError {
        NetBoxError::NotFound(format!("{} {} not found", kind, id))
    }
}

#[async_trait::async_trait]
impl NetBoxGateway for MockNetBoxClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), NetBoxError> {
        Ok(())
    }

    async fn create(&self, kind: ObjectKind, payload: &Value) -> Result<Value, NetBoxError> {
        self.enter("POST", kind, None, &[]).await?;
        helpers::validate_payload(kind, payload, true)?;
        let overrides = self.defaults.lock().unwrap().get(&kind).cloned();

        let mut objects = self.objects.lock().unwrap();
        helpers::check_references(&objects, payload)?;

        let mut object = helpers::defaults(kind);
        if let Some(overrides) = overrides {
            helpers::apply_payload(&mut object, &overrides);
        }
        helpers::apply_payload(&mut object, payload);
        let id = self.next_id();
        let rendered = self.render(&objects, kind, id, &object);
        objects.entry(kind).or_default().insert(id, object);
        Ok(rendered)
    }

    async fn retrieve(&self, kind: ObjectKind, id: u64) -> Result<Value, NetBoxError> {
        self.enter("GET", kind, Some(id), &[]).await?;
        self.object(kind, id).ok_or_else(|| Self::not_found(kind, id))
    }

    async fn update(&self, kind: ObjectKind, id: u64, payload: &Value) -> Result<Value, NetBoxError> {
        self.enter("PATCH", kind, Some(id), &[]).await?;

        let mut objects = self.objects.lock().unwrap();
        if !objects.get(&kind).is_some_and(|o| o.contains_key(&id)) {
            return Err(Self::not_found(kind, id));
        }
        helpers::validate_payload(kind, payload, false)?;
        helpers::check_references(&objects, payload)?;

        let Some(object) = objects.get_mut(&kind).and_then(|o| o.get_mut(&id)) else {
            return Err(Self::not_found(kind, id));
        };
        helpers::apply_payload(object, payload);
        let object = object.clone();
        Ok(self.render(&objects, kind, id, &object))
    }

    async fn destroy(&self, kind: ObjectKind, id: u64) -> Result<(), NetBoxError> {
        self.enter("DELETE", kind, Some(id), &[]).await?;
        if self.remove(kind, id) {
            Ok(())
        } else {
            Err(Self::not_found(kind, id))
        }
    }

    async fn list(&self, kind: ObjectKind, filters: &[(&str, &str)]) -> Result<Vec<Value>, NetBoxError> {
        self.enter("LIST", kind, None, filters).await?;
        let objects = self.objects.lock().unwrap();
        let Some(of_kind) = objects.get(&kind) else {
            return Ok(Vec::new());
        };
        Ok(of_kind
            .iter()
            .filter(|(id, raw)| helpers::matches_filters(**id, raw, filters))
            .map(|(id, raw)| self.render(&objects, kind, *id, raw))
            .collect())
    }
}
