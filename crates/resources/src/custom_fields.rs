//! Custom field values

use std::collections::BTreeMap;

/// Custom field name to optional scalar value.
///
/// `None` is an explicit null on the NetBox side (field defined, no value).
pub type CustomFieldMap = BTreeMap<String, Option<String>>;
