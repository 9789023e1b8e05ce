//! DCops NetBox resource definitions
//!
//! Local state types for NetBox objects. One struct per kind serves as both the
//! desired object (declared by the operator, `id` unknown) and the observed
//! object (after reconciliation, `id` assigned by NetBox).
//!
//! Every attribute is an [`Attr`], which keeps apart an attribute that is not
//! known yet, one that is explicitly null, and one with a value.

pub mod attr;
pub mod custom_fields;
pub mod reference;

pub mod extras;
pub mod dcim;
pub mod virtualization;

pub use attr::Attr;
pub use custom_fields::CustomFieldMap;
pub use reference::Reference;

pub use extras::tag::*;
pub use extras::webhook::*;
pub use dcim::region::*;
pub use virtualization::cluster_type::*;
