//! NetBox declarative reconciliation
//!
//! Drives NetBox objects towards a declared desired state through a
//! [`NetBoxGateway`](netbox_client::NetBoxGateway):
//!
//! - **Field codec** ([`codec`]): tag sets, key-scoped custom-field merge,
//!   nullable references and optional strings
//! - **Reference resolution** ([`resolve`]): one batched lookup per kind, then
//!   unique binding
//! - **Lifecycle** ([`reconciler`]): Create, Read, Update and Delete with the
//!   404 policy of each operation
//!
//! # Example
//!
//! ```no_run
//! use netbox_client::{NetBoxClient, NetBoxGateway};
//! use netbox_reconciler::{kinds::RegionKind, Reconciler, ResourceLifecycle};
//! use netbox_resources::{Attr, RegionState};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway: Arc<dyn NetBoxGateway> = Arc::new(NetBoxClient::new(
//!     "http://netbox:80".to_string(),
//!     "your-api-token".to_string(),
//! )?);
//! let regions = Reconciler::<RegionKind>::new(gateway);
//!
//! let desired = RegionState {
//!     name: Attr::Value("core".to_string()),
//!     tags: Attr::Value(vec!["net".into()]),
//!     ..Default::default()
//! };
//! let observed = regions.create(&desired, &CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod diagnostics;
pub mod error;
pub mod kind;
pub mod kinds;
pub mod lifecycle;
pub mod lookup;
pub mod reconcile_helpers;
pub mod reconciler;
pub mod resolve;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::ReconcileError;
pub use kind::{ResourceKind, WriteMode};
pub use lifecycle::{Operation, Outcome, Phase};
pub use lookup::lookup_one;
pub use reconciler::{ReadOutcome, Reconciler, ResourceLifecycle};
pub use resolve::{ReferenceSet, Resolved};
