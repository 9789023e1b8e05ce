//! Object kinds addressed by the gateway

use std::fmt;

/// NetBox object kinds managed by the reconciler.
///
/// Each kind maps to one REST collection under `/api/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Tag,
    Region,
    ClusterType,
    Webhook,
}

impl ObjectKind {
    /// All kinds, in dependency order (referenced kinds first)
    pub const ALL: [ObjectKind; 4] = [
        ObjectKind::Tag,
        ObjectKind::ClusterType,
        ObjectKind::Region,
        ObjectKind::Webhook,
    ];

    /// REST endpoint relative to `/api/`
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Tag => "extras/tags",
            Self::Region => "dcim/regions",
            Self::ClusterType => "virtualization/cluster-types",
            Self::Webhook => "extras/webhooks",
        }
    }

    /// Whether objects of this kind carry a unique slug
    pub fn has_slug(self) -> bool {
        !matches!(self, Self::Webhook)
    }

    /// Collection path, e.g. `/api/dcim/regions/`
    pub fn collection_path(self) -> String {
        format!("/api/{}/", self.endpoint())
    }

    /// Object path, e.g. `/api/dcim/regions/4/`
    pub fn object_path(self, id: u64) -> String {
        format!("/api/{}/{}/", self.endpoint(), id)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tag => "tag",
            Self::Region => "region",
            Self::ClusterType => "cluster type",
            Self::Webhook => "webhook",
        };
        f.write_str(name)
    }
}
