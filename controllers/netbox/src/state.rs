//! Persisted reconciliation state
//!
//! Tracks, per local address, the NetBox id, the desired object last written
//! and the last observed object. Saved as JSON after every pass.

use crate::error::ControllerError;
use chrono::{DateTime, Utc};
use netbox_resources::{ClusterTypeState, RegionState, TagState, WebhookState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One tracked object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<S> {
    /// NetBox id
    pub id: u64,
    /// Desired state last written to NetBox
    pub applied: S,
    /// Object as NetBox last reported it
    pub observed: S,
    /// When the object was last read or written
    pub last_reconciled: DateTime<Utc>,
}

impl<S> Record<S> {
    /// Record for an object written just now
    pub fn new(id: u64, applied: S, observed: S) -> Self {
        Self {
            id,
            applied,
            observed,
            last_reconciled: Utc::now(),
        }
    }
}

/// Records of one kind by local address
pub type Records<S> = BTreeMap<String, Record<S>>;

/// Every tracked object, by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFile {
    pub tags: Records<TagState>,
    pub cluster_types: Records<ClusterTypeState>,
    pub regions: Records<RegionState>,
    pub webhooks: Records<WebhookState>,
}

impl StateFile {
    /// Load the state file; a missing file is an empty state
    pub async fn load(path: &Path) -> Result<Self, ControllerError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ControllerError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&contents).map_err(|source| ControllerError::State {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write to a sibling temp file, then rename over the target
    pub async fn save(&self, path: &Path) -> Result<(), ControllerError> {
        let encoded = serde_json::to_vec_pretty(self).map_err(|source| ControllerError::State {
            path: path.to_path_buf(),
            source,
        })?;
        let mut temp = path.as_os_str().to_owned();
        temp.push(".tmp");
        let temp = std::path::PathBuf::from(temp);

        let io_error = |source| ControllerError::Io {
            path: path.to_path_buf(),
            source,
        };
        tokio::fs::write(&temp, encoded).await.map_err(io_error)?;
        tokio::fs::rename(&temp, path).await.map_err(io_error)
    }

    /// Number of tracked objects across every kind
    pub fn len(&self) -> usize {
        self.tags.len() + self.cluster_types.len() + self.regions.len() + self.webhooks.len()
    }
}
