//! Migration plan inputs (storage/network mappings) and the tasks a build
//! hands back for progress tracking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::storage::{AccessMode, VolumeMode};
use crate::traits::Ref;

/// Everything about the active plan the builder needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanContext {
    /// Namespace the plan (and its provisioner records) live in
    pub namespace: String,
    /// Source provider API URL, used as the volume import endpoint
    pub provider_url: String,
    /// Ordered storage mapping; order determines produced volume order
    pub storage_map: Vec<StoragePair>,
    /// Ordered network mapping; index determines `net-<i>` names
    pub network_map: Vec<NetworkPair>,
}

/// Source storage domain to destination storage class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoragePair {
    pub source: Ref,
    pub destination: DestinationStorage,
}

/// Destination side of a storage mapping entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DestinationStorage {
    pub storage_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_mode: Option<VolumeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_mode: Option<AccessMode>,
}

impl DestinationStorage {
    pub fn new(storage_class: impl Into<String>) -> Self {
        Self {
            storage_class: storage_class.into(),
            ..Default::default()
        }
    }

    pub fn with_volume_mode(mut self, mode: VolumeMode) -> Self {
        self.volume_mode = Some(mode);
        self
    }

    pub fn with_access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = Some(mode);
        self
    }
}

/// Source network to destination network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkPair {
    pub source: Ref,
    pub destination: DestinationNetwork,
}

/// Destination side of a network mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationNetwork {
    #[serde(rename = "type")]
    pub network_type: NetworkType,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
}

impl DestinationNetwork {
    /// The default pod network.
    pub fn pod() -> Self {
        Self {
            network_type: NetworkType::Pod,
            namespace: String::new(),
            name: String::new(),
        }
    }

    /// A secondary (multi-attach) network.
    pub fn multus(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            network_type: NetworkType::Multus,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// `namespace/name`, dropping empty parts.
    pub fn qualified_name(&self) -> String {
        [self.namespace.as_str(), self.name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Destination network type.
///
/// Closed set: an unrecognised type is rejected when the plan is parsed
/// rather than producing an interface with no binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Pod,
    Multus,
}

/// Unit annotation key on tasks.
pub const UNIT_ANNOTATION: &str = "unit";
/// Unit used for disk transfer progress.
pub const UNIT_MB: &str = "MB";

/// A unit of work tracked by the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable name (the disk id)
    pub name: String,
    pub progress: Progress,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: u64,
    pub completed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        assert_eq!(DestinationNetwork::multus("prod", "vlan10").qualified_name(), "prod/vlan10");
        assert_eq!(DestinationNetwork::multus("", "vlan10").qualified_name(), "vlan10");
        assert_eq!(DestinationNetwork::multus("prod", "").qualified_name(), "prod");
        assert_eq!(DestinationNetwork::pod().qualified_name(), "");
    }

    #[test]
    fn test_unknown_network_type_rejected() {
        let ok: DestinationNetwork = serde_json::from_str(r#"{"type": "multus", "name": "n"}"#).unwrap();
        assert_eq!(ok.network_type, NetworkType::Multus);
        let bad = serde_json::from_str::<DestinationNetwork>(r#"{"type": "ovn"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_destination_storage_modes_optional() {
        let dest: DestinationStorage =
            serde_json::from_str(r#"{"storageClass": "fast", "accessMode": "ReadWriteMany"}"#).unwrap();
        assert_eq!(dest.storage_class, "fast");
        assert_eq!(dest.volume_mode, None);
        assert_eq!(dest.access_mode, Some(AccessMode::ReadWriteMany));
    }
}
