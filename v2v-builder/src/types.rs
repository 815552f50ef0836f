//! Destination machine spec (KubeVirt side).
//!
//! Serialized field names follow the destination API so a built spec can be
//! dumped straight into a manifest.

use serde::{Serialize, Serializer};
use std::fmt;

// =============================================================================
// QUANTITY
// =============================================================================

/// A byte count rendered as a binary-SI quantity ("10Gi", "1536").
///
/// The value is never rounded: the largest power-of-1024 suffix that divides
/// it exactly is used, and plain bytes otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity(pub u64);

const BINARY_SUFFIXES: [(&str, u32); 6] = [
    ("Ei", 6),
    ("Pi", 5),
    ("Ti", 4),
    ("Gi", 3),
    ("Mi", 2),
    ("Ki", 1),
];

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 > 0 {
            for (suffix, exp) in BINARY_SUFFIXES {
                let unit = 1024u64.pow(exp);
                if self.0 % unit == 0 {
                    return write!(f, "{}{}", self.0 / unit, suffix);
                }
            }
        }
        write!(f, "{}", self.0)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// MACHINE SPEC
// =============================================================================

/// Machine spec for the destination VM.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSpec {
    pub template: VmTemplateSpec,
}

/// Instance template: domain plus the volumes and networks it references.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VmTemplateSpec {
    pub domain: DomainSpec,
    pub volumes: Vec<Volume>,
    pub networks: Vec<NetworkAttachment>,
}

/// Virtual hardware.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSpec {
    pub machine: Machine,
    pub cpu: Cpu,
    pub resources: ResourceRequests,
    pub firmware: Firmware,
    pub features: Features,
    pub clock: Clock,
    pub devices: Devices,
}

/// Machine type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Machine {
    #[serde(rename = "type")]
    pub machine_type: String,
}

/// CPU topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cpu {
    pub sockets: u32,
    pub cores: u32,
    pub threads: u32,
}

/// Resource requests. Only memory is reserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceRequests {
    pub memory: Quantity,
}

/// Firmware: hardware serial plus bootloader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Firmware {
    pub serial: String,
    pub bootloader: Bootloader,
}

/// Bootloader type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bootloader {
    #[default]
    Bios,
    Efi,
}

/// Optional hypervisor features.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Features {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smm: Option<FeatureState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureState {
    pub enabled: bool,
}

/// Guest clock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Clock {
    pub timezone: String,
    pub timer: Timer,
}

/// Timer block; attached with the platform defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timer {}

/// Devices attached to the domain.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Devices {
    pub disks: Vec<DiskDevice>,
    pub interfaces: Vec<Interface>,
    pub inputs: Vec<Input>,
}

// =============================================================================
// DISKS & VOLUMES
// =============================================================================

/// A volume backed by a data volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub name: String,
    pub data_volume: DataVolumeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataVolumeRef {
    pub name: String,
}

/// A disk device exposing a volume of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskDevice {
    pub name: String,
    pub disk: DiskTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiskTarget {
    pub bus: DiskBus,
}

/// Disk bus type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskBus {
    Virtio,
    Scsi,
    Sata,
}

impl DiskBus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskBus::Virtio => "virtio",
            DiskBus::Scsi => "scsi",
            DiskBus::Sata => "sata",
        }
    }
}

// =============================================================================
// NETWORKS
// =============================================================================

/// Device model used for every mapped interface.
pub const VIRTIO_MODEL: &str = "virtio";

/// A destination network the VM is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkAttachment {
    pub name: String,
    #[serde(flatten)]
    pub source: NetworkSource,
}

/// Where a destination network comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkSource {
    /// The default pod network
    Pod {},
    /// A secondary network attachment ("namespace/name")
    Multus {
        #[serde(rename = "networkName")]
        network_name: String,
    },
}

/// A network interface device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interface {
    pub name: String,
    pub model: String,
    pub mac_address: String,
    #[serde(flatten)]
    pub binding: InterfaceBinding,
}

/// How an interface is connected. Exactly one per interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceBinding {
    Masquerade {},
    Sriov {},
    Bridge {},
}

// =============================================================================
// INPUT
// =============================================================================

/// Input device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Input {
    #[serde(rename = "type")]
    pub input_type: String,
    pub name: String,
    pub bus: String,
}

impl Input {
    /// Standard virtio tablet pointer.
    pub fn tablet() -> Self {
        Self {
            input_type: "tablet".to_string(),
            name: "tablet".to_string(),
            bus: DiskBus::Virtio.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_display() {
        assert_eq!(Quantity(0).to_string(), "0");
        assert_eq!(Quantity(1536).to_string(), "1536");
        assert_eq!(Quantity(2048).to_string(), "2Ki");
        assert_eq!(Quantity(10 * 1024 * 1024 * 1024).to_string(), "10Gi");
        assert_eq!(Quantity(3 * 1024 * 1024 + 512).to_string(), "3146240");
    }

    #[test]
    fn test_interface_serialization() {
        let iface = Interface {
            name: "net-0".to_string(),
            model: VIRTIO_MODEL.to_string(),
            mac_address: "56:6f:05:0f:00:01".to_string(),
            binding: InterfaceBinding::Sriov {},
        };
        let json = serde_json::to_value(&iface).unwrap();
        assert_eq!(json["macAddress"], "56:6f:05:0f:00:01");
        assert!(json.get("sriov").is_some());
        assert!(json.get("bridge").is_none());

        let net = NetworkAttachment {
            name: "net-1".to_string(),
            source: NetworkSource::Multus {
                network_name: "prod/vlan10".to_string(),
            },
        };
        let json = serde_json::to_value(&net).unwrap();
        assert_eq!(json["multus"]["networkName"], "prod/vlan10");
    }
}
