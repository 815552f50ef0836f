//! Source inventory model (oVirt side) and the destination storage class.
//!
//! Every struct is `#[serde(default)]`: inventories routinely omit fields and
//! the engine must still produce a spec from partial records.

use serde::{Deserialize, Serialize};

use crate::traits::{Entity, Kind};
use crate::types::DiskBus;

/// A source VM as recorded in the inventory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Workload {
    pub id: String,
    pub name: String,
    /// Owning cluster id
    pub cluster: String,
    pub cpu_sockets: u32,
    pub cpu_cores: u32,
    pub cpu_threads: u32,
    /// Memory size in bytes
    pub memory: u64,
    pub timezone: String,
    pub bios: BiosType,
    pub serial_number: String,
    /// Free-form guest OS identifier (e.g. "rhel_7x64")
    pub os_type: String,
    pub disk_attachments: Vec<DiskAttachment>,
    pub nics: Vec<Nic>,
}

impl Entity for Workload {
    const KIND: Kind = Kind::Vm;
}

/// Association between a VM and one of its disks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskAttachment {
    pub id: String,
    pub interface: DiskInterface,
    pub disk: Disk,
}

/// A source disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Disk {
    pub id: String,
    /// Provisioned size in bytes
    pub provisioned_size: u64,
    /// Owning storage domain id
    pub storage_domain: String,
}

/// A VM network interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Nic {
    pub id: String,
    pub name: String,
    pub mac: String,
    pub profile: NicProfile,
}

/// Network profile a NIC is bound to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NicProfile {
    pub id: String,
    /// Network id
    pub network: String,
    pub pass_through: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageDomain {
    pub id: String,
    pub name: String,
}

impl Entity for StorageDomain {
    const KIND: Kind = Kind::StorageDomain;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub id: String,
    pub name: String,
}

impl Entity for Network {
    const KIND: Kind = Kind::Network;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub bios_type: BiosType,
}

impl Entity for Cluster {
    const KIND: Kind = Kind::Cluster;
}

/// Destination storage class, looked up by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageClass {
    pub name: String,
    pub provisioner: String,
}

impl Entity for StorageClass {
    const KIND: Kind = Kind::StorageClass;
}

/// Source BIOS type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiosType {
    /// Inherit the cluster's BIOS type
    ClusterDefault,
    I440fxSeaBios,
    Q35SeaBios,
    Q35Ovmf,
    Q35SecureBoot,
    /// Anything the inventory reports that we don't recognise, including
    /// an absent or empty value. Boots through BIOS with no cluster lookup.
    #[default]
    #[serde(other)]
    Unknown,
}

impl BiosType {
    /// Resolve `ClusterDefault` against the cluster's BIOS type.
    pub fn effective(self, cluster: BiosType) -> BiosType {
        match self {
            BiosType::ClusterDefault => cluster,
            other => other,
        }
    }

    /// Does this BIOS type boot through UEFI firmware?
    ///
    /// Only `q35_ovmf` does; secure-boot and SeaBIOS variants, unknown
    /// values and an unresolved cluster default all fall back to BIOS.
    pub fn is_uefi(self) -> bool {
        match self {
            BiosType::Q35Ovmf => true,
            BiosType::ClusterDefault
            | BiosType::I440fxSeaBios
            | BiosType::Q35SeaBios
            | BiosType::Q35SecureBoot
            | BiosType::Unknown => false,
        }
    }
}

/// Disk interface hint recorded on a disk attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiskInterface {
    VirtioScsi,
    #[default]
    Virtio,
    Sata,
    Ide,
    SpaprVscsi,
    #[serde(other)]
    Other,
}

impl DiskInterface {
    /// Destination bus for this interface.
    pub fn bus(self) -> DiskBus {
        match self {
            DiskInterface::VirtioScsi => DiskBus::Scsi,
            DiskInterface::Sata => DiskBus::Sata,
            // virtio, ide, spapr and unknown interfaces all land on virtio
            DiskInterface::Virtio
            | DiskInterface::Ide
            | DiskInterface::SpaprVscsi
            | DiskInterface::Other => DiskBus::Virtio,
        }
    }
}
