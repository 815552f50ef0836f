//! Provisioner capability records and volume/access mode defaulting.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use super::{AccessMode, VolumeMode};
use crate::error::{BuildError, Result};
use crate::plan::DestinationStorage;
use crate::source::StorageClass;
use crate::traits::{Inventory, Kind, ProvisionerCatalog, Ref};

/// Capabilities of a destination storage provisioner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProvisionerRecord {
    /// Provisioner identifier as it appears on storage classes
    pub name: String,
    pub namespace: String,
    pub volume_modes: Vec<VolumeModeCapability>,
}

/// A supported volume mode and the access modes available with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeModeCapability {
    pub name: VolumeMode,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub access_modes: Vec<AccessModeCapability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessModeCapability {
    pub name: AccessMode,
    #[serde(default)]
    pub priority: i32,
}

/// Highest priority item; the earliest one wins a tie.
fn highest_priority<T>(items: &[T], priority: impl Fn(&T) -> i32) -> Option<&T> {
    items.iter().fold(None, |best, item| match best {
        Some(b) if priority(b) >= priority(item) => Some(b),
        _ => Some(item),
    })
}

impl ProvisionerRecord {
    /// The requested volume mode when supported, else the default one.
    pub fn volume_mode(&self, requested: Option<VolumeMode>) -> Option<&VolumeModeCapability> {
        requested
            .and_then(|mode| self.volume_modes.iter().find(|v| v.name == mode))
            .or_else(|| highest_priority(&self.volume_modes, |v| v.priority))
    }
}

impl VolumeModeCapability {
    /// The requested access mode when supported, else the default one.
    pub fn access_mode(&self, requested: Option<AccessMode>) -> Option<&AccessModeCapability> {
        requested
            .and_then(|mode| self.access_modes.iter().find(|a| a.name == mode))
            .or_else(|| highest_priority(&self.access_modes, |a| a.priority))
    }
}

/// Read-only lookup of provisioner records keyed by provisioner name.
///
/// Built once (see [`ProvisionerDefaults::load`]) and never mutated
/// afterwards, so it can be shared freely between concurrent builds.
#[derive(Debug, Clone, Default)]
pub struct ProvisionerDefaults {
    by_name: HashMap<String, ProvisionerRecord>,
}

impl ProvisionerDefaults {
    /// List the records in `namespace` from the catalog.
    pub fn load<C: ProvisionerCatalog>(catalog: &C, namespace: &str) -> Result<Self> {
        let records = catalog.list(namespace).map_err(|source| BuildError::Catalog {
            namespace: namespace.to_string(),
            source,
        })?;
        let defaults = Self::from_records(records);
        info!(namespace = %namespace, count = defaults.len(), "Provisioners loaded");
        Ok(defaults)
    }

    /// Index records by name. A later record replaces an earlier one.
    pub fn from_records(records: impl IntoIterator<Item = ProvisionerRecord>) -> Self {
        Self {
            by_name: records
                .into_iter()
                .map(|record| (record.name.clone(), record))
                .collect(),
        }
    }

    pub fn get(&self, provisioner: &str) -> Option<&ProvisionerRecord> {
        self.by_name.get(provisioner)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Fill unset volume/access modes on a storage mapping entry.
///
/// User-set fields are never overwritten. When the storage class's
/// provisioner is unknown the fields stay unset and the volume builder
/// applies Filesystem / ReadWriteOnce.
pub fn default_modes<I: Inventory>(
    destination: &mut DestinationStorage,
    inventory: &I,
    provisioners: &ProvisionerDefaults,
) -> Result<()> {
    if destination.volume_mode.is_some() && destination.access_mode.is_some() {
        return Ok(());
    }

    let reference = Ref::with_name(&destination.storage_class);
    let class: StorageClass = inventory
        .find(&reference)
        .map_err(|e| BuildError::lookup(Kind::StorageClass, &reference, e))?;

    let Some(provisioner) = provisioners.get(&class.provisioner) else {
        debug!(
            storage_class = %class.name,
            provisioner = %class.provisioner,
            "No capability record for provisioner, leaving modes unset"
        );
        return Ok(());
    };

    if let Some(volume_mode) = provisioner.volume_mode(destination.volume_mode) {
        let access_mode = volume_mode.access_mode(destination.access_mode);
        if destination.volume_mode.is_none() {
            destination.volume_mode = Some(volume_mode.name);
        }
        if destination.access_mode.is_none() {
            destination.access_mode = access_mode.map(|a| a.name);
        }
    }

    debug!(
        storage_class = %class.name,
        provisioner = %class.provisioner,
        volume_mode = ?destination.volume_mode,
        access_mode = ?destination.access_mode,
        "Storage modes defaulted"
    );
    Ok(())
}
