//! In-memory inventory and provisioner catalog.
//!
//! Entities are stored as JSON and decoded into the requested type on every
//! lookup, the same way a REST-backed inventory would. Useful for:
//! - Unit and integration testing
//! - Offline runs of the CLI against an exported inventory snapshot

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::error::LookupError;
use crate::source::{Cluster, Network, StorageClass, StorageDomain, Workload};
use crate::storage::ProvisionerRecord;
use crate::traits::{Entity, Inventory, Kind, ProvisionerCatalog, Ref};

/// Inventory backed by in-memory JSON documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryInventory {
    entities: HashMap<Kind, Vec<Value>>,
}

fn field<'a>(value: &'a Value, name: &str) -> &'a str {
    value.get(name).and_then(Value::as_str).unwrap_or_default()
}

impl MemoryInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entity under its kind.
    pub fn insert<T: Entity + Serialize>(&mut self, entity: &T) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(entity)?;
        self.insert_value(T::KIND, value);
        Ok(())
    }

    /// Store a raw document under `kind`.
    pub fn insert_value(&mut self, kind: Kind, value: Value) {
        trace!(kind = %kind, id = %field(&value, "id"), name = %field(&value, "name"), "Inventory entity added");
        self.entities.entry(kind).or_default().push(value);
    }

    /// Number of stored entities of `kind`.
    pub fn count(&self, kind: Kind) -> usize {
        self.entities.get(&kind).map_or(0, Vec::len)
    }
}

impl Inventory for MemoryInventory {
    fn find<T: Entity>(&self, reference: &Ref) -> Result<T, LookupError> {
        let value = self
            .entities
            .get(&T::KIND)
            .and_then(|values| {
                values.iter().find(|v| {
                    reference.matches(field(v, "id"), field(v, "name"), field(v, "namespace"))
                })
            })
            .ok_or_else(|| LookupError::NotFound {
                kind: T::KIND,
                reference: reference.clone(),
            })?;

        debug!(kind = %T::KIND, reference = %reference, "Inventory lookup");
        T::deserialize(value).map_err(|source| LookupError::Decode {
            kind: T::KIND,
            reference: reference.clone(),
            source,
        })
    }
}

/// Provisioner catalog backed by a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    records: Vec<ProvisionerRecord>,
}

impl MemoryCatalog {
    pub fn new(records: Vec<ProvisionerRecord>) -> Self {
        Self { records }
    }
}

impl ProvisionerCatalog for MemoryCatalog {
    /// Records whose namespace equals `namespace`.
    fn list(&self, namespace: &str) -> Result<Vec<ProvisionerRecord>, LookupError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.namespace == namespace)
            .cloned()
            .collect())
    }
}

/// An exported inventory: source entities, destination storage classes and
/// provisioner records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySnapshot {
    pub source: SourceSnapshot,
    pub destination: DestinationSnapshot,
    pub provisioners: Vec<ProvisionerRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSnapshot {
    pub vms: Vec<Workload>,
    pub storage_domains: Vec<StorageDomain>,
    pub networks: Vec<Network>,
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationSnapshot {
    pub storage_classes: Vec<StorageClass>,
}

/// Inventories and catalog materialized from a snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotParts {
    pub source: MemoryInventory,
    pub destination: MemoryInventory,
    pub catalog: MemoryCatalog,
}

impl InventorySnapshot {
    /// Split the snapshot into source/destination inventories and a catalog.
    pub fn into_parts(self) -> Result<SnapshotParts, serde_json::Error> {
        let mut source = MemoryInventory::new();
        for vm in &self.source.vms {
            source.insert(vm)?;
        }
        for sd in &self.source.storage_domains {
            source.insert(sd)?;
        }
        for network in &self.source.networks {
            source.insert(network)?;
        }
        for cluster in &self.source.clusters {
            source.insert(cluster)?;
        }

        let mut destination = MemoryInventory::new();
        for class in &self.destination.storage_classes {
            destination.insert(class)?;
        }

        Ok(SnapshotParts {
            source,
            destination,
            catalog: MemoryCatalog::new(self.provisioners),
        })
    }
}
