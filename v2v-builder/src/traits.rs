//! Collaborator traits: typed inventory lookup and the provisioner catalog.
//!
//! The engine never talks to a transport directly. Source and destination
//! inventories are reached through [`Inventory::find`], which is generic over
//! the [`Entity`] being fetched, and provisioner capability records come from
//! a [`ProvisionerCatalog`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LookupError;
use crate::storage::ProvisionerRecord;

/// Kind of inventory entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Vm,
    StorageDomain,
    Network,
    Cluster,
    StorageClass,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Vm => "vm",
            Kind::StorageDomain => "storage domain",
            Kind::Network => "network",
            Kind::Cluster => "cluster",
            Kind::StorageClass => "storage class",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an inventory entity.
///
/// The id wins when set; otherwise the entity is matched by name, and by
/// namespace too when one is given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Ref {
    pub id: String,
    pub name: String,
    pub namespace: String,
}

impl Ref {
    /// Reference an entity by id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Reference an entity by name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Does this reference select an entity with the given identity?
    pub fn matches(&self, id: &str, name: &str, namespace: &str) -> bool {
        if !self.id.is_empty() {
            return self.id == id;
        }
        if self.name.is_empty() || self.name != name {
            return false;
        }
        self.namespace.is_empty() || self.namespace == namespace
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.id.is_empty() {
            parts.push(format!("id={}", self.id));
        }
        if !self.name.is_empty() {
            if self.namespace.is_empty() {
                parts.push(format!("name={}", self.name));
            } else {
                parts.push(format!("name={}/{}", self.namespace, self.name));
            }
        }
        if parts.is_empty() {
            f.write_str("<empty>")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

/// A typed inventory entity.
pub trait Entity: DeserializeOwned {
    /// The kind used to route lookups.
    const KIND: Kind;
}

/// Typed lookup against a source or destination inventory.
///
/// Implementations are expected to be synchronous and idempotent. Failures
/// are returned as-is; the engine does not retry.
pub trait Inventory {
    /// Find the entity of type `T` selected by `reference`.
    fn find<T: Entity>(&self, reference: &Ref) -> Result<T, LookupError>;
}

impl<I: Inventory + ?Sized> Inventory for &I {
    fn find<T: Entity>(&self, reference: &Ref) -> Result<T, LookupError> {
        (**self).find(reference)
    }
}

/// Source of provisioner capability records.
pub trait ProvisionerCatalog {
    /// List the records visible in `namespace`.
    fn list(&self, namespace: &str) -> Result<Vec<ProvisionerRecord>, LookupError>;
}

impl<C: ProvisionerCatalog + ?Sized> ProvisionerCatalog for &C {
    fn list(&self, namespace: &str) -> Result<Vec<ProvisionerRecord>, LookupError> {
        (**self).list(namespace)
    }
}
