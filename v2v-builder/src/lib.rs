//! # v2v Builder
//!
//! Translation engine for migrating virtual machines from an oVirt source
//! inventory onto a KubeVirt destination.
//!
//! For each source VM the builder produces:
//! - **Data-volume specs** - one per disk on a mapped storage domain
//! - **A machine spec** - disks, firmware, CPU, memory, clock, input, networks
//! - **Progress tasks** - one per attached disk
//! - **Template labels** - derived from the guest OS identifier
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                 Builder                  │
//! │ (data_volumes, virtual_machine, tasks)   │
//! └──────┬───────────────┬───────────────┬───┘
//!        │               │               │
//!        ▼               ▼               ▼
//! ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//! │   Source    │ │ Destination │ │ Provisioner │
//! │  Inventory  │ │  Inventory  │ │   Catalog   │
//! └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use v2v_builder::{Builder, CredentialRefs, InventorySnapshot, PlanContext, Ref};
//!
//! let parts = snapshot.into_parts()?;
//! let mut builder = Builder::new(plan, parts.source, parts.destination, parts.catalog);
//! builder.load()?;
//!
//! let vm = Ref::with_id("vm-1");
//! let specs = builder.data_volumes(&vm, &CredentialRefs::default())?;
//! let tasks = builder.tasks(&vm)?;
//! ```

pub mod builder;
pub mod credentials;
pub mod error;
pub mod guest_os;
pub mod machine;
pub mod mock;
pub mod network;
pub mod plan;
pub mod source;
pub mod storage;
pub mod tasks;
pub mod traits;
pub mod types;

pub use builder::{resolve_volume_disk_id, Builder};
pub use error::{BuildError, LookupError, Result};
pub use guest_os::{OsClass, OsMatch};
pub use mock::{InventorySnapshot, MemoryCatalog, MemoryInventory, SnapshotParts};
pub use plan::{
    DestinationNetwork, DestinationStorage, NetworkPair, NetworkType, PlanContext, Progress,
    StoragePair, Task,
};
pub use storage::{
    AccessMode, CredentialRefs, DataVolume, DataVolumeSpec, ProvisionerDefaults,
    ProvisionerRecord, VolumeMode,
};
pub use traits::{Entity, Inventory, Kind, ProvisionerCatalog, Ref};
pub use types::*;
