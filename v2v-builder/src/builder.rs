//! The builder: entry point used by the migration controller for each VM.

use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use crate::credentials;
use crate::error::{BuildError, Result};
use crate::guest_os::{template_labels, OsClass};
use crate::machine;
use crate::network::map_networks;
use crate::plan::{PlanContext, StoragePair, Task};
use crate::source::{BiosType, Cluster, StorageDomain, Workload};
use crate::storage::{
    default_modes, CredentialRefs, DataVolume, DataVolumeSpec, ProvisionerDefaults,
};
use crate::tasks::disk_tasks;
use crate::traits::{Inventory, Kind, ProvisionerCatalog, Ref};
use crate::types::VirtualMachineSpec;

/// Translates source VMs into destination specs for one migration plan.
///
/// Every operation fetches the VM fresh and keeps no state between calls.
/// The only long-lived state is the provisioner lookup, filled by
/// [`Builder::load`] (or [`Builder::with_provisioners`]) and read-only after
/// that; `load` needs `&mut self`, so it can never race a build.
pub struct Builder<S, D, C> {
    context: PlanContext,
    source: S,
    destination: D,
    catalog: C,
    provisioners: ProvisionerDefaults,
}

impl<S, D, C> Builder<S, D, C>
where
    S: Inventory,
    D: Inventory,
    C: ProvisionerCatalog,
{
    /// Create a builder. Provisioner defaults are empty until [`Builder::load`].
    pub fn new(context: PlanContext, source: S, destination: D, catalog: C) -> Self {
        Self {
            context,
            source,
            destination,
            catalog,
            provisioners: ProvisionerDefaults::default(),
        }
    }

    /// Use an already loaded provisioner lookup.
    pub fn with_provisioners(mut self, provisioners: ProvisionerDefaults) -> Self {
        self.provisioners = provisioners;
        self
    }

    pub fn context(&self) -> &PlanContext {
        &self.context
    }

    pub fn provisioners(&self) -> &ProvisionerDefaults {
        &self.provisioners
    }

    /// Load provisioner records for the plan's namespace.
    pub fn load(&mut self) -> Result<()> {
        self.provisioners = ProvisionerDefaults::load(&self.catalog, &self.context.namespace)?;
        Ok(())
    }

    fn find_vm(&self, vm_ref: &Ref) -> Result<Workload> {
        self.source
            .find(vm_ref)
            .map_err(|e| BuildError::lookup(Kind::Vm, vm_ref, e))
    }

    /// Storage map with volume/access modes defaulted from the provisioners.
    ///
    /// Works on a copy; the plan's own mapping is left untouched.
    pub fn defaulted_storage_map(&self) -> Result<Vec<StoragePair>> {
        self.context
            .storage_map
            .iter()
            .map(|pair| -> Result<StoragePair> {
                let mut pair = pair.clone();
                default_modes(&mut pair.destination, &self.destination, &self.provisioners)?;
                Ok(pair)
            })
            .collect()
    }

    /// Data-volume specs for every disk on a mapped storage domain.
    ///
    /// Specs come out in storage-mapping order, then disk-attachment order.
    /// Disks on domains missing from the mapping are left out.
    #[instrument(skip(self, credentials), fields(vm = %vm_ref))]
    pub fn data_volumes(
        &self,
        vm_ref: &Ref,
        credentials: &CredentialRefs,
    ) -> Result<Vec<DataVolumeSpec>> {
        let vm = self.find_vm(vm_ref)?;
        let mut specs = Vec::new();

        for pair in &self.context.storage_map {
            let sd: StorageDomain = self
                .source
                .find(&pair.source)
                .map_err(|e| BuildError::lookup(Kind::StorageDomain, &pair.source, e))?;

            let mut destination = pair.destination.clone();
            default_modes(&mut destination, &self.destination, &self.provisioners)?;

            for da in vm
                .disk_attachments
                .iter()
                .filter(|da| da.disk.storage_domain == sd.id)
            {
                specs.push(DataVolumeSpec::for_disk(
                    da,
                    &destination,
                    &self.context.provider_url,
                    credentials,
                ));
            }
        }

        info!(
            disks = vm.disk_attachments.len(),
            volumes = specs.len(),
            "Data volume specs built"
        );
        Ok(specs)
    }

    /// Machine spec for the destination VM.
    #[instrument(skip(self, data_volumes), fields(vm = %vm_ref))]
    pub fn virtual_machine(
        &self,
        vm_ref: &Ref,
        data_volumes: &[DataVolume],
    ) -> Result<VirtualMachineSpec> {
        let vm = self.find_vm(vm_ref)?;
        let cluster_bios = self.cluster_bios(&vm)?;

        let mut spec = VirtualMachineSpec::default();
        machine::map_disks(&vm, data_volumes, &mut spec);
        machine::map_firmware(&vm, cluster_bios, &mut spec);
        machine::map_cpu(&vm, &mut spec);
        machine::map_memory(&vm, &mut spec);
        machine::map_clock(&vm, &mut spec);
        machine::map_input(&mut spec);

        let (networks, interfaces) = map_networks(&vm, &self.context.network_map, &self.source)?;
        spec.template.networks = networks;
        spec.template.domain.devices.interfaces = interfaces;

        info!(
            volumes = spec.template.volumes.len(),
            networks = spec.template.networks.len(),
            "Machine spec built"
        );
        Ok(spec)
    }

    /// BIOS type of the VM's cluster, fetched only when the VM defers to it.
    fn cluster_bios(&self, vm: &Workload) -> Result<BiosType> {
        if vm.bios != BiosType::ClusterDefault {
            return Ok(vm.bios);
        }
        let reference = Ref::with_id(&vm.cluster);
        let cluster: Cluster = self
            .source
            .find(&reference)
            .map_err(|e| BuildError::lookup(Kind::Cluster, &reference, e))?;
        debug!(cluster = %cluster.id, bios = ?cluster.bios_type, "Inherited cluster BIOS type");
        Ok(cluster.bios_type)
    }

    /// Progress tasks, one per attached disk.
    #[instrument(skip(self), fields(vm = %vm_ref))]
    pub fn tasks(&self, vm_ref: &Ref) -> Result<Vec<Task>> {
        let vm = self.find_vm(vm_ref)?;
        let tasks = disk_tasks(&vm);
        debug!(count = tasks.len(), "Tasks built");
        Ok(tasks)
    }

    /// OS class of the VM.
    pub fn os_class(&self, vm_ref: &Ref) -> Result<OsClass> {
        let vm = self.find_vm(vm_ref)?;
        Ok(OsClass::resolve(&vm.os_type))
    }

    /// Labels selecting the destination template for the VM.
    #[instrument(skip(self), fields(vm = %vm_ref))]
    pub fn template_labels(&self, vm_ref: &Ref) -> Result<BTreeMap<String, String>> {
        let class = self.os_class(vm_ref)?;
        debug!(os = %class, matched = ?class.matched, "Guest OS classified");
        Ok(template_labels(&class))
    }

    /// Importer credential secret data from the provider secret.
    pub fn secret(&self, provider: &BTreeMap<String, Vec<u8>>) -> BTreeMap<String, String> {
        credentials::secret_data(provider)
    }

    /// CA config map data from the provider secret.
    pub fn config_map(&self, provider: &BTreeMap<String, Vec<u8>>) -> BTreeMap<String, Vec<u8>> {
        credentials::config_map_data(provider)
    }
}

/// Stable identifier of a data volume: the source disk id.
///
/// Pure and total; lets the controller match created data volumes back to
/// the disks (and tasks) they belong to.
pub fn resolve_volume_disk_id(spec: &DataVolumeSpec) -> &str {
    spec.disk_id()
}
