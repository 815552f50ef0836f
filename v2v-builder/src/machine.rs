//! Machine spec mappers: disks, firmware, CPU, memory, clock and input.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::source::{BiosType, DiskAttachment, Workload};
use crate::storage::DataVolume;
use crate::types::*;

/// Destination machine type.
pub const MACHINE_TYPE: &str = "q35";

/// Positional name shared by a volume and its disk device.
pub fn volume_name(index: usize) -> String {
    format!("vol-{}", index)
}

/// Wire data volumes into the spec as volumes plus disk devices.
///
/// Names follow the order of `data_volumes`. The bus comes from the disk
/// attachment the volume was imported from; a data volume whose disk is not
/// attached to `vm` is skipped.
pub fn map_disks(vm: &Workload, data_volumes: &[DataVolume], spec: &mut VirtualMachineSpec) {
    let attachments: HashMap<&str, &DiskAttachment> = vm
        .disk_attachments
        .iter()
        .map(|da| (da.disk.id.as_str(), da))
        .collect();

    for (index, dv) in data_volumes.iter().enumerate() {
        let disk_id = dv.spec.disk_id();
        let Some(attachment) = attachments.get(disk_id) else {
            warn!(disk_id = %disk_id, data_volume = %dv.name, "Data volume has no matching disk attachment");
            continue;
        };

        let name = volume_name(index);
        let bus = attachment.interface.bus();
        debug!(disk_id = %disk_id, volume = %name, bus = bus.as_str(), "Disk mapped");

        spec.template.volumes.push(Volume {
            name: name.clone(),
            data_volume: DataVolumeRef {
                name: dv.name.clone(),
            },
        });
        spec.template.domain.devices.disks.push(DiskDevice {
            name,
            disk: DiskTarget { bus },
        });
    }
}

/// Firmware, serial and the SMM feature.
///
/// `cluster_bios` is only consulted when the VM uses the cluster default.
pub fn map_firmware(vm: &Workload, cluster_bios: BiosType, spec: &mut VirtualMachineSpec) {
    let bios = vm.bios.effective(cluster_bios);
    let serial = if vm.serial_number.is_empty() {
        vm.id.clone()
    } else {
        vm.serial_number.clone()
    };

    let domain = &mut spec.template.domain;
    if bios.is_uefi() {
        domain.features.smm = Some(FeatureState { enabled: true });
        domain.firmware = Firmware {
            serial,
            bootloader: Bootloader::Efi,
        };
    } else {
        domain.features = Features::default();
        domain.firmware = Firmware {
            serial,
            bootloader: Bootloader::Bios,
        };
    }
    debug!(bios = ?bios, bootloader = ?domain.firmware.bootloader, "Firmware mapped");
}

/// CPU topology and machine type.
pub fn map_cpu(vm: &Workload, spec: &mut VirtualMachineSpec) {
    let domain = &mut spec.template.domain;
    domain.machine = Machine {
        machine_type: MACHINE_TYPE.to_string(),
    };
    domain.cpu = Cpu {
        sockets: vm.cpu_sockets,
        cores: vm.cpu_cores,
        threads: vm.cpu_threads,
    };
}

/// Memory reservation, exactly the VM's recorded size.
pub fn map_memory(vm: &Workload, spec: &mut VirtualMachineSpec) {
    spec.template.domain.resources = ResourceRequests {
        memory: Quantity(vm.memory),
    };
}

/// Guest clock with the VM's timezone and a timer.
pub fn map_clock(vm: &Workload, spec: &mut VirtualMachineSpec) {
    spec.template.domain.clock = Clock {
        timezone: vm.timezone.clone(),
        timer: Timer::default(),
    };
}

/// A single virtio tablet.
pub fn map_input(spec: &mut VirtualMachineSpec) {
    spec.template.domain.devices.inputs = vec![Input::tablet()];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::DestinationStorage;
    use crate::source::{Disk, DiskInterface};
    use crate::storage::{CredentialRefs, DataVolumeSpec};

    fn attachment(disk_id: &str, interface: DiskInterface) -> DiskAttachment {
        DiskAttachment {
            id: format!("da-{}", disk_id),
            interface,
            disk: Disk {
                id: disk_id.to_string(),
                provisioned_size: 1 << 30,
                storage_domain: "sd-1".to_string(),
            },
        }
    }

    fn data_volume(name: &str, attachment: &DiskAttachment) -> DataVolume {
        DataVolume {
            name: name.to_string(),
            spec: DataVolumeSpec::for_disk(
                attachment,
                &DestinationStorage::new("standard"),
                "",
                &CredentialRefs::default(),
            ),
        }
    }

    #[test]
    fn test_disks_follow_data_volume_order() {
        let sata = attachment("d1", DiskInterface::Sata);
        let scsi = attachment("d2", DiskInterface::VirtioScsi);
        let vm = Workload {
            disk_attachments: vec![sata.clone(), scsi.clone()],
            ..Default::default()
        };
        let dvs = [data_volume("dv-b", &scsi), data_volume("dv-a", &sata)];

        let mut spec = VirtualMachineSpec::default();
        map_disks(&vm, &dvs, &mut spec);

        let volumes = &spec.template.volumes;
        let disks = &spec.template.domain.devices.disks;
        assert_eq!(volumes.len(), 2);
        assert_eq!((volumes[0].name.as_str(), volumes[0].data_volume.name.as_str()), ("vol-0", "dv-b"));
        assert_eq!(disks[0].disk.bus, DiskBus::Scsi);
        assert_eq!((volumes[1].name.as_str(), volumes[1].data_volume.name.as_str()), ("vol-1", "dv-a"));
        assert_eq!(disks[1].disk.bus, DiskBus::Sata);
    }

    #[test]
    fn test_unknown_data_volume_skipped() {
        let vm = Workload {
            disk_attachments: vec![attachment("d1", DiskInterface::Virtio)],
            ..Default::default()
        };
        let stray = attachment("elsewhere", DiskInterface::Sata);
        let dvs = [data_volume("dv-x", &stray)];

        let mut spec = VirtualMachineSpec::default();
        map_disks(&vm, &dvs, &mut spec);
        assert!(spec.template.volumes.is_empty());
        assert!(spec.template.domain.devices.disks.is_empty());
    }

    #[test]
    fn test_firmware_efi_and_bios() {
        let mut vm = Workload {
            id: "vm-1".to_string(),
            bios: BiosType::Q35Ovmf,
            serial_number: "SN-42".to_string(),
            ..Default::default()
        };
        let mut spec = VirtualMachineSpec::default();
        map_firmware(&vm, BiosType::I440fxSeaBios, &mut spec);
        assert_eq!(spec.template.domain.firmware.bootloader, Bootloader::Efi);
        assert_eq!(spec.template.domain.features.smm, Some(FeatureState { enabled: true }));
        assert_eq!(spec.template.domain.firmware.serial, "SN-42");

        vm.bios = BiosType::Q35SeaBios;
        vm.serial_number.clear();
        map_firmware(&vm, BiosType::Q35Ovmf, &mut spec);
        assert_eq!(spec.template.domain.firmware.bootloader, Bootloader::Bios);
        assert_eq!(spec.template.domain.features.smm, None);
        assert_eq!(spec.template.domain.firmware.serial, "vm-1");
    }

    #[test]
    fn test_firmware_inherits_cluster_bios() {
        let vm = Workload {
            id: "vm-1".to_string(),
            bios: BiosType::ClusterDefault,
            ..Default::default()
        };
        let mut spec = VirtualMachineSpec::default();
        map_firmware(&vm, BiosType::Q35Ovmf, &mut spec);
        assert_eq!(spec.template.domain.firmware.bootloader, Bootloader::Efi);

        map_firmware(&vm, BiosType::ClusterDefault, &mut spec);
        assert_eq!(spec.template.domain.firmware.bootloader, Bootloader::Bios);
    }

    #[test]
    fn test_resources_clock_input() {
        let vm = Workload {
            cpu_sockets: 2,
            cpu_cores: 4,
            cpu_threads: 1,
            memory: 8 << 30,
            timezone: "Etc/GMT".to_string(),
            ..Default::default()
        };
        let mut spec = VirtualMachineSpec::default();
        map_cpu(&vm, &mut spec);
        map_memory(&vm, &mut spec);
        map_clock(&vm, &mut spec);
        map_input(&mut spec);

        let domain = &spec.template.domain;
        assert_eq!(domain.machine.machine_type, "q35");
        assert_eq!(
            domain.cpu,
            Cpu {
                sockets: 2,
                cores: 4,
                threads: 1
            }
        );
        assert_eq!(domain.resources.memory.to_string(), "8Gi");
        assert_eq!(domain.clock.timezone, "Etc/GMT");
        assert_eq!(domain.devices.inputs, vec![Input::tablet()]);
        assert_eq!(domain.devices.inputs[0].bus, "virtio");
    }
}
