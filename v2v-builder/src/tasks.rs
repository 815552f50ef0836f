//! Per-disk progress tasks.

use std::collections::BTreeMap;

use crate::plan::{Progress, Task, UNIT_ANNOTATION, UNIT_MB};
use crate::source::Workload;

const BYTES_PER_MB: u64 = 1 << 20;

/// One task per disk attachment, in the VM's order.
///
/// Every attached disk gets a task whether or not its storage domain is in
/// the storage mapping. Totals are whole megabytes, truncated.
pub fn disk_tasks(vm: &Workload) -> Vec<Task> {
    vm.disk_attachments
        .iter()
        .map(|da| Task {
            name: da.disk.id.clone(),
            progress: Progress {
                total: da.disk.provisioned_size / BYTES_PER_MB,
                completed: 0,
            },
            annotations: BTreeMap::from([(UNIT_ANNOTATION.to_string(), UNIT_MB.to_string())]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Disk, DiskAttachment};

    fn disk(id: &str, size: u64) -> DiskAttachment {
        DiskAttachment {
            disk: Disk {
                id: id.to_string(),
                provisioned_size: size,
                storage_domain: String::new(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_totals_truncate_to_megabytes() {
        let vm = Workload {
            disk_attachments: vec![
                disk("d1", 10 << 30),
                disk("d2", (3 << 20) + 1048575),
                disk("d3", 1048575),
            ],
            ..Default::default()
        };
        let tasks = disk_tasks(&vm);

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].name, "d1");
        assert_eq!(tasks[0].progress.total, 10240);
        assert_eq!(tasks[1].progress.total, 3);
        assert_eq!(tasks[2].progress.total, 0);
        assert!(tasks.iter().all(|t| t.annotations["unit"] == "MB"));
        assert!(tasks.iter().all(|t| t.progress.completed == 0));
    }

    #[test]
    fn test_no_disks_no_tasks() {
        assert!(disk_tasks(&Workload::default()).is_empty());
    }
}
