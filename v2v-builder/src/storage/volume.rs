//! Data-volume specs: one per mapped disk, imported over ImageIO.

use serde::Serialize;
use tracing::debug;

use super::{AccessMode, VolumeMode};
use crate::plan::DestinationStorage;
use crate::source::DiskAttachment;
use crate::types::Quantity;

/// Names of the already-created objects holding import credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialRefs {
    /// Secret with the provider user/password
    pub secret: String,
    /// Config map with the provider CA certificate
    pub config_map: String,
}

/// A named data volume as created by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataVolume {
    pub name: String,
    pub spec: DataVolumeSpec,
}

/// Data-volume spec: where the bytes come from and what to store them on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataVolumeSpec {
    pub source: DataVolumeSource,
    pub storage: StorageSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataVolumeSource {
    pub imageio: ImageIoSource,
}

/// ImageIO import source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIoSource {
    pub url: String,
    #[serde(rename = "diskId")]
    pub disk_id: String,
    pub secret_ref: String,
    pub cert_config_map: String,
}

/// Requested storage for the imported disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
    pub access_modes: Vec<AccessMode>,
    pub volume_mode: VolumeMode,
    pub storage: Quantity,
    pub storage_class_name: String,
}

impl DataVolumeSpec {
    /// Build the spec for one disk attachment on a mapped storage domain.
    ///
    /// Unset modes on `destination` fall back to Filesystem / ReadWriteOnce.
    pub fn for_disk(
        attachment: &DiskAttachment,
        destination: &DestinationStorage,
        url: &str,
        credentials: &CredentialRefs,
    ) -> Self {
        let volume_mode = destination.volume_mode.unwrap_or_default();
        let access_mode = destination.access_mode.unwrap_or_default();
        debug!(
            disk_id = %attachment.disk.id,
            size_bytes = attachment.disk.provisioned_size,
            storage_class = %destination.storage_class,
            volume_mode = %volume_mode,
            access_mode = %access_mode,
            "Data volume spec built"
        );
        Self {
            source: DataVolumeSource {
                imageio: ImageIoSource {
                    url: url.to_string(),
                    disk_id: attachment.disk.id.clone(),
                    secret_ref: credentials.secret.clone(),
                    cert_config_map: credentials.config_map.clone(),
                },
            },
            storage: StorageSpec {
                access_modes: vec![access_mode],
                volume_mode,
                storage: Quantity(attachment.disk.provisioned_size),
                storage_class_name: destination.storage_class.clone(),
            },
        }
    }

    /// Id of the source disk this volume imports.
    pub fn disk_id(&self) -> &str {
        &self.source.imageio.disk_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Disk;

    fn attachment(size: u64) -> DiskAttachment {
        DiskAttachment {
            id: "da-1".to_string(),
            disk: Disk {
                id: "disk-1".to_string(),
                provisioned_size: size,
                storage_domain: "sd-1".to_string(),
            },
            ..Default::default()
        }
    }

    fn credentials() -> CredentialRefs {
        CredentialRefs {
            secret: "vm-secret".to_string(),
            config_map: "vm-ca".to_string(),
        }
    }

    #[test]
    fn test_platform_defaults_when_unset() {
        let spec = DataVolumeSpec::for_disk(
            &attachment(1024),
            &DestinationStorage::new("standard"),
            "https://engine/ovirt-engine/api",
            &credentials(),
        );
        assert_eq!(spec.storage.volume_mode, VolumeMode::Filesystem);
        assert_eq!(spec.storage.access_modes, vec![AccessMode::ReadWriteOnce]);
        assert_eq!(spec.storage.storage_class_name, "standard");
        assert_eq!(spec.source.imageio.secret_ref, "vm-secret");
        assert_eq!(spec.source.imageio.cert_config_map, "vm-ca");
        assert_eq!(spec.disk_id(), "disk-1");
    }

    #[test]
    fn test_capacity_is_not_rounded() {
        let size = 10 * 1024 * 1024 * 1024 + 4096;
        let spec = DataVolumeSpec::for_disk(
            &attachment(size),
            &DestinationStorage::new("standard").with_volume_mode(VolumeMode::Block),
            "",
            &credentials(),
        );
        assert_eq!(spec.storage.storage, Quantity(size));
        assert_eq!(spec.storage.volume_mode, VolumeMode::Block);
    }

    #[test]
    fn test_serialized_shape() {
        let spec = DataVolumeSpec::for_disk(
            &attachment(2 * 1024 * 1024 * 1024),
            &DestinationStorage::new("standard"),
            "https://engine/api",
            &credentials(),
        );
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["source"]["imageio"]["diskId"], "disk-1");
        assert_eq!(json["storage"]["storage"], "2Gi");
        assert_eq!(json["storage"]["accessModes"][0], "ReadWriteOnce");
        assert_eq!(json["storage"]["storageClassName"], "standard");
    }
}
