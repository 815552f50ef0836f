//! Network mapping: destination networks and interfaces for the NICs a VM
//! actually uses.

use tracing::debug;

use crate::error::{BuildError, Result};
use crate::plan::{NetworkPair, NetworkType};
use crate::source::{Network, Nic, Workload};
use crate::traits::{Inventory, Kind};
use crate::types::{Interface, InterfaceBinding, NetworkAttachment, NetworkSource, VIRTIO_MODEL};

/// Positional name shared by a network and its interface.
pub fn network_name(index: usize) -> String {
    format!("net-{}", index)
}

/// Build networks and interfaces for `vm` from the network mapping.
///
/// Entries are visited in mapping order and named by their index in the
/// mapping, so skipped entries leave gaps (`net-0`, `net-2`). An entry whose
/// network no NIC uses produces nothing. When several NICs sit on the same
/// network the first one wins.
pub fn map_networks<I: Inventory>(
    vm: &Workload,
    network_map: &[NetworkPair],
    inventory: &I,
) -> Result<(Vec<NetworkAttachment>, Vec<Interface>)> {
    let mut networks = Vec::new();
    let mut interfaces = Vec::new();

    for (index, pair) in network_map.iter().enumerate() {
        let network: Network = inventory
            .find(&pair.source)
            .map_err(|e| BuildError::lookup(Kind::Network, &pair.source, e))?;

        let Some(nic) = vm.nics.iter().find(|nic| nic.profile.network == network.id) else {
            debug!(network = %network.id, "No NIC on network, mapping entry skipped");
            continue;
        };

        let name = network_name(index);
        let (source, binding) = connect(pair, nic);
        debug!(
            network = %network.id,
            name = %name,
            mac = %nic.mac,
            binding = ?binding,
            "Network mapped"
        );

        networks.push(NetworkAttachment {
            name: name.clone(),
            source,
        });
        interfaces.push(Interface {
            name,
            model: VIRTIO_MODEL.to_string(),
            mac_address: nic.mac.clone(),
            binding,
        });
    }

    Ok((networks, interfaces))
}

/// Destination network source and interface binding for one mapped NIC.
fn connect(pair: &NetworkPair, nic: &Nic) -> (NetworkSource, InterfaceBinding) {
    match pair.destination.network_type {
        NetworkType::Pod => (NetworkSource::Pod {}, InterfaceBinding::Masquerade {}),
        NetworkType::Multus => {
            let source = NetworkSource::Multus {
                network_name: pair.destination.qualified_name(),
            };
            let binding = if nic.profile.pass_through {
                InterfaceBinding::Sriov {}
            } else {
                InterfaceBinding::Bridge {}
            };
            (source, binding)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryInventory;
    use crate::plan::DestinationNetwork;
    use crate::source::NicProfile;
    use crate::traits::Ref;

    fn inventory() -> MemoryInventory {
        let mut inventory = MemoryInventory::new();
        for (id, name) in [("n1", "ovirtmgmt"), ("n2", "vlan10"), ("n3", "storage")] {
            inventory
                .insert(&Network {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .unwrap();
        }
        inventory
    }

    fn nic(mac: &str, network: &str, pass_through: bool) -> Nic {
        Nic {
            mac: mac.to_string(),
            profile: NicProfile {
                network: network.to_string(),
                pass_through,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn pair(network: &str, destination: DestinationNetwork) -> NetworkPair {
        NetworkPair {
            source: Ref::with_id(network),
            destination,
        }
    }

    #[test]
    fn test_pod_network_masquerades() {
        let vm = Workload {
            nics: vec![nic("aa:00", "n1", false)],
            ..Default::default()
        };
        let map = [pair("n1", DestinationNetwork::pod())];

        let (networks, interfaces) = map_networks(&vm, &map, &inventory()).unwrap();
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].name, "net-0");
        assert_eq!(networks[0].source, NetworkSource::Pod {});
        assert_eq!(interfaces[0].binding, InterfaceBinding::Masquerade {});
        assert_eq!(interfaces[0].mac_address, "aa:00");
        assert_eq!(interfaces[0].model, "virtio");
    }

    #[test]
    fn test_multus_bridge_and_sriov() {
        let vm = Workload {
            nics: vec![nic("aa:01", "n2", false), nic("aa:02", "n3", true)],
            ..Default::default()
        };
        let map = [
            pair("n2", DestinationNetwork::multus("prod", "vlan10")),
            pair("n3", DestinationNetwork::multus("", "sriov-net")),
        ];

        let (networks, interfaces) = map_networks(&vm, &map, &inventory()).unwrap();
        assert_eq!(
            networks[0].source,
            NetworkSource::Multus {
                network_name: "prod/vlan10".to_string()
            }
        );
        assert_eq!(interfaces[0].binding, InterfaceBinding::Bridge {});
        assert_eq!(
            networks[1].source,
            NetworkSource::Multus {
                network_name: "sriov-net".to_string()
            }
        );
        assert_eq!(interfaces[1].binding, InterfaceBinding::Sriov {});
    }

    #[test]
    fn test_unused_entries_dropped_names_keep_mapping_index() {
        let vm = Workload {
            nics: vec![nic("aa:03", "n3", false)],
            ..Default::default()
        };
        let map = [
            pair("n1", DestinationNetwork::pod()),
            pair("n2", DestinationNetwork::multus("prod", "vlan10")),
            pair("n3", DestinationNetwork::multus("prod", "storage")),
        ];

        let (networks, interfaces) = map_networks(&vm, &map, &inventory()).unwrap();
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].name, "net-2");
        assert_eq!(interfaces[0].name, "net-2");
    }

    #[test]
    fn test_reordering_mapping_renames() {
        let vm = Workload {
            nics: vec![nic("aa:01", "n1", false), nic("aa:02", "n2", false)],
            ..Default::default()
        };
        let forward = [
            pair("n1", DestinationNetwork::pod()),
            pair("n2", DestinationNetwork::multus("prod", "vlan10")),
        ];
        let reversed = [forward[1].clone(), forward[0].clone()];

        let (_, a) = map_networks(&vm, &forward, &inventory()).unwrap();
        let (_, b) = map_networks(&vm, &reversed, &inventory()).unwrap();
        assert_eq!((a[0].name.as_str(), a[0].mac_address.as_str()), ("net-0", "aa:01"));
        assert_eq!((b[0].name.as_str(), b[0].mac_address.as_str()), ("net-0", "aa:02"));
        assert_eq!((b[1].name.as_str(), b[1].mac_address.as_str()), ("net-1", "aa:01"));
    }

    #[test]
    fn test_first_nic_wins() {
        let vm = Workload {
            nics: vec![nic("aa:01", "n1", false), nic("aa:02", "n1", true)],
            ..Default::default()
        };
        let map = [pair("n1", DestinationNetwork::multus("prod", "mgmt"))];

        let (networks, interfaces) = map_networks(&vm, &map, &inventory()).unwrap();
        assert_eq!(networks.len(), 1);
        assert_eq!(interfaces[0].mac_address, "aa:01");
        assert_eq!(interfaces[0].binding, InterfaceBinding::Bridge {});
    }

    #[test]
    fn test_missing_network_is_lookup_error() {
        let vm = Workload::default();
        let map = [pair("gone", DestinationNetwork::pod())];
        let err = map_networks(&vm, &map, &inventory()).unwrap_err();
        assert!(matches!(err, BuildError::Lookup { kind: Kind::Network, .. }));
    }
}
