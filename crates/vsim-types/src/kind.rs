//! Managed entity kinds known to the simulator.
//!
//! [`EntityKind`] is the closed set of kinds this crate knows how to name and
//! how to mint identifiers for. [`EntityReference`](crate::EntityReference)
//! itself carries its kind as a string so that references to kinds outside
//! this set can still be parsed and passed around; validating that a kind
//! actually exists is the job of the registry in `vsim-core`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of entity kinds understood by the simulator.
///
/// The string form of each variant (see [`EntityKind::as_str`]) is the kind
/// token used in `Kind:ID` references.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Generic container of other entities.
    Folder,
    /// Folder specialised to hold datastores.
    StoragePod,
    /// Top-level grouping of hosts, machines, networks and datastores.
    Datacenter,
    /// A virtual machine.
    VirtualMachine,
    /// A resource pool that also behaves like a packaged application.
    VirtualApp,
    /// A standalone host wrapped as a compute resource.
    ComputeResource,
    /// A cluster of hosts.
    ClusterComputeResource,
    /// A physical host.
    HostSystem,
    /// A standard network.
    Network,
    /// A network managed outside of the simulator.
    OpaqueNetwork,
    /// A resource pool.
    ResourcePool,
    /// A distributed switch.
    DistributedVirtualSwitch,
    /// A port group on a distributed switch.
    DistributedVirtualPortgroup,
    /// A datastore backed by a directory on the local file system.
    Datastore,
    /// An asynchronous operation record.
    Task,
}

impl EntityKind {
    /// Every known kind, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Folder,
        Self::StoragePod,
        Self::Datacenter,
        Self::VirtualMachine,
        Self::VirtualApp,
        Self::ComputeResource,
        Self::ClusterComputeResource,
        Self::HostSystem,
        Self::Network,
        Self::OpaqueNetwork,
        Self::ResourcePool,
        Self::DistributedVirtualSwitch,
        Self::DistributedVirtualPortgroup,
        Self::Datastore,
        Self::Task,
    ];

    /// Returns the kind token used in `Kind:ID` references.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "Folder",
            Self::StoragePod => "StoragePod",
            Self::Datacenter => "Datacenter",
            Self::VirtualMachine => "VirtualMachine",
            Self::VirtualApp => "VirtualApp",
            Self::ComputeResource => "ComputeResource",
            Self::ClusterComputeResource => "ClusterComputeResource",
            Self::HostSystem => "HostSystem",
            Self::Network => "Network",
            Self::OpaqueNetwork => "OpaqueNetwork",
            Self::ResourcePool => "ResourcePool",
            Self::DistributedVirtualSwitch => "DistributedVirtualSwitch",
            Self::DistributedVirtualPortgroup => "DistributedVirtualPortgroup",
            Self::Datastore => "Datastore",
            Self::Task => "Task",
        }
    }

    /// Returns the kind this one specializes, if any.
    ///
    /// A folder that accepts the supertype also accepts the subtype.
    #[must_use]
    pub const fn supertype(self) -> Option<Self> {
        match self {
            Self::StoragePod => Some(Self::Folder),
            Self::VirtualApp => Some(Self::ResourcePool),
            Self::ClusterComputeResource => Some(Self::ComputeResource),
            Self::OpaqueNetwork | Self::DistributedVirtualPortgroup => Some(Self::Network),
            _ => None,
        }
    }

    /// Returns true if `self` is `other` or specializes it.
    #[must_use]
    pub fn is_a(self, other: Self) -> bool {
        let mut kind = Some(self);
        while let Some(k) = kind {
            if k == other {
                return true;
            }
            kind = k.supertype();
        }
        false
    }

    /// Returns the prefix used when minting new identifiers for this kind.
    ///
    /// Prefixes are chosen so that a minted identifier parses back to the
    /// same kind through [`reference_from_string`](crate::reference_from_string).
    /// `OpaqueNetwork` shares the `network-` prefix and therefore parses as
    /// `Network`; callers that need the exact kind use the `Kind:ID` form.
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Folder => "group-d",
            Self::StoragePod => "group-p",
            Self::Datacenter => "datacenter-",
            Self::VirtualMachine => "vm-",
            Self::VirtualApp => "resgroup-v",
            Self::ComputeResource => "domain-s",
            Self::ClusterComputeResource => "domain-c",
            Self::HostSystem => "host-",
            Self::Network | Self::OpaqueNetwork => "network-",
            Self::ResourcePool => "resgroup-",
            Self::DistributedVirtualSwitch => "dvs-",
            Self::DistributedVirtualPortgroup => "dvportgroup-",
            Self::Datastore => "datastore-",
            Self::Task => "task-",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the known kind tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind: {0:?}")]
pub struct UnknownKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_from_str() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.to_string().parse::<EntityKind>(), Ok(kind));
        }
    }

    #[test]
    fn subtypes_are_their_supertype() {
        assert!(EntityKind::ClusterComputeResource.is_a(EntityKind::ComputeResource));
        assert!(EntityKind::StoragePod.is_a(EntityKind::Folder));
        assert!(EntityKind::DistributedVirtualPortgroup.is_a(EntityKind::Network));
        assert!(EntityKind::Datastore.is_a(EntityKind::Datastore));

        assert!(!EntityKind::ComputeResource.is_a(EntityKind::ClusterComputeResource));
        assert!(!EntityKind::HostSystem.is_a(EntityKind::ComputeResource));
    }

    #[test]
    fn unknown_token_is_rejected() {
        assert_eq!(
            "Spaceship".parse::<EntityKind>(),
            Err(UnknownKind("Spaceship".to_string()))
        );
        // Tokens are case sensitive.
        assert!("folder".parse::<EntityKind>().is_err());
    }
}
